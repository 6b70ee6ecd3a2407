use k8s::{NodeExt, PodExt};
use k8s_openapi::api::core::v1::{Node, Pod, Taint, Toleration};

/// Is `node` admissible for `pod`? A pure, side-effect-free predicate: the
/// environment label gate, then every taint on the node must be tolerated.
/// A node with zero taints is unconditionally tolerated. Iteration order over
/// taints/tolerations is unspecified, matching the underlying data model.
pub fn compatible(node: &Node, pod: &Pod) -> bool {
    if node.env_label() != Some("prod") {
        return false;
    }
    let tolerations = pod.tolerations();
    node.taints()
        .iter()
        .all(|taint| tolerations.iter().any(|tol| tolerates(tol, taint)))
}

fn tolerates(tol: &Toleration, taint: &Taint) -> bool {
    if tol.key.as_deref() != Some(taint.key.as_str()) {
        return false;
    }
    if tol.effect.as_deref() != Some(taint.effect.as_str()) {
        return false;
    }
    match tol.operator.as_deref() {
        Some("Exists") => true,
        _ => tol.value.as_deref() == taint.value.as_deref(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::api::ObjectMeta;
    use std::collections::BTreeMap;

    fn node(env: Option<&str>, taints: Vec<Taint>) -> Node {
        Node {
            metadata: ObjectMeta {
                name: Some("n1".into()),
                labels: env.map(|e| BTreeMap::from([("env".to_string(), e.to_string())])),
                ..Default::default()
            },
            spec: Some(k8s_openapi::api::core::v1::NodeSpec {
                taints: if taints.is_empty() { None } else { Some(taints) },
                ..Default::default()
            }),
            status: None,
        }
    }

    fn pod(tolerations: Vec<Toleration>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some("p".into()),
                namespace: Some("default".into()),
                ..Default::default()
            },
            spec: Some(k8s_openapi::api::core::v1::PodSpec {
                tolerations: if tolerations.is_empty() {
                    None
                } else {
                    Some(tolerations)
                },
                ..Default::default()
            }),
            status: None,
        }
    }

    fn taint(key: &str, value: Option<&str>, effect: &str) -> Taint {
        Taint {
            key: key.to_string(),
            value: value.map(str::to_string),
            effect: effect.to_string(),
            time_added: None,
        }
    }

    fn toleration(
        key: &str,
        operator: Option<&str>,
        value: Option<&str>,
        effect: &str,
    ) -> Toleration {
        Toleration {
            key: Some(key.to_string()),
            operator: operator.map(str::to_string),
            value: value.map(str::to_string),
            effect: Some(effect.to_string()),
            toleration_seconds: None,
        }
    }

    #[test]
    fn non_prod_env_is_rejected() {
        let n = node(Some("stage"), vec![]);
        let p = pod(vec![]);
        assert!(!compatible(&n, &p));
    }

    #[test]
    fn missing_env_label_is_rejected() {
        let n = node(None, vec![]);
        let p = pod(vec![]);
        assert!(!compatible(&n, &p));
    }

    #[test]
    fn node_with_no_taints_is_unconditionally_tolerated() {
        let n = node(Some("prod"), vec![]);
        let p = pod(vec![]);
        assert!(compatible(&n, &p));
    }

    #[test]
    fn untolerated_taint_rejects_node() {
        let n = node(Some("prod"), vec![taint("dedicated", Some("db"), "NoSchedule")]);
        let p = pod(vec![]);
        assert!(!compatible(&n, &p));
    }

    #[test]
    fn equal_operator_toleration_matches() {
        let n = node(Some("prod"), vec![taint("gpu", Some("true"), "NoSchedule")]);
        let p = pod(vec![toleration("gpu", Some("Equal"), Some("true"), "NoSchedule")]);
        assert!(compatible(&n, &p));
    }

    #[test]
    fn exists_operator_tolerates_any_value() {
        let n = node(Some("prod"), vec![taint("gpu", Some("true"), "NoSchedule")]);
        let p = pod(vec![toleration("gpu", Some("Exists"), None, "NoSchedule")]);
        assert!(compatible(&n, &p));
    }

    #[test]
    fn mismatched_effect_does_not_tolerate() {
        let n = node(Some("prod"), vec![taint("gpu", Some("true"), "NoSchedule")]);
        let p = pod(vec![toleration("gpu", Some("Equal"), Some("true"), "NoExecute")]);
        assert!(!compatible(&n, &p));
    }
}
