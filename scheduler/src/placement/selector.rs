use crate::placement::filter;
use k8s::{Cluster, NodeExt, PodExt};
use k8s_openapi::api::core::v1::{Node, Pod};
use result::Result;
use std::collections::BTreeMap;

/// `load[n]` is the number of pods already on node `n` that count against it:
/// every pod if `pod` has no `app` label, otherwise only pods sharing that label.
pub fn load_map(nodes: &[Node], pods: &[Pod], pod: &Pod) -> BTreeMap<String, usize> {
    let mut load: BTreeMap<String, usize> =
        nodes.iter().map(|n| (n.node_name(), 0usize)).collect();
    let app = pod.app_label();
    for q in pods {
        let Some(node_name) = q.spec.as_ref().and_then(|s| s.node_name.clone()) else {
            continue;
        };
        let Some(count) = load.get_mut(&node_name) else {
            continue;
        };
        match app {
            Some(app) => {
                if q.app_label() == Some(app) {
                    *count += 1;
                }
            }
            None => *count += 1,
        }
    }
    load
}

/// Picks the name of the compatible node with minimum load. Ties break on
/// whatever order `nodes` iterates in; callers must not depend on which.
pub fn choose(nodes: &[Node], pods: &[Pod], pod: &Pod) -> Option<String> {
    if nodes.is_empty() {
        return None;
    }
    let load = load_map(nodes, pods, pod);
    nodes
        .iter()
        .map(|n| n.node_name())
        .min_by_key(|name| load.get(name).copied().unwrap_or(0))
}

/// Lists nodes, filters to the compatible set, and (only if non-empty) lists
/// pods cluster-wide to score and pick a winner — the two-phase listing the
/// design calls out as the cost of never caching cluster state between events.
pub async fn choose_node(cluster: &Cluster, pod: &Pod) -> Result<Option<String>> {
    let nodes = cluster.list_nodes().await?;
    let compatible: Vec<Node> = nodes
        .into_iter()
        .filter(|node| filter::compatible(node, pod))
        .collect();
    if compatible.is_empty() {
        return Ok(None);
    }
    let pods = cluster.list_pods_all_namespaces().await?;
    Ok(choose(&compatible, &pods, pod))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::api::ObjectMeta;
    use std::collections::BTreeMap as Map;

    fn node(name: &str) -> Node {
        Node {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            spec: None,
            status: None,
        }
    }

    fn scheduled_pod(node_name: &str, app: Option<&str>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some("q".into()),
                namespace: Some("default".into()),
                labels: app.map(|a| Map::from([("app".to_string(), a.to_string())])),
                ..Default::default()
            },
            spec: Some(k8s_openapi::api::core::v1::PodSpec {
                node_name: Some(node_name.to_string()),
                ..Default::default()
            }),
            status: None,
        }
    }

    fn candidate(app: Option<&str>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some("p".into()),
                namespace: Some("default".into()),
                labels: app.map(|a| Map::from([("app".to_string(), a.to_string())])),
                ..Default::default()
            },
            spec: Some(k8s_openapi::api::core::v1::PodSpec::default()),
            status: None,
        }
    }

    #[test]
    fn least_loaded_node_wins() {
        let nodes = vec![node("n1"), node("n2")];
        let pods = vec![scheduled_pod("n2", Some("web"))];
        let pod = candidate(Some("web"));
        assert_eq!(choose(&nodes, &pods, &pod), Some("n1".to_string()));
    }

    #[test]
    fn app_scoped_load_ignores_other_apps() {
        let nodes = vec![node("n1"), node("n2")];
        let pods = vec![
            scheduled_pod("n1", Some("db")),
            scheduled_pod("n1", Some("db")),
            scheduled_pod("n2", Some("web")),
        ];
        let pod = candidate(Some("web"));
        // n1 has zero `web` pods despite two `db` pods; n2 has one `web` pod.
        assert_eq!(choose(&nodes, &pods, &pod), Some("n1".to_string()));
    }

    #[test]
    fn no_app_label_counts_every_pod() {
        let nodes = vec![node("n1"), node("n2")];
        let pods = vec![scheduled_pod("n1", Some("db")), scheduled_pod("n2", None)];
        let pod = candidate(None);
        let load = load_map(&nodes, &pods, &pod);
        assert_eq!(load.get("n1"), Some(&1));
        assert_eq!(load.get("n2"), Some(&1));
    }

    #[test]
    fn empty_node_set_returns_none() {
        let pod = candidate(None);
        assert_eq!(choose(&[], &[], &pod), None);
    }
}
