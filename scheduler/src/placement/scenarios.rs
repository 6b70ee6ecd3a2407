//! The end-to-end scenarios, composed directly against the pure filter/selector
//! and the rejection registry's in-memory check, without driving a live watch loop.

use super::filter;
use super::rejection::RejectionRegistry;
use super::selector;
use super::trace::TraceRecorder;
use chrono::{Duration, Utc};
use k8s_openapi::api::core::v1::{Node, NodeSpec, Pod, PodSpec, Taint, Toleration};
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

fn node(name: &str, env: Option<&str>, taints: Vec<Taint>) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: env.map(|e| BTreeMap::from([("env".to_string(), e.to_string())])),
            ..Default::default()
        },
        spec: Some(NodeSpec {
            taints: if taints.is_empty() { None } else { Some(taints) },
            ..Default::default()
        }),
        status: None,
    }
}

fn pod(
    name: &str,
    app: Option<&str>,
    tolerations: Vec<Toleration>,
    scheduler_name: &str,
) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            labels: app.map(|a| BTreeMap::from([("app".to_string(), a.to_string())])),
            ..Default::default()
        },
        spec: Some(PodSpec {
            scheduler_name: Some(scheduler_name.to_string()),
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

fn scheduled_on(name: &str, node_name: &str, app: Option<&str>) -> Pod {
    let mut p = pod(name, app, vec![], "my-scheduler");
    p.spec.as_mut().unwrap().node_name = Some(node_name.to_string());
    p
}

#[test]
fn scenario_1_happy_path_picks_least_loaded_node() {
    let n1 = node("n1", Some("prod"), vec![]);
    let n2 = node("n2", Some("prod"), vec![]);
    let existing = vec![scheduled_on("web-1", "n2", Some("web"))];
    let candidate = pod("web-7", Some("web"), vec![], "my-scheduler");

    let compatible: Vec<Node> = [n1, n2]
        .into_iter()
        .filter(|n| filter::compatible(n, &candidate))
        .collect();
    assert_eq!(compatible.len(), 2);
    assert_eq!(
        selector::choose(&compatible, &existing, &candidate),
        Some("n1".to_string())
    );

    let mut trace = TraceRecorder::new();
    let t0 = Utc::now();
    trace.record_added("default/web-7", t0);
    trace.record_eligible("default/web-7", t0);
    trace.record_scheduled("default/web-7", t0);
    trace.record_bound("default/web-7", t0 + Duration::seconds(1));
    let record = trace.get("default/web-7").unwrap();
    assert!(record.bound.unwrap() > record.added.unwrap());
}

#[test]
fn scenario_2_env_gate_and_taint_both_reject() {
    let n1 = node("n1", Some("stage"), vec![]);
    let n2 = node(
        "n2",
        Some("prod"),
        vec![Taint {
            key: "dedicated".to_string(),
            value: Some("db".to_string()),
            effect: "NoSchedule".to_string(),
            time_added: None,
        }],
    );
    let candidate = pod("api-1", None, vec![], "my-scheduler");

    assert!(!filter::compatible(&n1, &candidate));
    assert!(!filter::compatible(&n2, &candidate));
    assert_eq!(selector::choose(&[n1, n2], &[], &candidate), None);
}

#[test]
fn scenario_3_cool_down_suppresses_reconsideration() {
    let registry = RejectionRegistry::new(300);
    let mut p = pod("api-1", None, vec![], "my-scheduler");
    p.metadata.annotations = Some(BTreeMap::from([(
        "scheduler-rejected".to_string(),
        (Utc::now() - Duration::seconds(10)).to_rfc3339(),
    )]));
    assert!(registry.is_recently_rejected(&p));
}

#[test]
fn scenario_4_cool_down_expires() {
    let registry = RejectionRegistry::new(300);
    let mut p = pod("api-1", None, vec![], "my-scheduler");
    p.metadata.annotations = Some(BTreeMap::from([(
        "scheduler-rejected".to_string(),
        (Utc::now() - Duration::seconds(310)).to_rfc3339(),
    )]));
    assert!(!registry.is_recently_rejected(&p));
}

#[test]
fn scenario_5_toleration_match_admits_node() {
    let n = node(
        "n1",
        Some("prod"),
        vec![Taint {
            key: "gpu".to_string(),
            value: Some("true".to_string()),
            effect: "NoSchedule".to_string(),
            time_added: None,
        }],
    );
    let candidate = pod(
        "gpu-job",
        None,
        vec![Toleration {
            key: Some("gpu".to_string()),
            operator: Some("Equal".to_string()),
            value: Some("true".to_string()),
            effect: Some("NoSchedule".to_string()),
            toleration_seconds: None,
        }],
        "my-scheduler",
    );
    assert!(filter::compatible(&n, &candidate));
}

#[test]
fn scenario_6_bind_retry_records_every_attempt() {
    // The binder itself needs a live cluster client to exercise the retry loop
    // end to end; the bookkeeping it relies on (bind_attempts, single bound
    // record) is verified directly here against the trace recorder.
    let mut trace = TraceRecorder::new();
    let key = "default/retry-me";
    trace.record_scheduled(key, Utc::now());
    trace.increment_bind_attempts(key);
    trace.increment_bind_attempts(key);
    trace.increment_bind_attempts(key);
    let first_bound = Utc::now();
    trace.record_bound(key, first_bound);
    trace.record_bound(key, first_bound + Duration::seconds(5));
    let record = trace.get(key).unwrap();
    assert_eq!(record.bind_attempts, 3);
    assert_eq!(record.bound, Some(first_bound));
}
