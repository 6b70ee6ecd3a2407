use crate::errors::ApiError;
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, WatchEvent, WatchParams};

/// One pod change event off the watch stream, the four-way vocabulary the
/// placement loop dispatches on.
#[derive(Debug)]
pub enum PodEvent {
    Added(Pod),
    Modified(Pod),
    Deleted(Pod),
    Error(ApiError),
}

/// Opens a single watch call against all-namespaces pods. The returned stream is
/// finite: the server closes it after `timeout_s`, at which point the caller is
/// expected to invoke this again. It never attempts to reconnect on its own —
/// that policy lives in the watch loop, not here.
pub async fn watch_pods(
    api: &Api<Pod>,
    timeout_s: u32,
) -> std::result::Result<impl Stream<Item = PodEvent> + '_, ApiError> {
    let wp = WatchParams::default().timeout(timeout_s);
    let stream = api.watch(&wp, "0").await.map_err(ApiError::from)?;
    Ok(stream.filter_map(|item| async move {
        match item {
            Ok(WatchEvent::Added(pod)) => Some(PodEvent::Added(pod)),
            Ok(WatchEvent::Modified(pod)) => Some(PodEvent::Modified(pod)),
            Ok(WatchEvent::Deleted(pod)) => Some(PodEvent::Deleted(pod)),
            Ok(WatchEvent::Bookmark(_)) => None,
            Ok(WatchEvent::Error(err)) => Some(PodEvent::Error(ApiError::Terminal(kube::Error::Api(err)))),
            Err(err) => Some(PodEvent::Error(ApiError::from(err))),
        }
    }))
}
