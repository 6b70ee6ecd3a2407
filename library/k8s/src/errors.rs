use error::*;

/// Classification of a failure from the orchestrator API surface. Every upstream
/// decision point (watch restart, bind retry, patch-and-continue) matches on this
/// instead of re-deriving a policy from raw status codes.
#[derive(Error, SchedulerError, Kind, Debug)]
pub enum ApiError {
    /// Connection reset, timeout, or a 5xx response. Worth retrying.
    #[error("the orchestrator API was unreachable or returned a server error")]
    Transient(#[source] kube::Error),
    /// A 4xx response, or anything else we don't expect to clear on its own.
    #[error("the orchestrator API rejected the request")]
    Terminal(#[source] kube::Error),
}

impl ApiError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transient(_))
    }
}

impl From<kube::Error> for ApiError {
    fn from(err: kube::Error) -> Self {
        match &err {
            kube::Error::Api(resp) if resp.code >= 500 => ApiError::Transient(err),
            kube::Error::Api(_) => ApiError::Terminal(err),
            // @TODO kube::Error has a long tail of connection/protocol variants; for now
            // anything that isn't a parsed API response is assumed to be transient network
            // trouble rather than something the caller did wrong.
            _ => ApiError::Transient(err),
        }
    }
}

/// Raised if a `Binding` somehow fails to serialize to JSON before being posted
/// to the subresource endpoint. In practice this can't happen for the fixed
/// shape we construct, but `serde_json::to_vec` is still fallible.
#[derive(Error, SchedulerError, Kind, Debug)]
#[error("failed to serialize a binding request")]
pub struct BindSerializationError {
    #[source]
    pub cause: serde_json::Error,
}

/// Everything that can go wrong issuing a `Binding`. Kept distinct from
/// `ApiError` so `Binder::bind` can ask `is_transient()` of the one call that
/// actually needs to change its retry behavior on the answer, without every
/// other `Cluster` method paying for a richer return type it has no use for.
#[derive(Error, SchedulerError, Kind, Debug)]
pub enum BindError {
    #[error("failed to bind the pod to a node")]
    Api(#[from] ApiError),
    #[error("failed to serialize a binding request")]
    Serialize(#[from] BindSerializationError),
}

impl BindError {
    /// `false` for a serialization failure (it will fail identically on
    /// every retry) and for a terminal API response; `true` only when the
    /// underlying `ApiError` itself is `Transient`.
    pub fn is_transient(&self) -> bool {
        matches!(self, BindError::Api(inner) if inner.is_transient())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_is_transient() {
        let err = ApiError::from(kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".into(),
            message: "etcd unavailable".into(),
            reason: "InternalError".into(),
            code: 503,
        }));
        assert!(err.is_transient());
    }

    #[test]
    fn client_error_is_terminal() {
        let err = ApiError::from(kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".into(),
            message: "pod not found".into(),
            reason: "NotFound".into(),
            code: 404,
        }));
        assert!(!err.is_transient());
    }

    #[test]
    fn bind_error_inherits_transience_from_the_wrapped_api_error() {
        let transient: BindError = ApiError::from(kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".into(),
            message: "etcd unavailable".into(),
            reason: "InternalError".into(),
            code: 503,
        }))
        .into();
        assert!(transient.is_transient());

        let terminal: BindError = ApiError::from(kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".into(),
            message: "pod not found".into(),
            reason: "NotFound".into(),
            code: 404,
        }))
        .into();
        assert!(!terminal.is_transient());
    }

    #[test]
    fn bind_error_serialization_failure_is_never_transient() {
        let cause = serde_json::from_str::<serde_json::Value>("{not json}").unwrap_err();
        let err: BindError = BindSerializationError { cause }.into();
        assert!(!err.is_transient());
    }
}
