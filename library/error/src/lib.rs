pub use error_derive::SchedulerError;
pub use kind::Kind;
pub use thiserror;
pub use thiserror::Error;

/// A `SchedulerError` is the trait every error type surfaced by a scheduler component
/// MUST adhere to. The easiest way to implement it is with the derive macros re-exported
/// here: [`Error`](thiserror::Error), [`SchedulerError`](error_derive::SchedulerError), and
/// [`Kind`](kind::Kind).
///
/// ```
/// use error::*;
///
/// #[derive(Error, SchedulerError, Kind, Debug)]
/// #[error("no node in the cluster tolerates pod {pod}'s requirements")]
/// struct NoCompatibleNode {
///     pod: String,
/// }
/// ```
pub trait SchedulerError: std::error::Error + Kind + Send + Sync {
    /// A single structured log line describing this error, in the same
    /// `key=value` style used for the scheduler's stage/latency trace lines.
    fn log_line(&self) -> String {
        match self.source() {
            Some(cause) => format!("kind={} message=\"{}\" cause=\"{}\"", self.kind(), self, cause),
            None => format!("kind={} message=\"{}\"", self.kind(), self),
        }
    }
}

/// Boxes any [`SchedulerError`] into the crate-wide dynamic error object.
impl<T: 'static + SchedulerError> From<T> for Box<dyn SchedulerError> {
    fn from(err: T) -> Self {
        Box::new(err)
    }
}

/// A convenient way to lift a raw string into a first class `SchedulerError`, most useful
/// as a `#[source]` for a higher level error when the underlying cause has no richer type.
#[derive(Error, SchedulerError, Kind, Debug)]
#[error("{inner}")]
pub struct StringError {
    inner: String,
}

impl<T: AsRef<str>> From<T> for StringError {
    fn from(inner: T) -> Self {
        Self {
            inner: inner.as_ref().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Error, SchedulerError, Kind, Debug)]
    #[error("bind exhausted its retries")]
    struct BindExhausted {}

    #[derive(Error, SchedulerError, Kind, Debug)]
    #[error("could not patch the rejection annotation")]
    struct PatchFailed {
        #[source]
        cause: BindExhausted,
    }

    #[test]
    fn log_line_without_cause() {
        let err = BindExhausted {};
        assert_eq!(
            err.log_line(),
            "kind=BindExhausted message=\"bind exhausted its retries\""
        );
    }

    #[test]
    fn log_line_with_cause() {
        let err = PatchFailed {
            cause: BindExhausted {},
        };
        assert_eq!(
            err.log_line(),
            "kind=PatchFailed message=\"could not patch the rejection annotation\" cause=\"bind exhausted its retries\""
        );
    }

    #[test]
    fn boxes_into_dyn_scheduler_error() {
        let boxed: Box<dyn SchedulerError> = BindExhausted {}.into();
        assert_eq!(boxed.kind(), "BindExhausted");
    }
}
