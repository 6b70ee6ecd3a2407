use error::SchedulerError;

/// A `Result` is an alias of [`std::result::Result`] with its error variant pre-populated
/// with a `Box<dyn SchedulerError>`, so components can write `Result<Node>` instead of
/// `std::result::Result<Node, Box<dyn SchedulerError>>` everywhere.
pub type Result<T> = std::result::Result<T, Box<dyn SchedulerError>>;
