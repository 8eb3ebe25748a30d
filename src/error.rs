use thiserror::Error;

/// Result type for pipeline sort operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while building or running a sort pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration rejected before any pipeline unit was created
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// The OS refused to spawn a pipeline thread
    #[error("Failed to spawn pipeline thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The shared shutdown flag was raised while a unit was blocked on a channel
    #[error("Pipeline was shut down before the stream drained")]
    Interrupted,

    /// Every pipeline unit terminated without delivering a completion report
    #[error("Pipeline terminated without reporting a result")]
    NoReport,
}
