use thiserror::Error;

/// Errors surfaced by a drill session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The termination bound must be a positive number of seconds or rounds.
    #[error("max_value must be a positive integer, got {max_value}")]
    InvalidConfig { max_value: i64 },

    /// Terminal read or write failed, or the user aborted with Ctrl+C.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
