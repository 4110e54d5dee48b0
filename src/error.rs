//! Error taxonomy.
//!
//! There are two kinds of failure and no recoverable-error channel:
//!
//! - **User-block errors** - anything a user-supplied block returns while
//!   rendering. These propagate unchanged out of `render`/`rerender`; the
//!   engine performs no retry and leaves the output in whatever partial
//!   state existed at the moment of the failure.
//! - **Invariant violations** - programming errors in the engine or host
//!   misuse. Where the type system cannot rule them out they panic
//!   immediately and abort the render pass.

use thiserror::Error;

/// Boxed error type user blocks can fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure while rendering or updating. Propagated to the caller of
/// `render`/`rerender`, which decides user-visible behavior.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A user-supplied block failed.
    #[error(transparent)]
    User(#[from] BoxError),

    /// A user-supplied block failed with a plain message.
    #[error("{0}")]
    Message(String),
}

impl RenderError {
    /// Build a message-only error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_user_errors() {
        let source: BoxError = "disk full".into();
        let err = RenderError::from(source);
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn test_message() {
        let err = RenderError::message("bad input");
        assert_eq!(err.to_string(), "bad input");
    }
}
