use thiserror::Error;

/// Errors produced by the explorer core and the filesystem backend.
///
/// `Io` and `Precondition` carry ready-to-display text; the status line shows
/// them verbatim. `Stale` marks a superseded async result and is discarded
/// before it ever reaches the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplorerError {
    /// A backend call failed: missing path, permission denied, device error.
    #[error("{0}")]
    Io(String),

    /// An action was invoked in a state that cannot accept it, e.g. paste
    /// with nothing staged. Raised before any backend call is made.
    #[error("{0}")]
    Precondition(String),

    /// A response that arrived after a newer request superseded it.
    #[error("stale response")]
    Stale,
}

impl ExplorerError {
    /// Wraps an `io::Error` with the operation context, e.g.
    /// `cannot read /tmp/x: permission denied`.
    pub fn io(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        ExplorerError::Io(format!("{context}: {err}"))
    }

    pub fn io_msg(message: impl Into<String>) -> Self {
        ExplorerError::Io(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        ExplorerError::Precondition(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_helper_prefixes_the_context() {
        let err = ExplorerError::io(
            "cannot read /tmp/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        );
        assert_eq!(err.to_string(), "cannot read /tmp/x: permission denied");
    }

    #[test]
    fn precondition_displays_its_message_verbatim() {
        let err = ExplorerError::precondition("nothing selected");
        assert_eq!(err.to_string(), "nothing selected");
    }
}
