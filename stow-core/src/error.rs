use crate::Error;
use std::fmt::Display;

/// Category of every failure raised by this crate.
///
/// The kind travels inside the [`Error`] chain and can be recovered with
/// [`error_kind`], the human readable message is attached as context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorKind {
    /// Invalid catalog or constraint setup (zero-field table, misowned constraint).
    #[error("configuration error")]
    Configuration,
    /// Wrong call order or misuse of an API (double `begin`, unprepared statement).
    #[error("usage error")]
    Usage,
    /// Failure reported by the database driver.
    #[error("backend error")]
    Backend,
    /// Unknown connector scheme or name.
    #[error("not found")]
    NotFound,
    /// Feature not implemented by the dialect.
    #[error("unsupported by the dialect")]
    Unsupported,
    /// No pooled connection freed up before the timeout.
    #[error("connection pool exhausted")]
    PoolExhausted,
}

impl ErrorKind {
    /// Create a new error of this kind carrying `message`.
    pub fn error(self, message: impl Display + Send + Sync + 'static) -> Error {
        Error::new(self).context(message)
    }

    /// Tag an existing error (usually a driver one) with this kind.
    pub fn wrap(self, source: impl Into<Error>) -> Error {
        source.into().context(self)
    }
}

/// Kind of the error, if it was produced by this crate.
pub fn error_kind(error: &Error) -> Option<ErrorKind> {
    error.downcast_ref::<ErrorKind>().copied()
}
