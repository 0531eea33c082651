//! Error types for teledrop.

use thiserror::Error;

/// Result type alias using teledrop's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Drop engine operations (§7).
#[derive(Error, Debug)]
pub enum Error {
    /// Slug unknown, or the blob backing a live File row is missing
    /// (the latter is logged as corruption but surfaced as NotFound).
    #[error("not found: {0}")]
    NotFound(String),

    /// No credentials were presented for a private or sensitive operation.
    #[error("authentication required")]
    AuthRequired,

    /// Credentials were presented but do not match the drop's owner.
    #[error("forbidden")]
    Forbidden,

    /// The drop is passphrase-protected and no passphrase was supplied.
    #[error("passphrase required")]
    PasswordRequired,

    /// The supplied passphrase does not verify.
    #[error("passphrase invalid")]
    PasswordInvalid,

    /// A user-supplied slug lost a unique-insert race.
    #[error("slug already taken: {0}")]
    SlugTaken(String),

    /// Auto-generated slug candidates were exhausted (8 retries).
    #[error("could not allocate a unique slug after {0} attempts")]
    SlugExhausted(u32),

    /// A user-supplied slug failed the lexical rules of §3.
    #[error("invalid slug: {0}")]
    SlugInvalid(String),

    /// Upload exceeded the configured maximum size.
    #[error("upload exceeds the size limit of {limit} bytes")]
    SizeLimitExceeded { limit: u64 },

    /// Any other input-shape violation (title/description length, malformed
    /// media type, boolean parse, etc).
    #[error("validation error: {0}")]
    ValidationError(String),

    /// I/O failure in the Blob Store.
    #[error("storage error: {0}")]
    Storage(String),

    /// A concurrent mutation race the store rejected.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error kind is a deny outcome the Access Evaluator can produce.
    pub fn is_access_denial(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_)
                | Error::AuthRequired
                | Error::Forbidden
                | Error::PasswordRequired
                | Error::PasswordInvalid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("greet".to_string());
        assert_eq!(err.to_string(), "not found: greet");
    }

    #[test]
    fn test_error_display_size_limit_exceeded() {
        let err = Error::SizeLimitExceeded { limit: 1024 };
        assert_eq!(err.to_string(), "upload exceeds the size limit of 1024 bytes");
    }

    #[test]
    fn test_error_display_slug_exhausted() {
        let err = Error::SlugExhausted(8);
        assert!(err.to_string().contains('8'));
    }

    #[test]
    fn test_access_denial_classification() {
        assert!(Error::NotFound("x".into()).is_access_denial());
        assert!(Error::AuthRequired.is_access_denial());
        assert!(Error::Forbidden.is_access_denial());
        assert!(Error::PasswordRequired.is_access_denial());
        assert!(Error::PasswordInvalid.is_access_denial());
        assert!(!Error::Conflict("x".into()).is_access_denial());
        assert!(!Error::SlugTaken("x".into()).is_access_denial());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
