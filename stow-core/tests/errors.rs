#[cfg(test)]
mod tests {
    use stow_core::{Error, ErrorContext, ErrorKind, Result, error_kind};

    fn failing() -> Result<()> {
        Err(ErrorKind::Usage.error("Transaction already started"))
    }

    #[test]
    fn kind_survives_context() {
        let error = failing()
            .context("While starting the transaction")
            .unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::Usage));
        let message = format!("{:#}", error);
        assert!(message.contains("While starting the transaction"), "{}", message);
        assert!(message.contains("Transaction already started"), "{}", message);
    }

    #[test]
    fn wrap_foreign_error() {
        let source = "abc".parse::<i32>().unwrap_err();
        let error = ErrorKind::Backend.wrap(source);
        assert_eq!(error_kind(&error), Some(ErrorKind::Backend));
        assert!(format!("{:#}", error).contains("invalid digit"));
    }

    #[test]
    fn foreign_error_has_no_kind() {
        let error = Error::msg("plain failure");
        assert_eq!(error_kind(&error), None);
    }

    #[test]
    fn display() {
        assert_eq!(ErrorKind::PoolExhausted.to_string(), "connection pool exhausted");
        assert_eq!(ErrorKind::NotFound.to_string(), "not found");
    }
}
