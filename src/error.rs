//! Fatal error types for the release workflow.
//!
//! Anything that can go wrong in a way the workflow cannot report as a normal
//! [`ReleaseOutcome`](crate::workflow::ReleaseOutcome) ends up here: a missing
//! executable, an unreadable README, a logger that refuses to start. These
//! propagate to `main` and terminate the process with a non-zero status.

use thiserror::Error;

/// Main error type for release operations.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Executable \"{program}\" was not found (full command: {command})")]
    ExecutableNotFound { program: String, command: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),
}

/// Result type alias using ReleaseError
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create an executable-not-found error from the attempted argv
    pub fn executable_not_found(argv: &[String]) -> Self {
        Self::ExecutableNotFound {
            program: argv.first().cloned().unwrap_or_default(),
            command: format!("{argv:?}"),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formats() {
        let argv = vec!["gitx".to_string(), "push".to_string()];
        let err = ReleaseError::executable_not_found(&argv);
        assert_eq!(
            err.to_string(),
            r#"Executable "gitx" was not found (full command: ["gitx", "push"])"#
        );

        let err = ReleaseError::invalid_config("empty marker prefix");
        assert_eq!(err.to_string(), "Invalid configuration: empty marker prefix");
    }

    #[test]
    fn test_error_helpers() {
        let err = ReleaseError::executable_not_found(&[]);
        assert!(matches!(
            err,
            ReleaseError::ExecutableNotFound { ref program, .. } if program.is_empty()
        ));

        let err = ReleaseError::invalid_config("missing field");
        assert!(matches!(err, ReleaseError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_conversions() {
        let io_err =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: ReleaseError = io_err.into();
        assert!(matches!(err, ReleaseError::Io(_)));
    }

    struct NoopLogger;

    impl log::Log for NoopLogger {
        fn enabled(&self, _: &log::Metadata) -> bool {
            false
        }

        fn log(&self, _: &log::Record) {}

        fn flush(&self) {}
    }

    static NOOP_LOGGER: NoopLogger = NoopLogger;

    #[test]
    fn test_logger_error_conversion() {
        // the global logger can only be installed once per process
        let _ = log::set_logger(&NOOP_LOGGER);
        let err: ReleaseError =
            log::set_logger(&NOOP_LOGGER).unwrap_err().into();

        assert!(matches!(err, ReleaseError::LoggerError(_)));
        assert!(err.to_string().starts_with("Logger initialization error:"));
    }
}
