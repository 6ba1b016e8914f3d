use thiserror::Error;

/// Main error type for the paropt engine.
#[derive(Error, Debug)]
pub enum OptError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Resource error: {0}")]
    Resource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for paropt operations.
pub type OptResult<T> = Result<T, OptError>;

/// Macro for creating configuration errors.
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::OptError::Config(format!($($arg)*))
    };
}

/// Macro for creating resource errors.
#[macro_export]
macro_rules! resource_error {
    ($($arg:tt)*) => {
        $crate::OptError::Resource(format!($($arg)*))
    };
}
