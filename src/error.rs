use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Index out of bounds: {index} >= {capacity}")]
    IndexOutOfBounds { index: usize, capacity: usize },

    #[error("Invalid fingerprint on line {line}: {reason}")]
    InvalidFingerprint { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "Failed to parse environment variable {var_name}: value '{value}' - {error}"
    )]
    EnvParseError {
        var_name: String,
        value: String,
        error: String,
    },

    #[error("Alert delivery failed: {0}")]
    Alert(String),
}
