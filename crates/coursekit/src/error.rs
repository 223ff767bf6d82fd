#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid parameter '{0}': expected KEY=VALUE")]
    InvalidParam(String),

    #[error("Invalid JSON payload: {0}")]
    InvalidPayload(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
