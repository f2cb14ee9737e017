use thiserror::Error;

pub type VariantResult<T> = Result<T, VariantError>;

#[derive(Error, Debug)]
pub enum VariantError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid arm: '{0}' is not a configured variant")]
    InvalidArm(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),
}
