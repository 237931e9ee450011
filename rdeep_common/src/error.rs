use thiserror::Error;

#[derive(Error, Debug)]
pub enum RDeepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid pattern: {0}")]
    Pattern(String),

    #[error("Value cannot be represented: {0}")]
    Unrepresentable(String),
}

pub type Result<T> = std::result::Result<T, RDeepError>;
