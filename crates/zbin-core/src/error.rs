use thiserror::Error;

pub type ZbinResult<T> = Result<T, ZbinError>;

#[derive(Debug, Error)]
pub enum ZbinError {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
