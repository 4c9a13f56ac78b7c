use thiserror::Error;

pub type PolishResult<T> = Result<T, PolishError>;

#[derive(Error, Debug)]
pub enum PolishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Read(#[from] calamine::Error),

    #[error("{0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Transform error: {0}")]
    Transform(String),
}
