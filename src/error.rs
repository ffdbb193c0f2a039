use thiserror::Error;

#[derive(Error, Debug)]
pub enum PainelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// The backend answered, but with an error payload or a failure status.
    #[error("API error: {0}")]
    Api(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PainelError>;
