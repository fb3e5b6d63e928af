use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Required line item '{0}' not found")]
    MissingAnchor(String),

    #[error("Expected exactly 3 columns (label, prior year, current year), found {0}")]
    ColumnCount(usize),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Workbook contains no worksheets")]
    EmptyWorkbook,

    #[error("API key '{0}' not found in secret store")]
    MissingCredential(String),

    #[error("AI service error: {0}")]
    Transport(String),

    #[error("No financial table loaded")]
    NoTableLoaded,

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AnalysisError {
    /// Whether the failure came from talking to the AI backend rather than from
    /// the data pipeline.
    pub fn is_transport(&self) -> bool {
        match self {
            AnalysisError::Transport(_) => true,
            #[cfg(feature = "gemini")]
            AnalysisError::Http(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
