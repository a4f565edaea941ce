use thiserror::Error;

pub type Result<T> = std::result::Result<T, EnrichError>;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Sample size {requested} exceeds the {available} available rows")]
    InsufficientData { requested: usize, available: usize },

    #[error("Query template is empty")]
    EmptyTemplate,

    #[error("Column '{0}' not found in input table")]
    UnknownColumn(String),

    /// Unreadable or malformed input table.
    #[error("Input error: {0}")]
    Input(String),

    #[error("Language detection failed: {0}")]
    LanguageDetection(String),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Invalid exclusion pattern '{name}': {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// A provider call that produced no usable reply.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
