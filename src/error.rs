use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Partner '{partner}' is missing required config field '{field}'")]
    MissingField { partner: String, field: String },

    #[error("Partner '{partner}' has an unsupported date format pattern '{pattern}'")]
    DateFormat { partner: String, pattern: String },

    #[error("Failed to read source for partner '{partner}' at '{location}': {source}")]
    SourceRead {
        partner: String,
        location: String,
        #[source]
        source: Box<PipelineError>,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
