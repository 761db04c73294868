use thiserror::Error;

use crate::models::RecordId;

#[derive(Debug, Error)]
pub enum KisetsuError {
    #[error("record {0} has neither a romaji nor an english title")]
    MissingTitle(RecordId),

    #[error("record {0} is not available from the data source")]
    UnknownRecord(RecordId),

    #[error("data source error: {0}")]
    Source(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("mapping file error: {0}")]
    Mapping(#[from] serde_yaml::Error),

    #[error("directory traversal error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
