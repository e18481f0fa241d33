use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("patient {0} already exists")]
    Duplicate(String),
    #[error("patient {0} not found")]
    NotFound(String),
    #[error("failed to access roster {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid roster json: {0}")]
    Json(#[from] serde_json::Error),
}
