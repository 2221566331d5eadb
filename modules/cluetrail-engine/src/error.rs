/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("daily buzz limit reached")]
    DailyCeiling,

    #[error("no active target configured")]
    NoActiveTarget,

    #[error("database error: {0}")]
    Database(#[from] anyhow::Error),
}
