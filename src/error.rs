use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArrangeError {
    #[error("item {0} has an empty outline and cannot be arranged")]
    EmptyItemOutline(u64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("bed {0} does not exist")]
    UnknownBed(i32),

    #[error("no-fit-polygon construction failed: {0}")]
    NfpConstruction(String),

    #[error("convex decomposition failed for item {0}: {1}")]
    DecompositionFailed(u64, String),

    #[error("arrangement was canceled")]
    Canceled,

    #[error("nothing to arrange: item list is empty")]
    Empty,

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArrangeError>;
