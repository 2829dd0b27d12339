//! Error type shared by the index store.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing the index file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The index could not be encoded as JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
