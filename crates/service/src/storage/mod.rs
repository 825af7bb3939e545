//! Storage abstractions for service layer
//!
//! Contains the file-backed map store the user repository sits on.

pub mod json_map_store;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(String),
    #[error("storage file is corrupt: {0}")]
    Corrupt(String),
    #[error("storage encode error: {0}")]
    Encode(String),
}
