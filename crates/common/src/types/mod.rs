use serde::{Deserialize, Serialize};

/// Body returned by the health endpoint.
pub const HEALTH_OK: &str = "success";

/// JSON body for every handled failure: a single human-readable message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
