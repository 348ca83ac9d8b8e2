//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod challenges;
pub mod goals;
pub mod health;
pub mod score;
pub mod tips;
pub mod transactions;

// Re-export all handlers for use in router
pub use challenges::*;
pub use goals::*;
pub use health::*;
pub use score::*;
pub use tips::*;
pub use transactions::*;

use serde::de::DeserializeOwned;

use crate::AppError;

/// Parse a JSON request body, answering 400 on anything malformed
pub(crate) fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        AppError::bad_request("Invalid JSON")
    })
}
