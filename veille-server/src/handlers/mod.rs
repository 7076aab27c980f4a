//! Request handlers, one module per resource.
//!
//! Each endpoint is a thin axum wrapper around a pure inner function that
//! does validation, authorization and storage. The inner functions are
//! directly testable without axum dispatch machinery.

pub mod generate;
pub mod historique;
pub mod veille;

use axum::body::Bytes;
use serde_json::Value;

use crate::error::ApiError;

/// Decode a raw request body. Bodies are parsed by hand rather than with
/// the `Json` extractor so malformed JSON surfaces as the API's own
/// `INTERNAL_ERROR` payload instead of axum's plain-text rejection.
pub(crate) fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::Internal(err.to_string()))
}
