//! Axum extractor for validated request parts
//!
//! This module provides the `Validated` extractor that hands route handlers the
//! body and query produced by the validation middleware.

use crate::core::error::ThisError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Body and query as committed by the validation pass
///
/// A part the route has no schema for is `null`.
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn list_invoices(validated: Validated) -> Result<Json<Vec<Invoice>>, ThisError> {
///     let page: Pagination = validated.query_as()?;
///     // page.limit is already a number here
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub body: Value,
    pub query: Value,
}

impl Validated {
    /// Deserialize the validated body
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, ThisError> {
        Self::decode(&self.body, "body")
    }

    /// Deserialize the validated query
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, ThisError> {
        Self::decode(&self.query, "query")
    }

    fn decode<T: DeserializeOwned>(value: &Value, part: &str) -> Result<T, ThisError> {
        T::deserialize(value).map_err(|e| {
            ThisError::Internal(format!("validated {} does not fit the handler type: {}", part, e))
        })
    }
}

impl<S> FromRequestParts<S> for Validated
where
    S: Send + Sync,
{
    type Rejection = ThisError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Validated>().cloned().ok_or_else(|| {
            ThisError::Internal("route is not wrapped by the validation middleware".to_string())
        })
    }
}
