//! Axum integration
//!
//! This module plugs a `ValidationHandler` into axum's middleware chain:
//! - `ValidationLayer` for `Router::layer` / `MethodRouter::layer`
//! - `validate_middleware` for `axum::middleware::from_fn_with_state`
//! - `Validated` to read the committed body and query in route handlers

pub mod extractor;
pub mod middleware;

pub use extractor::Validated;
pub use middleware::{HttpRequest, ValidationLayer, ValidationService, validate_middleware};
