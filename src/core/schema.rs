//! The validatable shape consumed by the handler

use crate::config::ValidateOptions;
use crate::core::error::ValidationRejection;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Something that can validate and coerce a JSON value
///
/// Implementations must not mutate `value`; the coerced result is returned
/// and the caller decides whether to commit it. The built-in implementation
/// is [`ObjectSchema`](crate::schema::ObjectSchema).
#[async_trait]
pub trait Schema: Send + Sync {
    /// Validate `value`, returning its coerced form
    async fn validate(
        &self,
        value: &Value,
        options: &ValidateOptions,
    ) -> Result<Value, ValidationRejection>;
}

#[async_trait]
impl<S> Schema for Arc<S>
where
    S: Schema + ?Sized,
{
    async fn validate(
        &self,
        value: &Value,
        options: &ValidateOptions,
    ) -> Result<Value, ValidationRejection> {
        (**self).validate(value, options).await
    }
}
