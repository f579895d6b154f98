//! Validation handler factory
//!
//! [`validation`] closes over a [`SchemaConfig`] and returns a [`ValidationHandler`].
//! Each call to [`ValidationHandler::handle`]:
//!
//! 1. validates and commits the body, if a body schema is configured
//! 2. validates and commits the query, if a query schema is configured
//! 3. calls the continuation with `None` when both passed, or with
//!    `Some(error)` built from the first rejection
//! 4. runs the cleanup callback once, whatever happened above
//!
//! A body rejection stops the pass: the query schema is never called.
//!
//! ```rust,ignore
//! let handler = validation(SchemaConfig::new().body(person_schema()));
//!
//! let outcome = handler
//!     .handle(request, (), |request, _res, error| async move {
//!         match error {
//!             None => Ok(request),
//!             Some(e) => Err(e),
//!         }
//!     })
//!     .await;
//! ```

use crate::config::ValidateOptions;
use crate::core::error::{DefaultErrorFactory, ErrorFactory, ValidationRejection};
use crate::core::request::{RequestPart, RequestParts};
use crate::core::schema::Schema;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Callback run after every validation pass
pub type Cleanup = Arc<dyn Fn() + Send + Sync>;

/// Schemas for the body and query of a route
#[derive(Clone, Default)]
pub struct SchemaConfig {
    body: Option<Arc<dyn Schema>>,
    query: Option<Arc<dyn Schema>>,
}

impl SchemaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, schema: impl Schema + 'static) -> Self {
        self.body = Some(Arc::new(schema));
        self
    }

    pub fn query(mut self, schema: impl Schema + 'static) -> Self {
        self.query = Some(Arc::new(schema));
        self
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn has_query(&self) -> bool {
        self.query.is_some()
    }

    /// Configured schemas in validation order
    fn slots(&self) -> impl Iterator<Item = (RequestPart, &Arc<dyn Schema>)> {
        [
            (RequestPart::Body, self.body.as_ref()),
            (RequestPart::Query, self.query.as_ref()),
        ]
        .into_iter()
        .filter_map(|(part, schema)| schema.map(|schema| (part, schema)))
    }
}

impl fmt::Debug for SchemaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaConfig")
            .field("body", &self.has_body())
            .field("query", &self.has_query())
            .finish()
    }
}

/// Optional behavior of a [`ValidationHandler`]
pub struct ValidationOptions<F = DefaultErrorFactory> {
    /// Forwarded to every [`Schema::validate`] call
    pub validate_options: ValidateOptions,
    pub error_factory: F,
    pub cleanup: Option<Cleanup>,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            validate_options: ValidateOptions::default(),
            error_factory: DefaultErrorFactory,
            cleanup: None,
        }
    }
}

impl<F> ValidationOptions<F> {
    pub fn validate_options(mut self, validate_options: ValidateOptions) -> Self {
        self.validate_options = validate_options;
        self
    }

    /// Replace the error kind produced on failure
    pub fn error_factory<G: ErrorFactory>(self, error_factory: G) -> ValidationOptions<G> {
        ValidationOptions {
            validate_options: self.validate_options,
            error_factory,
            cleanup: self.cleanup,
        }
    }

    pub fn cleanup(mut self, cleanup: impl Fn() + Send + Sync + 'static) -> Self {
        self.cleanup = Some(Arc::new(cleanup));
        self
    }
}

impl<F: fmt::Debug> fmt::Debug for ValidationOptions<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("validate_options", &self.validate_options)
            .field("error_factory", &self.error_factory)
            .field("cleanup", &self.cleanup.is_some())
            .finish()
    }
}

struct Inner<F> {
    schema: SchemaConfig,
    options: ValidationOptions<F>,
}

/// Request handler produced by [`validation`] and [`validation_with`]
///
/// Cloning is cheap; clones share the same configuration.
pub struct ValidationHandler<F = DefaultErrorFactory> {
    inner: Arc<Inner<F>>,
}

impl<F> Clone for ValidationHandler<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: fmt::Debug> fmt::Debug for ValidationHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationHandler")
            .field("schema", &self.inner.schema)
            .field("options", &self.inner.options)
            .finish()
    }
}

/// Create a handler with default options
pub fn validation(schema: SchemaConfig) -> ValidationHandler {
    validation_with(schema, ValidationOptions::default())
}

/// Create a handler with explicit options
pub fn validation_with<F: ErrorFactory>(
    schema: SchemaConfig,
    options: ValidationOptions<F>,
) -> ValidationHandler<F> {
    ValidationHandler {
        inner: Arc::new(Inner { schema, options }),
    }
}

impl<F: ErrorFactory> ValidationHandler<F> {
    pub fn schema(&self) -> &SchemaConfig {
        &self.inner.schema
    }

    /// Validate and commit each configured part, body first
    ///
    /// On rejection the failing part and every later part keep their original
    /// values; earlier parts keep their committed values.
    pub async fn validate_request<R>(&self, request: &mut R) -> Result<(), F::Error>
    where
        R: RequestParts + ?Sized,
    {
        let options = &self.inner.options.validate_options;

        for (part, schema) in self.inner.schema.slots() {
            let validated = schema
                .validate(part.read(&*request), options)
                .await
                .map_err(|rejection| self.reject(part, rejection))?;
            part.write(&mut *request, validated);
        }

        Ok(())
    }

    /// Run the validation pass, then hand off to `next`
    ///
    /// `next` is called exactly once, with `None` to proceed or `Some(error)`
    /// to route the failure. `response` is passed through untouched. The
    /// cleanup callback runs after `next` completes, also when this future is
    /// dropped early or `next` panics.
    pub async fn handle<R, Res, N, Fut>(&self, mut request: R, response: Res, next: N) -> Fut::Output
    where
        R: RequestParts,
        N: FnOnce(R, Res, Option<F::Error>) -> Fut,
        Fut: Future,
    {
        let _cleanup = CleanupGuard::new(self.inner.options.cleanup.clone());
        let outcome = self.validate_request(&mut request).await;
        next(request, response, outcome.err()).await
    }

    fn reject(&self, part: RequestPart, rejection: ValidationRejection) -> F::Error {
        if rejection.errors.is_empty() {
            tracing::warn!(part = %part, "schema rejected the request without any message");
        }
        let message = rejection.joined();
        tracing::debug!(part = %part, message = %message, "request validation failed");
        self.inner.options.error_factory.from_message(message)
    }
}

/// Runs the cleanup callback once when dropped
struct CleanupGuard(Option<Cleanup>);

impl CleanupGuard {
    fn new(cleanup: Option<Cleanup>) -> Self {
        Self(cleanup)
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let Some(cleanup) = self.0.take() else {
            return;
        };
        // a panicking cleanup must not abort while unwinding from `next`
        if panic::catch_unwind(AssertUnwindSafe(|| cleanup())).is_err() {
            tracing::warn!("validation cleanup callback panicked");
        }
    }
}
