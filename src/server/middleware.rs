//! Axum integration of [`ValidationHandler`]
//!
//! Two equivalent entry points:
//!
//! ```rust,ignore
//! // as a tower layer
//! Router::new().route("/users", post(create_user).layer(ValidationLayer::new(handler)));
//!
//! // as an axum middleware function
//! Router::new()
//!     .route("/users", post(create_user))
//!     .layer(axum::middleware::from_fn_with_state(
//!         handler,
//!         validate_middleware::<DefaultErrorFactory>,
//!     ));
//! ```
//!
//! Only the parts the handler has a schema for are decoded. A configured body
//! is read as JSON (an empty body is `{}`) and a configured query string as an
//! object of strings, with repeated keys collected into arrays. On success a
//! validated body replaces the original one and both parts are stored in the
//! request extensions as [`Validated`], since typed query values cannot be
//! written back into the URI. Unconfigured parts travel untouched. On failure
//! the error kind is rendered with [`IntoResponse`].

use super::extractor::Validated;
use crate::core::error::{ErrorFactory, RequestError};
use crate::core::handler::{SchemaConfig, ValidationHandler};
use crate::core::request::RequestParts;
use axum::body::Body;
use axum::extract::{Query, Request, State};
use axum::http::{HeaderValue, Uri, header, request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Largest body read before validation
pub const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// HTTP request split into its head and JSON parts
///
/// `body` and `query` are `null` for parts that were not decoded.
#[derive(Debug)]
pub struct HttpRequest {
    head: request::Parts,
    body: Value,
    query: Value,
}

impl HttpRequest {
    /// Decode the parts `schema` validates, keeping the others as they are
    ///
    /// Without a body schema the original body is returned alongside, to be
    /// handed back to [`into_request`](Self::into_request) unread.
    pub async fn from_request(
        request: Request,
        schema: &SchemaConfig,
    ) -> Result<(Self, Option<Body>), RequestError> {
        let (head, raw) = request.into_parts();

        let query = if schema.has_query() {
            decode_query(&head.uri)?
        } else {
            Value::Null
        };

        if !schema.has_body() {
            let request = Self {
                head,
                body: Value::Null,
                query,
            };
            return Ok((request, Some(raw)));
        }

        let bytes = axum::body::to_bytes(raw, BODY_LIMIT)
            .await
            .map_err(|e| RequestError::InvalidBody {
                message: e.to_string(),
            })?;

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Map::new())
        } else {
            serde_json::from_slice(&bytes).map_err(|e| RequestError::InvalidJson {
                message: e.to_string(),
            })?
        };

        Ok((Self { head, body, query }, None))
    }

    /// Rebuild the HTTP request around `raw`, or around the current body
    pub fn into_request(self, raw: Option<Body>) -> Request {
        let Self {
            mut head,
            body,
            query,
        } = self;

        let raw = match raw {
            Some(raw) => raw,
            None => {
                let bytes = body.to_string().into_bytes();
                head.headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                head.headers
                    .insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));
                Body::from(bytes)
            }
        };
        head.extensions.insert(Validated { body, query });

        Request::from_parts(head, raw)
    }
}

/// Query string as an object of strings, repeated keys as arrays
fn decode_query(uri: &Uri) -> Result<Value, RequestError> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).map_err(|e| {
        RequestError::InvalidQuery {
            message: e.body_text(),
        }
    })?;

    let mut query = Map::new();
    for (key, value) in pairs {
        let value = Value::String(value);
        match query.get_mut(&key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                query.insert(key, value);
            }
        }
    }

    Ok(Value::Object(query))
}

impl RequestParts for HttpRequest {
    fn body(&self) -> &Value {
        &self.body
    }

    fn set_body(&mut self, body: Value) {
        self.body = body;
    }

    fn query(&self) -> &Value {
        &self.query
    }

    fn set_query(&mut self, query: Value) {
        self.query = query;
    }
}

/// Validate `request`, then either forward it with `forward` or render the error
async fn run<F, Fwd, Fut>(handler: ValidationHandler<F>, request: Request, forward: Fwd) -> Response
where
    F: ErrorFactory,
    F::Error: IntoResponse,
    Fwd: FnOnce(Request) -> Fut,
    Fut: Future<Output = Response>,
{
    let (request, raw) = match HttpRequest::from_request(request, handler.schema()).await {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!(error = %e, "request could not be decoded for validation");
            return e.into_response();
        }
    };

    handler
        .handle(request, (), |request, (), error| async move {
            match error {
                None => forward(request.into_request(raw)).await,
                Some(error) => error.into_response(),
            }
        })
        .await
}

/// Middleware function for [`axum::middleware::from_fn_with_state`]
pub async fn validate_middleware<F>(
    State(handler): State<ValidationHandler<F>>,
    request: Request,
    next: Next,
) -> Response
where
    F: ErrorFactory,
    F::Error: IntoResponse,
{
    run(handler, request, |request| next.run(request)).await
}

/// Tower layer running a [`ValidationHandler`] before the inner service
pub struct ValidationLayer<F> {
    handler: ValidationHandler<F>,
}

impl<F> ValidationLayer<F> {
    pub fn new(handler: ValidationHandler<F>) -> Self {
        Self { handler }
    }
}

impl<F> Clone for ValidationLayer<F> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
        }
    }
}

impl<S, F> Layer<S> for ValidationLayer<F> {
    type Service = ValidationService<S, F>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidationService {
            inner,
            handler: self.handler.clone(),
        }
    }
}

/// Service produced by [`ValidationLayer`]
pub struct ValidationService<S, F> {
    inner: S,
    handler: ValidationHandler<F>,
}

impl<S: Clone, F> Clone for ValidationService<S, F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl<S, F> Service<Request> for ValidationService<S, F>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
    F: ErrorFactory,
    F::Error: IntoResponse,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // the ready service is the one that must be called
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let handler = self.handler.clone();

        Box::pin(async move {
            let response = run(handler, request, move |request| async move {
                match inner.call(request).await {
                    Ok(response) => response,
                    Err(never) => match never {},
                }
            })
            .await;
            Ok(response)
        })
    }
}
