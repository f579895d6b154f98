//! Request parts the handler reads and overwrites

use serde_json::{Value, json};
use std::fmt;

/// A request carrying a JSON body and a JSON query object
pub trait RequestParts {
    fn body(&self) -> &Value;

    fn set_body(&mut self, body: Value);

    fn query(&self) -> &Value;

    fn set_query(&mut self, query: Value);
}

/// Which part of the request a schema applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestPart {
    Body,
    Query,
}

impl RequestPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPart::Body => "body",
            RequestPart::Query => "query",
        }
    }

    pub(crate) fn read<R: RequestParts + ?Sized>(self, request: &R) -> &Value {
        match self {
            RequestPart::Body => request.body(),
            RequestPart::Query => request.query(),
        }
    }

    pub(crate) fn write<R: RequestParts + ?Sized>(self, request: &mut R, value: Value) {
        match self {
            RequestPart::Body => request.set_body(value),
            RequestPart::Query => request.set_query(value),
        }
    }
}

impl fmt::Display for RequestPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plain in-memory request
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRequest {
    pub body: Value,
    pub query: Value,
}

impl ValidationRequest {
    pub fn new(body: Value, query: Value) -> Self {
        Self { body, query }
    }

    /// Request with the given body and an empty query
    pub fn with_body(body: Value) -> Self {
        Self::new(body, json!({}))
    }

    /// Request with the given query and an empty body
    pub fn with_query(query: Value) -> Self {
        Self::new(json!({}), query)
    }
}

impl RequestParts for ValidationRequest {
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
