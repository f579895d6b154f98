//! # This-Validation
//!
//! Schema-driven validation of request bodies and query strings for axum
//! pipelines.
//!
//! ## Features
//!
//! - **Validation Handler**: One factory, one async handler per route
//! - **Ordered Validation**: Body before query, first rejection wins
//! - **In-place Coercion**: Handlers receive the validated, coerced values
//! - **Pluggable Errors**: Any error kind through `ErrorFactory`
//! - **Cleanup Hook**: A callback run once after every validation pass
//! - **Built-in Schemas**: Typed fields, transforms, rules, custom messages
//! - **YAML Configuration**: Declare route schemas and options in YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use this_validation::prelude::*;
//!
//! let person = ObjectSchema::new()
//!     .field(Field::string("name").required())
//!     .field(Field::number("age").required().map_number(|age| age + 2.0));
//!
//! let handler = validation(SchemaConfig::new().body(person));
//!
//! let app = Router::new().route(
//!     "/people",
//!     post(create_person).layer(ValidationLayer::new(handler)),
//! );
//! ```

pub mod config;
pub mod core;
pub mod schema;
pub mod server;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{
            DefaultErrorFactory, ErrorFactory, ErrorResponse, ThisError, ValidationError,
            ValidationRejection, error_factory_fn,
        },
        handler::{SchemaConfig, ValidationHandler, ValidationOptions, validation, validation_with},
        request::{RequestPart, RequestParts, ValidationRequest},
        schema::Schema,
    };

    // === Schemas ===
    pub use crate::schema::{Field, FieldType, ObjectSchema, Rule, transforms};

    // === Config ===
    pub use crate::config::{RouteValidationConfig, SchemaDefinition, ValidateOptions};

    // === Server ===
    pub use crate::server::{Validated, ValidationLayer, validate_middleware};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};

    // === Axum ===
    pub use axum::{
        Router,
        routing::{get, post, put},
    };
}
