//! Core module containing the validation handler and the traits it is built on

pub mod error;
pub mod handler;
pub mod request;
pub mod schema;

pub use error::{
    DefaultErrorFactory, ErrorFactory, ThisError, ValidationError, ValidationRejection,
    error_factory_fn,
};
pub use handler::{Cleanup, SchemaConfig, ValidationHandler, ValidationOptions, validation, validation_with};
pub use request::{RequestPart, RequestParts, ValidationRequest};
pub use schema::Schema;
