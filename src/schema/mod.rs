//! Built-in schema engine
//!
//! A small object schema implementation of [`Schema`](crate::core::Schema):
//! typed fields with string coercion, transforms, rules and custom messages.
//! Any other engine can be plugged in by implementing the trait.

pub mod object;
pub mod rules;
pub mod transforms;

pub use object::{Field, FieldType, ObjectSchema};
pub use rules::{Rule, RuleKind};
pub use transforms::Transform;
