//! Object schemas over JSON values

use super::rules::Rule;
use super::transforms::{Transform, map_number, number_value};
use crate::config::ValidateOptions;
use crate::core::error::ValidationRejection;
use crate::core::schema::Schema;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Type a field value is cast to before rules run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    #[default]
    Any,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Any => "mixed",
        }
    }

    /// Coerce `value` into this type, `None` when it cannot be
    fn cast(&self, value: Value) -> Option<Value> {
        match (self, value) {
            (_, Value::Null) => Some(Value::Null),
            (FieldType::Any, value) => Some(value),

            (FieldType::Number, Value::Number(n)) => n.as_f64().map(number_value),
            (FieldType::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(number_value),

            (FieldType::Boolean, Value::Bool(b)) => Some(Value::Bool(b)),
            (FieldType::Boolean, Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },

            (FieldType::String, Value::String(s)) => Some(Value::String(s)),
            (FieldType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (FieldType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),

            _ => None,
        }
    }
}

/// A named field of an [`ObjectSchema`]
#[derive(Clone)]
pub struct Field {
    name: String,
    field_type: FieldType,
    required: bool,
    required_message: Option<String>,
    transforms: Vec<Transform>,
    rules: Vec<Rule>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            required_message: None,
            transforms: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Any)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn required_with(mut self, message: impl Into<String>) -> Self {
        self.required = true;
        self.required_message = Some(message.into());
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Shorthand for `transform(map_number(f))`
    pub fn map_number<F>(self, f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.transform(map_number(f))
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn min(self, min: f64) -> Self {
        self.rule(Rule::min(min))
    }

    pub fn max(self, max: f64) -> Self {
        self.rule(Rule::max(max))
    }

    /// Cast, transform and check one value
    ///
    /// Returns the coerced value, or every message when `abort_early` is off.
    fn resolve(&self, raw: Value, abort_early: bool) -> Result<Value, Vec<String>> {
        let Some(cast) = self.field_type.cast(raw) else {
            return Err(vec![self.type_message()]);
        };

        let value = if cast.is_null() {
            cast
        } else {
            let transformed = self
                .transforms
                .iter()
                .fold(cast, |value, transform| transform(value));
            // a transform yielding null produced a value the type cannot hold
            if transformed.is_null() {
                return Err(vec![self.type_message()]);
            }
            transformed
        };

        if value.is_null() {
            return if self.required {
                Err(vec![self.required_message.clone().unwrap_or_else(|| {
                    format!("{} is a required field", self.name)
                })])
            } else {
                Ok(value)
            };
        }

        let mut errors = Vec::new();
        for rule in &self.rules {
            if let Err(message) = rule.check(&self.name, &value) {
                errors.push(message);
                if abort_early {
                    break;
                }
            }
        }

        if errors.is_empty() {
            Ok(value)
        } else {
            Err(errors)
        }
    }
}

impl Field {
    fn type_message(&self) -> String {
        format!(
            "{} must be a `{}` type",
            self.name,
            self.field_type.as_str()
        )
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("required", &self.required)
            .field("transforms", &self.transforms.len())
            .field("rules", &self.rules)
            .finish()
    }
}

/// Schema for a JSON object with declared fields
///
/// ```rust,ignore
/// let schema = ObjectSchema::new()
///     .field(Field::string("name").required())
///     .field(Field::number("age").required().map_number(|age| age + 2.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: IndexMap<String, Field>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field; a field with the same name is replaced in place
    pub fn field(mut self, field: Field) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Validate without going through the async [`Schema`] seam
    pub fn check(
        &self,
        value: &Value,
        options: &ValidateOptions,
    ) -> Result<Value, ValidationRejection> {
        let empty = Map::new();
        let input = match value {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => return Err(ValidationRejection::single("this must be a `object` type")),
        };

        let mut output = if options.strip_unknown {
            Map::new()
        } else {
            input.clone()
        };
        let mut errors = Vec::new();

        for (name, field) in &self.fields {
            let raw = input.get(name).cloned().unwrap_or(Value::Null);
            match field.resolve(raw, options.abort_early) {
                Ok(value) => {
                    if !value.is_null() || input.contains_key(name) {
                        output.insert(name.clone(), value);
                    }
                }
                Err(messages) => {
                    if options.abort_early {
                        return Err(ValidationRejection::new(messages));
                    }
                    errors.extend(messages);
                }
            }
        }

        if errors.is_empty() {
            Ok(Value::Object(output))
        } else {
            Err(ValidationRejection::new(errors))
        }
    }
}

#[async_trait]
impl Schema for ObjectSchema {
    async fn validate(
        &self,
        value: &Value,
        options: &ValidateOptions,
    ) -> Result<Value, ValidationRejection> {
        self.check(value, options)
    }
}
