//! Declarative object schemas
//!
//! A [`SchemaDefinition`] is the serde form of an [`ObjectSchema`]. Rules are
//! applied in a fixed order: `min`, `max`, `one_of`, `matches`, `date_format`,
//! `email`, `url`, `uuid`. Transforms run as `trim`, `lowercase`, `uppercase`,
//! `round`.

use crate::core::error::ConfigError;
use crate::schema::{Field, FieldType, ObjectSchema, Rule, transforms};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Keys accepted in `messages`
const MESSAGE_KEYS: &[&str] = &[
    "required",
    "min",
    "max",
    "one_of",
    "matches",
    "date_format",
    "email",
    "url",
    "uuid",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub fields: Vec<FieldDefinition>,
}

/// One field of a [`SchemaDefinition`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub min: Option<f64>,

    #[serde(default)]
    pub max: Option<f64>,

    #[serde(default)]
    pub one_of: Option<Vec<String>>,

    /// Regular expression the value must match
    #[serde(default)]
    pub matches: Option<String>,

    /// chrono format string, e.g. `%Y-%m-%d`
    #[serde(default)]
    pub date_format: Option<String>,

    #[serde(default)]
    pub email: bool,

    #[serde(default)]
    pub url: bool,

    #[serde(default)]
    pub uuid: bool,

    #[serde(default)]
    pub trim: bool,

    #[serde(default)]
    pub lowercase: bool,

    #[serde(default)]
    pub uppercase: bool,

    /// Decimal places to round numbers to
    #[serde(default)]
    pub round: Option<u32>,

    /// Message overrides keyed by rule name
    #[serde(default)]
    pub messages: HashMap<String, String>,
}

impl SchemaDefinition {
    /// Load a definition from a YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let definition: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        Ok(definition)
    }

    pub fn build(&self) -> Result<ObjectSchema, ConfigError> {
        self.fields
            .iter()
            .try_fold(ObjectSchema::new(), |schema, field| -> Result<_, ConfigError> {
                Ok(schema.field(field.build()?))
            })
    }
}

impl FieldDefinition {
    pub fn build(&self) -> Result<Field, ConfigError> {
        if let Some(key) = self
            .messages
            .keys()
            .find(|key| !MESSAGE_KEYS.contains(&key.as_str()))
        {
            return Err(self.invalid("messages", key, "unknown rule name"));
        }

        let mut field = Field::new(&self.name, self.field_type);

        if self.required {
            field = match self.message("required") {
                Some(message) => field.required_with(message),
                None => field.required(),
            };
        }

        if self.trim {
            field = field.transform(transforms::trim());
        }
        if self.lowercase {
            field = field.transform(transforms::lowercase());
        }
        if self.uppercase {
            field = field.transform(transforms::uppercase());
        }
        if let Some(decimals) = self.round {
            field = field.transform(transforms::round_decimals(decimals));
        }

        let mut rules = Vec::new();
        if let Some(min) = self.min {
            rules.push(("min", Rule::min(min)));
        }
        if let Some(max) = self.max {
            rules.push(("max", Rule::max(max)));
        }
        if let Some(allowed) = &self.one_of {
            rules.push(("one_of", Rule::one_of(allowed.clone())));
        }
        if let Some(pattern) = &self.matches {
            let regex = Regex::new(pattern)
                .map_err(|e| self.invalid("matches", pattern, &e.to_string()))?;
            rules.push(("matches", Rule::matches(regex)));
        }
        if let Some(format) = &self.date_format {
            rules.push(("date_format", Rule::date_format(format.clone())));
        }
        if self.email {
            rules.push(("email", Rule::email()));
        }
        if self.url {
            rules.push(("url", Rule::url()));
        }
        if self.uuid {
            rules.push(("uuid", Rule::uuid()));
        }

        for (key, rule) in rules {
            let rule = match self.message(key) {
                Some(message) => rule.with_message(message),
                None => rule,
            };
            field = field.rule(rule);
        }

        Ok(field)
    }

    fn message(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    fn invalid(&self, key: &str, value: &str, message: &str) -> ConfigError {
        ConfigError::InvalidValue {
            field: format!("{}.{}", self.name, key),
            value: value.to_string(),
            message: message.to_string(),
        }
    }
}
