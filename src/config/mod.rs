//! Configuration loading and management

pub mod schema;

pub use schema::{FieldDefinition, SchemaDefinition};

use crate::core::error::ConfigError;
use crate::core::handler::{SchemaConfig, ValidationOptions};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Settings forwarded verbatim to every schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateOptions {
    /// Stop at the first failing rule instead of collecting every message
    pub abort_early: bool,

    /// Drop object keys the schema does not declare
    pub strip_unknown: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            abort_early: true,
            strip_unknown: false,
        }
    }
}

impl ValidateOptions {
    /// Options that report every failing rule
    pub fn collect_all() -> Self {
        Self {
            abort_early: false,
            ..Self::default()
        }
    }

    /// Load options from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(yaml)?;
        Ok(options)
    }
}

/// Validation setup of one route, as written in YAML
///
/// ```yaml
/// options:
///   abort_early: false
/// body:
///   fields:
///     - name: name
///       type: string
///       required: true
/// query:
///   fields:
///     - name: page
///       type: number
///       min: 1
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteValidationConfig {
    #[serde(default)]
    pub options: ValidateOptions,

    #[serde(default)]
    pub body: Option<SchemaDefinition>,

    #[serde(default)]
    pub query: Option<SchemaDefinition>,
}

impl RouteValidationConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Compile the declared schemas
    pub fn schema_config(&self) -> Result<SchemaConfig> {
        let mut config = SchemaConfig::new();
        if let Some(body) = &self.body {
            config = config.body(body.build()?);
        }
        if let Some(query) = &self.query {
            config = config.query(query.build()?);
        }
        Ok(config)
    }

    /// Schemas plus default behavior carrying the declared options
    pub fn into_parts(self) -> Result<(SchemaConfig, ValidationOptions)> {
        let schema = self.schema_config()?;
        let options = ValidationOptions::new().validate_options(self.options);
        Ok((schema, options))
    }
}
