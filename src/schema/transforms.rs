//! Reusable value transforms
//!
//! Transforms run after a field's type cast and before its rules. They are
//! never called with `null`.

use serde_json::Value;
use std::sync::Arc;

pub type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Trim whitespace from strings
pub fn trim() -> Transform {
    Arc::new(|value: Value| match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other,
    })
}

/// Convert strings to uppercase
pub fn uppercase() -> Transform {
    Arc::new(|value: Value| match value {
        Value::String(s) => Value::String(s.to_uppercase()),
        other => other,
    })
}

/// Convert strings to lowercase
pub fn lowercase() -> Transform {
    Arc::new(|value: Value| match value {
        Value::String(s) => Value::String(s.to_lowercase()),
        other => other,
    })
}

/// Round numbers to `decimals` places
pub fn round_decimals(decimals: u32) -> Transform {
    map_number(move |num| {
        let factor = 10_f64.powi(decimals as i32);
        (num * factor).round() / factor
    })
}

/// Apply `f` to numbers
///
/// ```rust,ignore
/// Field::number("age").transform(map_number(|age| age + 2.0))
/// ```
pub fn map_number<F>(f: F) -> Transform
where
    F: Fn(f64) -> f64 + Send + Sync + 'static,
{
    Arc::new(move |value: Value| match value.as_f64() {
        Some(num) => number_value(f(num)),
        None => value,
    })
}

/// Arbitrary transform
pub fn custom<F>(f: F) -> Transform
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// JSON number for `num`, as an integer when it has no fractional part
///
/// Non-finite results become `null`.
pub fn number_value(num: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

    if num.fract() == 0.0 && num.abs() <= MAX_SAFE_INTEGER {
        Value::from(num as i64)
    } else {
        serde_json::Number::from_f64(num)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
