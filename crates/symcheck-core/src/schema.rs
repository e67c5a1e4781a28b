//! The structural contract for model output.
//!
//! One declarative [`Shape`] tree is the single source for three renderings:
//! the informal description embedded in the prompt, the JSON Schema handed to
//! the provider for tool-constrained generation, and the strict validator run
//! against whatever the model returns.

use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::error::SchemaError;
use crate::input::json_type;
use crate::models::diagnosis::DiagnosisResult;

/// Field names used in model output.
pub mod field {
    pub const DIAGNOSES: &str = "diagnoses";
    pub const CONDITION: &str = "condition";
    pub const SEVERITY: &str = "severity";
    pub const CONFIDENCE: &str = "confidence";
    pub const SYMPTOMS_ANALYZED: &str = "symptoms_analyzed";
    pub const MEDICATIONS: &str = "medications";
    pub const RECOMMENDATIONS: &str = "recommendations";
    pub const PRECAUTIONS: &str = "precautions";
    pub const FOLLOW_UP: &str = "follow_up";
    pub const ESTIMATED_RECOVERY_DAYS: &str = "estimated_recovery_days";
    pub const NAME: &str = "name";
    pub const DOSAGE: &str = "dosage";
    pub const DURATION: &str = "duration";
}

pub const MIN_DIAGNOSES: usize = 3;
pub const MAX_DIAGNOSES: usize = 5;

/// A node in the output contract.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    String,
    /// Whole JSON number within `i32` range. Floats and numeric strings are
    /// rejected.
    Integer,
    Array {
        items: Box<Shape>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    Object(Vec<Property>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
}

impl Property {
    pub fn required(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: true,
        }
    }

    pub fn optional(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: false,
        }
    }
}

impl Shape {
    pub fn array_of(items: Shape) -> Self {
        Shape::Array {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    pub fn bounded_array_of(items: Shape, min: usize, max: usize) -> Self {
        Shape::Array {
            items: Box::new(items),
            min_items: Some(min),
            max_items: Some(max),
        }
    }

    fn describe_into(&self, out: &mut String) {
        match self {
            Shape::String => out.push_str("string"),
            Shape::Integer => out.push_str("integer"),
            Shape::Array {
                items,
                min_items,
                max_items,
            } => {
                out.push('[');
                items.describe_into(out);
                out.push(']');
                match (min_items, max_items) {
                    (Some(min), Some(max)) => out.push_str(&format!(" ({min}-{max} items)")),
                    (Some(min), None) => out.push_str(&format!(" (at least {min} items)")),
                    (None, Some(max)) => out.push_str(&format!(" (at most {max} items)")),
                    (None, None) => {}
                }
            }
            Shape::Object(props) => {
                out.push_str("{ ");
                for (i, prop) in props.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push('"');
                    out.push_str(prop.name);
                    out.push('"');
                    if !prop.required {
                        out.push('?');
                    }
                    out.push_str(": ");
                    prop.shape.describe_into(out);
                }
                out.push_str(" }");
            }
        }
    }

    fn to_json_schema(&self) -> Value {
        match self {
            Shape::String => json!({ "type": "string" }),
            Shape::Integer => json!({ "type": "integer" }),
            Shape::Array {
                items,
                min_items,
                max_items,
            } => {
                let mut schema = Map::new();
                schema.insert("type".into(), json!("array"));
                schema.insert("items".into(), items.to_json_schema());
                if let Some(min) = min_items {
                    schema.insert("minItems".into(), json!(min));
                }
                if let Some(max) = max_items {
                    schema.insert("maxItems".into(), json!(max));
                }
                Value::Object(schema)
            }
            Shape::Object(props) => {
                let properties: Map<String, Value> = props
                    .iter()
                    .map(|p| (p.name.to_string(), p.shape.to_json_schema()))
                    .collect();
                let required: Vec<&str> =
                    props.iter().filter(|p| p.required).map(|p| p.name).collect();
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                })
            }
        }
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), SchemaError> {
        match self {
            Shape::String => {
                if !value.is_string() {
                    return Err(mismatch(path, "string", value));
                }
            }
            Shape::Integer => {
                if !(value.is_i64() || value.is_u64()) {
                    return Err(mismatch(path, "integer", value));
                }
                if value.as_i64().and_then(|n| i32::try_from(n).ok()).is_none() {
                    return Err(violation(path, format!("integer {value} is out of range")));
                }
            }
            Shape::Array {
                items,
                min_items,
                max_items,
            } => {
                let elements = value
                    .as_array()
                    .ok_or_else(|| mismatch(path, "array", value))?;
                let len = elements.len();
                if let Some(min) = *min_items {
                    if len < min {
                        return Err(violation(
                            path,
                            format!("expected at least {min} items, got {len}"),
                        ));
                    }
                }
                if let Some(max) = *max_items {
                    if len > max {
                        return Err(violation(
                            path,
                            format!("expected at most {max} items, got {len}"),
                        ));
                    }
                }
                for (i, element) in elements.iter().enumerate() {
                    items.validate_at(element, &format!("{path}[{i}]"))?;
                }
            }
            Shape::Object(props) => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| mismatch(path, "object", value))?;
                for prop in props {
                    let child = format!("{path}.{}", prop.name);
                    match obj.get(prop.name) {
                        Some(v) => prop.shape.validate_at(v, &child)?,
                        None if prop.required => {
                            return Err(violation(&child, "missing required field"));
                        }
                        None => {}
                    }
                }
            }
        }
        Ok(())
    }
}

fn violation(path: &str, message: impl Into<String>) -> SchemaError {
    SchemaError::Violation {
        path: path.to_string(),
        message: message.into(),
    }
}

fn mismatch(path: &str, expected: &str, found: &Value) -> SchemaError {
    violation(path, format!("expected {expected}, got {}", json_type(found)))
}

/// A validated contract for one kind of structured model output.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    root: Shape,
}

static DIAGNOSIS_RESULT: LazyLock<OutputSchema> = LazyLock::new(|| {
    let medication = Shape::Object(vec![
        Property::required(field::NAME, Shape::String),
        Property::required(field::DOSAGE, Shape::String),
        Property::required(field::DURATION, Shape::String),
    ]);

    let diagnosis = Shape::Object(vec![
        Property::required(field::CONDITION, Shape::String),
        Property::required(field::SEVERITY, Shape::String),
        Property::required(field::CONFIDENCE, Shape::String),
        Property::optional(field::SYMPTOMS_ANALYZED, Shape::array_of(Shape::String)),
        Property::optional(field::MEDICATIONS, Shape::array_of(medication)),
        Property::optional(field::RECOMMENDATIONS, Shape::array_of(Shape::String)),
        Property::optional(field::PRECAUTIONS, Shape::String),
        Property::optional(field::FOLLOW_UP, Shape::String),
        Property::optional(field::ESTIMATED_RECOVERY_DAYS, Shape::Integer),
    ]);

    OutputSchema::new(Shape::Object(vec![Property::required(
        field::DIAGNOSES,
        Shape::bounded_array_of(diagnosis, MIN_DIAGNOSES, MAX_DIAGNOSES),
    )]))
});

impl OutputSchema {
    pub fn new(root: Shape) -> Self {
        Self { root }
    }

    /// The contract for [`DiagnosisResult`].
    pub fn diagnosis_result() -> &'static OutputSchema {
        &DIAGNOSIS_RESULT
    }

    /// Compact, single-line description suitable for embedding in a prompt.
    /// Optional keys are marked with a trailing `?`.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.root.describe_into(&mut out);
        out
    }

    /// The same contract as a JSON Schema document.
    pub fn json_schema(&self) -> Value {
        self.root.to_json_schema()
    }

    /// Check a decoded value against the contract. Reports the first
    /// violation, with a path rooted at `$`.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaError> {
        self.root.validate_at(value, "$")
    }

    /// Validate a decoded value and convert it into its typed form.
    /// Keys the contract does not mention are dropped.
    pub fn parse_value<T: DeserializeOwned>(&self, value: Value) -> Result<T, SchemaError> {
        self.validate(&value)?;
        serde_json::from_value(value).map_err(|e| violation("$", e.to_string()))
    }

    /// Decode raw model output, validate it, and convert it.
    pub fn parse_str<T: DeserializeOwned>(&self, raw: &str) -> Result<T, SchemaError> {
        let value: Value =
            serde_json::from_str(raw.trim()).map_err(|e| SchemaError::Syntax(e.to_string()))?;
        self.parse_value(value)
    }
}

/// Shorthand for parsing raw output as a [`DiagnosisResult`].
pub fn parse_diagnosis_result(raw: &str) -> Result<DiagnosisResult, SchemaError> {
    OutputSchema::diagnosis_result().parse_str(raw)
}
