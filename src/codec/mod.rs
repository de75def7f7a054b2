//! Encoding and decoding of `{type, info}` tagged unions.
//!
//! Every variant field in the model (step events, step actions, previous-field links,
//! trigger events, trigger actions, calendar reminders) is a Rust enum whose variants carry a
//! payload struct. The enums are declared with [`define_variants!`] and the payloads with
//! [`variant_info!`], which also record the permitted `info` keys of each variant. Decoding
//! goes through [`decode`], which checks the raw value against that table first so a
//! malformed value is reported with the field path and the expected shape instead of a bare
//! serde message.

mod macros;

pub(crate) use macros::{define_variants, variant_info};

use crate::error::ValidationError;
use itertools::Itertools;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Whether an `info` key must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// A single key of a variant's `info` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoKey {
    pub name: &'static str,
    pub presence: Presence,
}

impl InfoKey {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            presence: Presence::Required,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            presence: Presence::Optional,
        }
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }
}

/// Implemented by every `info` payload struct.
pub trait InfoShape {
    const KEYS: &'static [InfoKey];
}

/// The `info` shape accepted for one `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantShape {
    pub tag: &'static str,
    pub keys: &'static [InfoKey],
}

impl VariantShape {
    /// Renders the shape as `{type: "afterAction", info: {automationStepId, delayInMS, unit?}}`.
    pub fn describe(&self) -> String {
        format!("{{type: \"{}\", info: {}}}", self.tag, describe_keys(self.keys))
    }
}

/// Renders a key table as `{a, b, c?}`; optional keys carry a trailing `?`.
pub fn describe_keys(keys: &[InfoKey]) -> String {
    let inner = keys
        .iter()
        .map(|k| {
            if k.is_required() {
                k.name.to_string()
            } else {
                format!("{}?", k.name)
            }
        })
        .join(", ");
    format!("{{{inner}}}")
}

/// A closed set of `{type, info}` variants.
pub trait TaggedUnion: Serialize + DeserializeOwned + Sized {
    /// Name of the field the union is stored under, used in messages.
    const FIELD: &'static str;
    /// Every known variant, in declaration order.
    const SHAPES: &'static [VariantShape];

    /// The `type` tag of this value.
    fn tag(&self) -> &'static str;

    fn shape(tag: &str) -> Option<&'static VariantShape> {
        Self::SHAPES.iter().find(|s| s.tag == tag)
    }

    fn tags() -> Vec<&'static str> {
        Self::SHAPES.iter().map(|s| s.tag).collect()
    }

    fn decode(raw: &Value, path: &str) -> Result<Self, ValidationError> {
        decode(raw, path)
    }

    fn encode(&self) -> Result<Value, ValidationError> {
        encode(self)
    }
}

/// Describes every accepted shape of `T`, separated by ` | `.
pub fn describe_union<T: TaggedUnion>() -> String {
    T::SHAPES.iter().map(VariantShape::describe).join(" | ")
}

/// Decodes a raw `{type, info}` value into `T`.
///
/// Keys other than `type` and `info` on the outer object belong to the enclosing resource and
/// are ignored. A missing or `null` `info` is treated as `{}`.
pub fn decode<T: TaggedUnion>(raw: &Value, path: &str) -> Result<T, ValidationError> {
    let normalized = normalize::<T>(raw, path)?;
    let shape = normalized
        .get("type")
        .and_then(Value::as_str)
        .and_then(T::shape);
    serde_json::from_value(normalized).map_err(|e| invalid::<T>(path, shape, e.to_string()))
}

/// Checks `raw` against the shape table of `T` and returns it as a bare `{type, info}` object.
pub fn normalize<T: TaggedUnion>(raw: &Value, path: &str) -> Result<Value, ValidationError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| invalid::<T>(path, None, format!("expected an object, found {}", kind_of(raw))))?;

    let tag = match obj.get("type") {
        Some(Value::String(tag)) => tag.as_str(),
        Some(other) => {
            return Err(invalid::<T>(
                path,
                None,
                format!("'type' must be a string, found {}", kind_of(other)),
            ));
        }
        None => return Err(invalid::<T>(path, None, "missing 'type'".to_string())),
    };

    let shape = T::shape(tag)
        .ok_or_else(|| invalid::<T>(path, None, format!("unknown {} type '{tag}'", T::FIELD)))?;

    let info = match obj.get("info") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(info)) => info.clone(),
        Some(other) => {
            return Err(invalid::<T>(
                path,
                Some(shape),
                format!("'info' must be an object, found {}", kind_of(other)),
            ));
        }
    };

    check_keys(shape.keys, &info).map_err(|message| invalid::<T>(path, Some(shape), message))?;

    let mut normalized = Map::new();
    normalized.insert("type".to_string(), Value::String(tag.to_string()));
    normalized.insert("info".to_string(), Value::Object(info));
    Ok(Value::Object(normalized))
}

/// Encodes `value` back to its `{type, info}` JSON form.
pub fn encode<T: TaggedUnion>(value: &T) -> Result<Value, ValidationError> {
    serde_json::to_value(value).map_err(|e| ValidationError::InvalidVariant {
        path: T::FIELD.to_string(),
        expected: describe_union::<T>(),
        message: e.to_string(),
    })
}

/// Checks that `map` carries every required key of `keys` and nothing else.
pub(crate) fn check_keys(keys: &[InfoKey], map: &Map<String, Value>) -> Result<(), String> {
    if let Some(missing) = keys
        .iter()
        .find(|k| k.is_required() && !map.contains_key(k.name))
    {
        return Err(format!("missing required key '{}'", missing.name));
    }
    if let Some(extra) = map.keys().find(|key| !keys.iter().any(|k| k.name == key.as_str())) {
        return Err(format!("key '{extra}' is not permitted"));
    }
    Ok(())
}

fn invalid<T: TaggedUnion>(
    path: &str,
    shape: Option<&VariantShape>,
    message: String,
) -> ValidationError {
    let expected = match shape {
        Some(shape) => shape.describe(),
        None => format!(
            "one of {}",
            T::SHAPES.iter().map(|s| format!("\"{}\"", s.tag)).join(", ")
        ),
    };
    ValidationError::InvalidVariant {
        path: path.to_string(),
        expected,
        message,
    }
}

/// Short JSON kind name used in messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
