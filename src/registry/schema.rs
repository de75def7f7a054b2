//! Declarative field catalogs and the create/update validators derived from them.

use crate::codec::{self, TaggedUnion, describe_union, kind_of};
use crate::error::{SchemaError, ValidationError};
use crate::model::{
    CalendarEventReminder, PreviousFieldLink, ReminderKind, ResourceKind, StepAction, StepEvent,
    TriggerAction, TriggerEvent,
};
use chrono::DateTime;
use serde_json::{Map, Value, json};

/// The tagged unions a catalog field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    FieldLink,
    StepEvent,
    StepAction,
    TriggerEvent,
    TriggerAction,
    Reminder,
}

impl VariantKind {
    /// Decodes `raw` as this union, discarding the result.
    pub fn check(self, raw: &Value, path: &str) -> Result<(), ValidationError> {
        match self {
            VariantKind::FieldLink => codec::decode::<PreviousFieldLink>(raw, path).map(drop),
            VariantKind::StepEvent => codec::decode::<StepEvent>(raw, path).map(drop),
            VariantKind::StepAction => codec::decode::<StepAction>(raw, path).map(drop),
            VariantKind::TriggerEvent => codec::decode::<TriggerEvent>(raw, path).map(drop),
            VariantKind::TriggerAction => codec::decode::<TriggerAction>(raw, path).map(drop),
            VariantKind::Reminder => {
                codec::decode::<ReminderKind>(raw, path)?;
                check_reminder_siblings(raw, path)
            }
        }
    }

    pub fn tags(self) -> Vec<&'static str> {
        match self {
            VariantKind::FieldLink => PreviousFieldLink::tags(),
            VariantKind::StepEvent => StepEvent::tags(),
            VariantKind::StepAction => StepAction::tags(),
            VariantKind::TriggerEvent => TriggerEvent::tags(),
            VariantKind::TriggerAction => TriggerAction::tags(),
            VariantKind::Reminder => ReminderKind::tags(),
        }
    }

    pub fn describe(self) -> String {
        match self {
            VariantKind::FieldLink => describe_union::<PreviousFieldLink>(),
            VariantKind::StepEvent => describe_union::<StepEvent>(),
            VariantKind::StepAction => describe_union::<StepAction>(),
            VariantKind::TriggerEvent => describe_union::<TriggerEvent>(),
            VariantKind::TriggerAction => describe_union::<TriggerAction>(),
            VariantKind::Reminder => describe_union::<ReminderKind>(),
        }
    }
}

/// Reminders carry `msBeforeStartTime` next to `type`/`info`.
fn check_reminder_siblings(raw: &Value, path: &str) -> Result<(), ValidationError> {
    let mut raw = raw.clone();
    default_info(&mut raw);
    serde_json::from_value::<CalendarEventReminder>(raw)
        .map(drop)
        .map_err(|e| ValidationError::InvalidVariant {
            path: path.to_string(),
            expected: "{type, info, msBeforeStartTime}".to_string(),
            message: e.to_string(),
        })
}

/// JSON kind of a catalog field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Bool,
    Integer,
    Number,
    StringList,
    Object,
    ObjectList,
    /// RFC 3339 timestamp, or `""` to clear.
    Timestamp,
    Enum(&'static [&'static str]),
    Variant(VariantKind),
    VariantList(VariantKind),
    /// Opaque value passed through unchecked.
    Any,
}

impl FieldKind {
    pub fn describe(&self) -> String {
        match self {
            FieldKind::String => "a string".to_string(),
            FieldKind::Bool => "a boolean".to_string(),
            FieldKind::Integer => "a non-negative integer".to_string(),
            FieldKind::Number => "a number".to_string(),
            FieldKind::StringList => "an array of strings".to_string(),
            FieldKind::Object => "an object".to_string(),
            FieldKind::ObjectList => "an array of objects".to_string(),
            FieldKind::Timestamp => "an RFC 3339 timestamp or \"\"".to_string(),
            FieldKind::Enum(values) => format!("one of {}", values.join(" | ")),
            FieldKind::Variant(kind) => kind.describe(),
            FieldKind::VariantList(kind) => format!("an array of {}", kind.describe()),
            FieldKind::Any => "any value".to_string(),
        }
    }

    fn json_schema(&self) -> Value {
        match self {
            FieldKind::String => json!({ "type": "string" }),
            FieldKind::Bool => json!({ "type": "boolean" }),
            FieldKind::Integer => json!({ "type": "integer", "minimum": 0 }),
            FieldKind::Number => json!({ "type": "number" }),
            FieldKind::StringList => json!({ "type": "array", "items": { "type": "string" } }),
            FieldKind::Object => json!({ "type": "object" }),
            FieldKind::ObjectList => json!({ "type": "array", "items": { "type": "object" } }),
            FieldKind::Timestamp => json!({ "type": "string", "format": "date-time" }),
            FieldKind::Enum(values) => json!({ "type": "string", "enum": values }),
            FieldKind::Variant(kind) => variant_schema(*kind),
            FieldKind::VariantList(kind) => json!({ "type": "array", "items": variant_schema(*kind) }),
            FieldKind::Any => json!({}),
        }
    }
}

fn variant_schema(kind: VariantKind) -> Value {
    json!({
        "type": "object",
        "required": ["type"],
        "properties": {
            "type": { "type": "string", "enum": kind.tags() },
            "info": { "type": "object" },
        },
        "description": kind.describe(),
    })
}

fn default_info(value: &mut Value) {
    if let Value::Object(map) = value
        && map.contains_key("type")
        && map.get("info").is_none_or(Value::is_null)
    {
        map.insert("info".to_string(), Value::Object(Map::new()));
    }
}

/// Who may write a catalog field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Writable,
    /// Set on create, fixed afterwards.
    CreateOnly,
    /// Assigned by the platform.
    Generated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub access: Access,
    pub non_empty: bool,
    pub description: &'static str,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            access: Access::Writable,
            non_empty: false,
            description: "",
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    pub const fn generated(name: &'static str) -> Self {
        Self {
            access: Access::Generated,
            ..Self::optional(name, FieldKind::String)
        }
    }

    pub const fn create_only(self) -> Self {
        Self {
            access: Access::CreateOnly,
            ..self
        }
    }

    pub const fn non_empty(self) -> Self {
        Self {
            non_empty: true,
            ..self
        }
    }

    pub const fn with_doc(self, description: &'static str) -> Self {
        Self {
            description,
            ..self
        }
    }

    fn json_schema(&self) -> Value {
        let mut schema = self.kind.json_schema();
        if let Value::Object(map) = &mut schema {
            if !self.description.is_empty() {
                map.insert("description".to_string(), json!(self.description));
            }
            if self.non_empty {
                map.insert("minItems".to_string(), json!(1));
            }
        }
        schema
    }
}

/// The field catalog of one resource type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSchema {
    pub kind: ResourceKind,
    pub description: &'static str,
    pub fields: &'static [FieldSpec],
}

impl ResourceSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Checks a create payload: an object with every required field, no unknown or generated
    /// field, and every value of the declared kind.
    pub fn validate_create(&self, input: &Value) -> Result<Map<String, Value>, SchemaError> {
        self.validate_full(input, false)
    }

    /// Like [`validate_create`](Self::validate_create), but for a resource the platform already
    /// stored: generated fields are accepted and `id` is required.
    pub fn validate_stored(&self, input: &Value) -> Result<Map<String, Value>, SchemaError> {
        let data = self.validate_full(input, true)?;
        if !data.get("id").is_some_and(Value::is_string) {
            return Err(SchemaError::MissingField {
                resource: self.kind.to_string(),
                field: "id".to_string(),
            });
        }
        Ok(data)
    }

    fn validate_full(
        &self,
        input: &Value,
        allow_generated: bool,
    ) -> Result<Map<String, Value>, SchemaError> {
        let data = self.as_object(input)?;
        if let Some(missing) = self
            .fields
            .iter()
            .find(|f| f.required && f.access != Access::Generated && !data.contains_key(f.name))
        {
            return Err(SchemaError::MissingField {
                resource: self.kind.to_string(),
                field: missing.name.to_string(),
            });
        }
        for (key, value) in data {
            let spec = self.known_field(key)?;
            if spec.access == Access::Generated && !allow_generated {
                return Err(self.read_only(key));
            }
            self.check_value(spec, value, key, true)?;
        }
        let mut data = data.clone();
        self.normalize(&mut data);
        Ok(data)
    }

    /// Checks an update's `updates` object: non-empty, only writable known fields, every value
    /// of the declared kind. Variant objects without a `type` are partial merges and are only
    /// checked to be objects.
    pub fn validate_update(&self, updates: &Value) -> Result<Map<String, Value>, SchemaError> {
        let data = self.as_object(updates)?;
        if data.is_empty() {
            return Err(SchemaError::EmptyUpdate {
                resource: self.kind.to_string(),
            });
        }
        for (key, value) in data {
            let spec = self.known_field(key)?;
            if spec.access != Access::Writable {
                return Err(self.read_only(key));
            }
            self.check_value(spec, value, &format!("updates.{key}"), false)?;
        }
        let mut data = data.clone();
        self.normalize(&mut data);
        Ok(data)
    }

    /// Fills in the `{}` default for a missing or `null` `info` on every variant value.
    pub fn normalize(&self, data: &mut Map<String, Value>) {
        for (key, value) in data.iter_mut() {
            match self.field(key).map(|f| f.kind) {
                Some(FieldKind::Variant(_)) => default_info(value),
                Some(FieldKind::VariantList(_)) => {
                    if let Value::Array(items) = value {
                        items.iter_mut().for_each(default_info);
                    }
                }
                _ => {}
            }
        }
    }

    fn as_object<'v>(&self, input: &'v Value) -> Result<&'v Map<String, Value>, SchemaError> {
        input.as_object().ok_or_else(|| SchemaError::NotAnObject {
            resource: self.kind.to_string(),
            found: kind_of(input).to_string(),
        })
    }

    fn known_field(&self, key: &str) -> Result<&FieldSpec, SchemaError> {
        self.field(key).ok_or_else(|| SchemaError::UnknownField {
            resource: self.kind.to_string(),
            field: key.to_string(),
        })
    }

    fn read_only(&self, key: &str) -> SchemaError {
        SchemaError::ReadOnlyField {
            resource: self.kind.to_string(),
            field: key.to_string(),
        }
    }

    fn check_value(
        &self,
        spec: &FieldSpec,
        value: &Value,
        path: &str,
        complete: bool,
    ) -> Result<(), SchemaError> {
        let wrong = || SchemaError::WrongType {
            resource: self.kind.to_string(),
            field: spec.name.to_string(),
            expected: spec.kind.describe(),
            found: kind_of(value).to_string(),
        };

        let ok = match (&spec.kind, value) {
            (FieldKind::Any, _) => true,
            // Optional fields may be cleared.
            (_, Value::Null) => !spec.required,
            (FieldKind::String, Value::String(_)) => true,
            (FieldKind::Bool, Value::Bool(_)) => true,
            (FieldKind::Integer, Value::Number(n)) => n.is_u64(),
            (FieldKind::Number, Value::Number(_)) => true,
            (FieldKind::StringList, Value::Array(items)) => items.iter().all(Value::is_string),
            (FieldKind::Object, Value::Object(_)) => true,
            (FieldKind::ObjectList, Value::Array(items)) => items.iter().all(Value::is_object),
            (FieldKind::Timestamp, Value::String(s)) => {
                s.is_empty() || DateTime::parse_from_rfc3339(s).is_ok()
            }
            (FieldKind::Enum(values), Value::String(s)) => values.contains(&s.as_str()),
            (FieldKind::Variant(kind), Value::Object(map)) => {
                if complete || map.contains_key("type") {
                    kind.check(value, path)?;
                }
                true
            }
            (FieldKind::VariantList(kind), Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    kind.check(item, &format!("{path}[{i}]"))?;
                }
                true
            }
            _ => false,
        };
        if !ok {
            return Err(wrong());
        }

        if spec.non_empty && complete && value.as_array().is_some_and(Vec::is_empty) {
            return Err(SchemaError::WrongType {
                resource: self.kind.to_string(),
                field: spec.name.to_string(),
                expected: format!("a non-empty array of {}", spec.kind.describe()),
                found: "an empty array".to_string(),
            });
        }
        Ok(())
    }

    /// JSON schema of the create input.
    pub fn create_input_schema(&self) -> Value {
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required && f.access != Access::Generated)
            .map(|f| f.name)
            .collect();
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .filter(|f| f.access != Access::Generated)
            .map(|f| (f.name.to_string(), f.json_schema()))
            .collect();
        json!({
            "type": "object",
            "required": required,
            "properties": properties,
            "additionalProperties": false,
        })
    }

    /// JSON schema of the update input `{id, updates, options?}`.
    pub fn update_input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .filter(|f| f.access == Access::Writable)
            .map(|f| (f.name.to_string(), f.json_schema()))
            .collect();
        json!({
            "type": "object",
            "required": ["id", "updates"],
            "properties": {
                "id": { "type": "string" },
                "updates": {
                    "type": "object",
                    "minProperties": 1,
                    "properties": properties,
                    "additionalProperties": false,
                },
                "options": {
                    "type": "object",
                    "properties": {
                        "replaceObjectFields": {
                            "type": "boolean",
                            "description": "Replace each named subtree instead of merging into it. Read the resource first.",
                        },
                    },
                },
            },
        })
    }
}
