use crate::codec::kind_of;
use crate::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A `compoundLogic` condition tree.
///
/// Interior nodes are `{"$and": [...]}` or `{"$or": [...]}`; leaves are
/// `{"condition": {<key>: <value-or-operator-object>}}`. Leaf values are kept as raw JSON, only
/// the keys are interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Leaf(Map<String, Value>),
}

impl Condition {
    /// Parses a raw condition tree, reporting the first malformed node.
    pub fn parse(value: &Value, path: &str) -> Result<Self, ValidationError> {
        let obj = value.as_object().ok_or_else(|| ValidationError::InvalidCondition {
            path: path.to_string(),
            message: format!("expected an object, found {}", kind_of(value)),
        })?;
        if obj.len() != 1 {
            return Err(ValidationError::InvalidCondition {
                path: path.to_string(),
                message: format!("expected exactly one key, found {}", obj.len()),
            });
        }
        let Some((key, inner)) = obj.iter().next() else {
            return Err(ValidationError::InvalidCondition {
                path: path.to_string(),
                message: "empty condition node".to_string(),
            });
        };
        let child_path = format!("{path}.{key}");
        match key.as_str() {
            "$and" | "$or" => {
                let items = inner.as_array().ok_or_else(|| ValidationError::InvalidCondition {
                    path: child_path.clone(),
                    message: format!("expected an array, found {}", kind_of(inner)),
                })?;
                let children = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| Condition::parse(item, &format!("{child_path}[{i}]")))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if key == "$and" {
                    Condition::And(children)
                } else {
                    Condition::Or(children)
                })
            }
            "condition" => match inner {
                Value::Object(map) if !map.is_empty() => Ok(Condition::Leaf(map.clone())),
                Value::Object(_) => Err(ValidationError::InvalidCondition {
                    path: child_path,
                    message: "leaf condition has no keys".to_string(),
                }),
                other => Err(ValidationError::InvalidCondition {
                    path: child_path,
                    message: format!("expected an object, found {}", kind_of(other)),
                }),
            },
            other => Err(ValidationError::InvalidCondition {
                path: path.to_string(),
                message: format!("unexpected key '{other}'"),
            }),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut node = Map::new();
        match self {
            Condition::And(children) => {
                node.insert(
                    "$and".to_string(),
                    Value::Array(children.iter().map(Condition::to_value).collect()),
                );
            }
            Condition::Or(children) => {
                node.insert(
                    "$or".to_string(),
                    Value::Array(children.iter().map(Condition::to_value).collect()),
                );
            }
            Condition::Leaf(map) => {
                node.insert("condition".to_string(), Value::Object(map.clone()));
            }
        }
        Value::Object(node)
    }

    /// Every leaf key, paired with its path relative to `base`.
    pub fn leaf_keys(&self, base: &str) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        self.collect_keys(base, &mut out);
        out
    }

    fn collect_keys<'a>(&'a self, path: &str, out: &mut Vec<(String, &'a str)>) {
        match self {
            Condition::And(children) | Condition::Or(children) => {
                let op = if matches!(self, Condition::And(_)) {
                    "$and"
                } else {
                    "$or"
                };
                for (i, child) in children.iter().enumerate() {
                    child.collect_keys(&format!("{path}.{op}[{i}]"), out);
                }
            }
            Condition::Leaf(map) => {
                for key in map.keys() {
                    out.push((format!("{path}.condition.{key}"), key.as_str()));
                }
            }
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Condition::parse(&value, "condition").map_err(serde::de::Error::custom)
    }
}
