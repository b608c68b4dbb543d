use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Any,
}

impl FieldKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Array => value.is_array(),
            FieldKind::Object => value.is_object(),
            FieldKind::Any => true,
        }
    }
}

fn default_kind() -> FieldKind {
    FieldKind::Any
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

/// Parameter schema an agent action declares for its payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSchema {
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaErrors {
    /// Required fields absent from the payload.
    pub missing: Vec<String>,
    /// `field: message` for present values of the wrong type.
    pub invalid: Vec<String>,
}

impl SchemaErrors {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }

    pub fn only_missing(&self) -> bool {
        !self.missing.is_empty() && self.invalid.is_empty()
    }
}

impl ParamSchema {
    pub fn required(fields: &[(&str, FieldKind)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(name, kind)| FieldSpec {
                    name: name.to_string(),
                    kind: *kind,
                    required: true,
                })
                .collect(),
        }
    }

    pub fn declares(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn validate(&self, params: &Map<String, Value>) -> Result<(), SchemaErrors> {
        let mut errors = SchemaErrors::default();
        for field in &self.fields {
            match params.get(&field.name) {
                None if field.required => errors.missing.push(field.name.clone()),
                None => {}
                Some(value) if !field.kind.accepts(value) => errors.invalid.push(format!(
                    "{}: expected {:?}, got {}",
                    field.name,
                    field.kind,
                    type_name(value)
                )),
                Some(_) => {}
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
