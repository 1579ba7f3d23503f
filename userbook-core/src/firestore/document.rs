//! Firestore REST document types and the document <-> record mapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::MappingError;
use crate::models::Record;

pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_AGE: &str = "age";

/// A field value tagged with its primitive kind.
///
/// Kinds the record mapping does not use are kept verbatim in `Other` so a
/// document carrying extra fields still decodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    StringValue(String),
    /// Firestore sends int64 values as decimal strings
    IntegerValue(#[serde(with = "integer_repr")] i64),
    DoubleValue(f64),
    BooleanValue(bool),
    #[serde(untagged)]
    Other(serde_json::Value),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::StringValue(_) => "stringValue",
            Value::IntegerValue(_) => "integerValue",
            Value::DoubleValue(_) => "doubleValue",
            Value::BooleanValue(_) => "booleanValue",
            Value::Other(_) => "other",
        }
    }
}

/// A Firestore document as returned by the REST API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource path; empty on request bodies
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// Response of a collection list call. An empty collection comes back as `{}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Extracts the id (final `/` segment) from a document resource path.
pub fn document_id(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|id| !id.is_empty())
}

/// Builds the field map sent on create and patch.
pub fn record_fields(name: &str, email: &str, age: i64) -> BTreeMap<String, Value> {
    BTreeMap::from([
        (FIELD_NAME.to_string(), Value::StringValue(name.to_string())),
        (FIELD_EMAIL.to_string(), Value::StringValue(email.to_string())),
        (FIELD_AGE.to_string(), Value::IntegerValue(age)),
    ])
}

impl Document {
    /// Request body carrying only a field map.
    pub fn with_fields(fields: BTreeMap<String, Value>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Document for `record` stored under the collection path `parent`.
    pub fn from_record(parent: &str, record: &Record) -> Self {
        Self {
            name: format!("{}/{}", parent.trim_end_matches('/'), record.id),
            fields: record_fields(&record.name, &record.email, record.age),
            ..Self::default()
        }
    }

    pub fn id(&self) -> Result<&str, MappingError> {
        document_id(&self.name).ok_or_else(|| MappingError::MissingId(self.name.clone()))
    }

    pub fn string_field(&self, field: &'static str) -> Result<&str, MappingError> {
        match self.fields.get(field) {
            Some(Value::StringValue(s)) => Ok(s),
            Some(_) => Err(MappingError::WrongKind {
                field,
                expected: "stringValue",
            }),
            None => Err(MappingError::MissingField(field)),
        }
    }

    pub fn integer_field(&self, field: &'static str) -> Result<i64, MappingError> {
        match self.fields.get(field) {
            Some(Value::IntegerValue(n)) => Ok(*n),
            Some(other) => {
                tracing::debug!("field '{}' arrived as {}", field, other.kind());
                Err(MappingError::WrongKind {
                    field,
                    expected: "integerValue",
                })
            }
            None => Err(MappingError::MissingField(field)),
        }
    }

    /// Maps this document onto a record.
    pub fn to_record(&self) -> Result<Record, MappingError> {
        Ok(Record {
            id: self.id()?.to_string(),
            name: self.string_field(FIELD_NAME)?.to_string(),
            email: self.string_field(FIELD_EMAIL)?.to_string(),
            age: self.integer_field(FIELD_AGE)?,
        })
    }
}

impl TryFrom<&Document> for Record {
    type Error = MappingError;

    fn try_from(doc: &Document) -> Result<Self, Self::Error> {
        doc.to_record()
    }
}

mod integer_repr {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(i64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(s) => s.trim().parse().map_err(de::Error::custom),
        }
    }
}
