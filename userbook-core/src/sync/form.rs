use std::fmt;
use std::str::FromStr;

use super::error::SyncError;
use crate::models::Record;

/// Editable input fields, held as the text the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    pub name: String,
    pub email: String,
    pub age: String,
}

/// One of the three input fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Age,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name => write!(f, "name"),
            Field::Email => write!(f, "email"),
            Field::Age => write!(f, "age"),
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Field::Name),
            "email" => Ok(Field::Email),
            "age" => Ok(Field::Age),
            other => Err(format!(
                "Unknown field '{}'. Expected name, email or age.",
                other
            )),
        }
    }
}

/// Validated input, ready to be sent to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub name: String,
    pub email: String,
    pub age: i64,
}

impl Draft {
    /// Checks that every field is filled in and that age is a whole number.
    ///
    /// Name and email are kept exactly as typed; blank-only input counts as
    /// missing.
    pub fn parse(name: &str, email: &str, age: &str) -> Result<Self, SyncError> {
        let age = age.trim();

        if name.trim().is_empty() {
            return Err(SyncError::MissingField("name"));
        }
        if email.trim().is_empty() {
            return Err(SyncError::MissingField("email"));
        }
        if age.is_empty() {
            return Err(SyncError::MissingField("age"));
        }

        let age = age
            .parse::<i64>()
            .map_err(|_| SyncError::InvalidAge(age.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            age,
        })
    }

    pub fn into_record(self, id: impl Into<String>) -> Record {
        Record::new(id, self.name, self.email, self.age)
    }
}

impl Form {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Age => &self.age,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Age => self.age = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.age.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn to_draft(&self) -> Result<Draft, SyncError> {
        Draft::parse(&self.name, &self.email, &self.age)
    }
}

impl From<&Record> for Form {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            age: record.age.to_string(),
        }
    }
}
