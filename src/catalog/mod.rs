//! Catalog records describing the work a key was published in, and their
//! validation.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

pub mod schema;

/// A field value as stored in the catalog: fields that can hold several
/// values are written as one string separated by `"; "`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CatalogValue {
    Single(String),
    Multiple(Vec<String>),
}

impl CatalogValue {
    /// Empty input is an absent value.
    pub fn parse(value: &str, splits: bool) -> Option<CatalogValue> {
        if value.is_empty() {
            None
        } else if splits {
            Some(CatalogValue::Multiple(
                value
                    .split("; ")
                    .map(str::to_string)
                    .collect(),
            ))
        } else {
            Some(CatalogValue::Single(value.to_string()))
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            CatalogValue::Single(value) => vec![value.as_str()],
            CatalogValue::Multiple(values) => values
                .iter()
                .map(String::as_str)
                .collect(),
        }
    }

    fn is_several(&self) -> bool {
        match self {
            CatalogValue::Single(value) => value.contains("; "),
            CatalogValue::Multiple(values) => values.len() > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    Multiple,
    Format(String),
    Unknown,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldProblem::Missing => f.write_str("Value(s) required but missing"),
            FieldProblem::Multiple => f.write_str("Multiple values but only one expected"),
            FieldProblem::Format(message) => f.write_str(message),
            FieldProblem::Unknown => f.write_str("Unknown field"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub problem: FieldProblem,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.problem)
    }
}

/// A work record, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CatalogRecord(BTreeMap<String, CatalogValue>);

impl CatalogRecord {
    /// Build a record from raw field strings. Fields the work schema does
    /// not know are kept as single values so that validation can report
    /// them.
    pub fn from_fields<I, K, V>(fields: I) -> CatalogRecord
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut record = BTreeMap::new();
        for (name, value) in fields {
            let name = name.into();
            let splits = schema::lookup(&name)
                .map(|field| {
                    field
                        .multiple
                        .splits()
                })
                .unwrap_or(false);

            if let Some(value) = CatalogValue::parse(value.as_ref(), splits) {
                record.insert(name, value);
            }
        }
        CatalogRecord(record)
    }

    pub fn get(&self, field: &str) -> Option<&CatalogValue> {
        self.0
            .get(field)
    }

    pub fn len(&self) -> usize {
        self.0
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.0
            .is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogValue)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Check the record against the work schema, returning every problem
    /// found.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        for field in schema::WORK {
            if field.required && !self.0.contains_key(field.name) {
                errors.push(FieldError {
                    field: field
                        .name
                        .to_string(),
                    problem: FieldProblem::Missing,
                });
            }
        }

        for (name, value) in &self.0 {
            let field = match schema::lookup(name) {
                Some(field) => field,
                None => {
                    errors.push(FieldError {
                        field: name.clone(),
                        problem: FieldProblem::Unknown,
                    });
                    continue;
                }
            };

            let allowed = schema::allows_multiple(
                field.multiple,
                self.get("language"),
                self.get("ISBN"),
            );
            if !allowed && value.is_several() {
                errors.push(FieldError {
                    field: name.clone(),
                    problem: FieldProblem::Multiple,
                });
            }

            if let Some(format) = field.format {
                for single in value.values() {
                    if let Some(message) = format.reject(single) {
                        errors.push(FieldError {
                            field: name.clone(),
                            problem: FieldProblem::Format(message),
                        });
                    }
                }
            }
        }

        errors
    }
}
