//! The YAML header at the top of every resource block.

use std::fmt;

use serde_yaml::{Mapping, Value};

use crate::catalog::{CatalogRecord, FieldError, FieldProblem};
use crate::language::{Flag, Rank, ResourceMetadata};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    MissingSeparator,
    Yaml(String),
    NotMapping,
    LevelsNotArray,
    ScopeOutsideCatalog,
    NoTaxa,
    InvalidLevels(Vec<String>),
    CatalogNotStrings(String),
    CatalogErrors(Vec<FieldError>),
    FlagsNotArray,
    InvalidFlags(Vec<String>),
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::MissingSeparator => {
                f.write_str("Resource should start with a header followed by \"---\"")
            }
            HeaderError::Yaml(error) => write!(f, "yaml header could not be read: {}", error),
            HeaderError::NotMapping => f.write_str("yaml header should be an object"),
            HeaderError::LevelsNotArray => f.write_str("\"levels\" should be an array"),
            HeaderError::ScopeOutsideCatalog => f.write_str("\"scope\" data should go in \"catalog\""),
            HeaderError::NoTaxa => f.write_str("Resource contains no taxa"),
            HeaderError::InvalidLevels(values) => {
                write!(f, "\"levels\" contains invalid values: {}", values.join(", "))
            }
            HeaderError::CatalogNotStrings(key) => {
                write!(f, "\"catalog\" should contain only strings (\"{}\")", key)
            }
            HeaderError::CatalogErrors(errors) => {
                let errors: Vec<String> = errors
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                write!(f, "\"catalog\" contains errors: {}", errors.join("; "))
            }
            HeaderError::FlagsNotArray => f.write_str("\"flags\" should be an array"),
            HeaderError::InvalidFlags(values) => {
                write!(f, "\"flags\" contains invalid values: {}", values.join(", "))
            }
        }
    }
}

/// Read the levels, catalog record, and flags of one resource.
pub fn parse_header(header: &str) -> Result<ResourceMetadata, HeaderError> {
    let config: Value =
        serde_yaml::from_str(header).map_err(|error| HeaderError::Yaml(error.to_string()))?;

    let Value::Mapping(config) = config else {
        return Err(HeaderError::NotMapping);
    };

    let levels = match config.get("levels") {
        None => Vec::new(),
        Some(Value::Sequence(levels)) => levels.clone(),
        Some(_) => return Err(HeaderError::LevelsNotArray),
    };

    if config.contains_key("scope") {
        return Err(HeaderError::ScopeOutsideCatalog);
    }

    if levels.is_empty() {
        return Err(HeaderError::NoTaxa);
    }

    let mut ranks = Vec::with_capacity(levels.len());
    let mut invalid = Vec::new();
    for level in &levels {
        match level
            .as_str()
            .and_then(Rank::parse)
        {
            Some(rank) => ranks.push(rank),
            None => invalid.push(describe(level)),
        }
    }
    if !invalid.is_empty() {
        return Err(HeaderError::InvalidLevels(invalid));
    }

    let catalog = match config.get("catalog") {
        Some(Value::Mapping(catalog)) => Some(parse_catalog(catalog)?),
        _ => None,
    };

    let flags = match config.get("flags") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(values)) => parse_flags(values)?,
        Some(_) => return Err(HeaderError::FlagsNotArray),
    };

    Ok(ResourceMetadata {
        levels: ranks,
        catalog,
        flags,
    })
}

/// Catalog data is validated as a work record, except that fields the key
/// does not repeat are allowed to be missing.
fn parse_catalog(catalog: &Mapping) -> Result<CatalogRecord, HeaderError> {
    let mut fields = Vec::with_capacity(catalog.len());
    for (key, value) in catalog {
        let key = describe(key);
        let value = match value {
            Value::String(value) => value.clone(),
            Value::Number(value) => value.to_string(),
            _ => return Err(HeaderError::CatalogNotStrings(key)),
        };
        fields.push((key, value));
    }

    let record = CatalogRecord::from_fields(fields);
    let errors: Vec<FieldError> = record
        .validate()
        .into_iter()
        .filter(|error| error.problem != FieldProblem::Missing)
        .collect();

    if errors.is_empty() {
        Ok(record)
    } else {
        Err(HeaderError::CatalogErrors(errors))
    }
}

fn parse_flags(values: &[Value]) -> Result<Vec<Flag>, HeaderError> {
    let mut flags = Vec::with_capacity(values.len());
    let mut invalid = Vec::new();
    for value in values {
        match value
            .as_str()
            .and_then(Flag::parse)
        {
            Some(flag) => flags.push(flag),
            None => invalid.push(describe(value)),
        }
    }

    if invalid.is_empty() {
        Ok(flags)
    } else {
        Err(HeaderError::InvalidFlags(invalid))
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(value) => value.clone(),
        Value::Number(value) => value.to_string(),
        Value::Bool(value) => value.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|text| {
                text.trim()
                    .to_string()
            })
            .unwrap_or_default(),
    }
}
