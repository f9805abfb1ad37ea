//! Error and configuration types shared by the schema loader, the semantic
//! validator and the instance validator.
use serde::Serialize;
use std::{error, fmt};

/// Every way a schema document can fail to become a usable [`crate::Schema`].
///
/// Raised by either [`crate::Schema::from_json`] (syntactic faults) or
/// [`crate::Schema::validate_self`] (semantic faults). Callers only ever get
/// a valid schema or one of these; the two sources are not distinguished
/// further since the conformance fixtures don't require it -- an
/// `invalid_schemas.json` case just needs to be rejected by either phase.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The top-level schema value is not a JSON object.
    Shape,
    /// A key outside the thirteen JTD keywords was present.
    UnknownKeyword(String),
    /// `definitions` appeared on a non-root schema.
    NonRootDefinitions,
    /// A field that must be a particular JSON type was not.
    TypeInvariant(&'static str),
    /// `ref` does not name an entry in the root's `definitions`.
    RefUnresolved(String),
    /// `ref` is present but the root schema has no `definitions` at all.
    RefNoDefinitions,
    /// `type` is not one of the eleven valid type tags.
    InvalidType(String),
    /// `enum` is not a non-empty array of strings.
    EnumEmpty,
    /// `enum` contains a duplicate value.
    EnumDuplicate(String),
    /// `properties` and `optionalProperties` share a key.
    PropOptPropOverlap(String),
    /// A `mapping` value has `nullable` set to `true`.
    MappingNullable,
    /// A `mapping` value is not of `PROPERTIES` form.
    MappingNotPropertiesForm,
    /// A `mapping` value redeclares the discriminator key.
    MappingRedefinesDiscriminator(String),
    /// The schema's form signature does not appear in the valid-form table.
    InvalidForm,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Shape => write!(f, "schema must be a JSON object"),
            SchemaError::UnknownKeyword(key) => write!(f, "unknown keyword: {}", key),
            SchemaError::NonRootDefinitions => {
                write!(f, "definitions is only allowed on the root schema")
            }
            SchemaError::TypeInvariant(field) => write!(f, "{} has the wrong JSON type", field),
            SchemaError::RefUnresolved(name) => {
                write!(f, "ref '{}' does not exist in definitions", name)
            }
            SchemaError::RefNoDefinitions => {
                write!(f, "ref is present but the root has no definitions")
            }
            SchemaError::InvalidType(name) => write!(f, "'{}' is not a valid type", name),
            SchemaError::EnumEmpty => write!(f, "enum must be a non-empty array of strings"),
            SchemaError::EnumDuplicate(value) => {
                write!(f, "enum contains a duplicate value: {}", value)
            }
            SchemaError::PropOptPropOverlap(key) => {
                write!(f, "'{}' is in both properties and optionalProperties", key)
            }
            SchemaError::MappingNullable => write!(f, "mapping values must not be nullable"),
            SchemaError::MappingNotPropertiesForm => {
                write!(f, "mapping values must be of properties form")
            }
            SchemaError::MappingRedefinesDiscriminator(key) => write!(
                f,
                "mapping value redeclares discriminator property '{}'",
                key
            ),
            SchemaError::InvalidForm => write!(f, "schema does not match any valid form"),
        }
    }
}

impl error::Error for SchemaError {}

/// An immutable finding produced by [`crate::validate`].
///
/// `instance_path` and `schema_path` are raw, unescaped tokens -- JSON
/// object keys or decimal array indices rendered as strings -- not JSON
/// Pointer strings. Consumers who need JSON Pointer syntax must escape the
/// tokens themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    #[serde(rename = "instancePath")]
    pub instance_path: Vec<String>,
    #[serde(rename = "schemaPath")]
    pub schema_path: Vec<String>,
}

/// Limits applied while walking an instance against a schema.
///
/// `max_depth` bounds the number of simultaneously active `ref` frames (0 =
/// unlimited). `max_errors` bounds the number of returned errors (0 =
/// unlimited).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    pub max_depth: usize,
    pub max_errors: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            max_depth: 0,
            max_errors: 0,
        }
    }
}

/// Raised when `ref` recursion would exceed [`ValidationOptions::max_depth`].
///
/// Unlike [`ValidationError`], this is not a data-level finding: it aborts
/// the whole call to [`crate::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxDepthExceeded;

impl fmt::Display for MaxDepthExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "maximum ref depth exceeded")
    }
}

impl error::Error for MaxDepthExceeded {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_unlimited() {
        let opts = ValidationOptions::default();
        assert_eq!(opts.max_depth, 0);
        assert_eq!(opts.max_errors, 0);
    }

    #[test]
    fn schema_error_display() {
        let err = SchemaError::UnknownKeyword("foo".to_string());
        assert_eq!(err.to_string(), "unknown keyword: foo");
    }
}
