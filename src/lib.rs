//! # jtd
//!
//! A crate for parsing and semantically checking JSON Type Definition (JTD,
//! RFC 8927) schemas, and for validating JSON instances against them. JTD
//! compilation is cheap (there is no fixed-point over a validator tree the
//! way full JSON Schema needs): a schema is checked once with
//! [`Schema::validate_self`] and then walked directly against each
//! instance.
//!
//! ## Example
//!
//! ```rust
//! use jtd::{validate, Schema, ValidationOptions};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let schema = Schema::from_json(&json!({"type": "string"}))?;
//!     schema.validate_self()?;
//!     let errors = validate(&schema, &json!(null), ValidationOptions::default())?;
//!     assert_eq!(errors.len(), 1);
//!     Ok(())
//! }
//! ```
#![warn(
    clippy::redundant_closure,
    clippy::explicit_iter_loop,
    clippy::match_same_arms,
    clippy::needless_borrow,
    clippy::print_stdout,
    clippy::result_unwrap_used,
    clippy::option_unwrap_used,
    clippy::trivially_copy_pass_by_ref,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]
mod checks;
mod error;
mod ordered_map;
mod schema;
mod semantic;
mod validator;

pub use error::{MaxDepthExceeded, SchemaError, ValidationError, ValidationOptions};
pub use ordered_map::OrderedMap;
pub use schema::{Form, Schema, Type};
pub use validator::validate;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn end_to_end_valid_instance() {
        let schema = Schema::from_json(&json!({"type": "string"})).unwrap();
        schema.validate_self().unwrap();
        let errors = validate(&schema, &json!("foo"), ValidationOptions::default()).unwrap();
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn end_to_end_invalid_instance() {
        let schema = Schema::from_json(&json!({"type": "string"})).unwrap();
        schema.validate_self().unwrap();
        let errors = validate(&schema, &json!(null), ValidationOptions::default()).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].instance_path, Vec::<String>::new());
        assert_eq!(errors[0].schema_path, vec!["type".to_string()]);
    }

    #[test]
    fn invalid_schema_is_rejected_at_load() {
        assert!(Schema::from_json(&json!({"foo": 1})).is_err());
    }

    #[test]
    fn invalid_schema_is_rejected_at_semantic_check() {
        let schema = Schema::from_json(&json!({
            "properties": {"x": {}},
            "optionalProperties": {"x": {}}
        }))
        .unwrap();
        assert!(schema.validate_self().is_err());
    }

    #[test]
    fn form_is_exposed_publicly() {
        let schema = Schema::from_json(&json!({"enum": ["A", "B"]})).unwrap();
        assert_eq!(schema.form(), Form::Enum);
    }
}
