//! The semantic validator (C3): cross-field invariants that the syntactic
//! loader in [`crate::schema`] does not check. Mirrors the checks the
//! reference JTD implementation runs in `Schema.validate`, in the same
//! order, so that the first-reported problem on a malformed schema matches
//! across implementations.
use crate::{
    error::SchemaError,
    schema::{Form, Schema, Type},
};
use lazy_static::lazy_static;
use serde_json::Value;
use std::collections::HashSet;

/// The ten form-bearing keywords, in the order their presence bit appears
/// in a form signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FormSignature {
    ref_: bool,
    type_: bool,
    enum_: bool,
    elements: bool,
    properties: bool,
    optional_properties: bool,
    additional_properties: bool,
    values: bool,
    discriminator: bool,
    mapping: bool,
}

lazy_static! {
    /// Every (ref, type, enum, elements, properties, optionalProperties,
    /// additionalProperties, values, discriminator, mapping) presence
    /// combination that corresponds to one of the eight valid forms. Built
    /// once and consulted by [`check_form`] for every schema in the tree.
    static ref VALID_SIGNATURES: HashSet<FormSignature> = {
        let mut set = HashSet::new();
        let f = false;
        let t = true;
        // EMPTY
        set.insert(FormSignature { ref_: f, type_: f, enum_: f, elements: f, properties: f, optional_properties: f, additional_properties: f, values: f, discriminator: f, mapping: f });
        // REF
        set.insert(FormSignature { ref_: t, type_: f, enum_: f, elements: f, properties: f, optional_properties: f, additional_properties: f, values: f, discriminator: f, mapping: f });
        // TYPE
        set.insert(FormSignature { ref_: f, type_: t, enum_: f, elements: f, properties: f, optional_properties: f, additional_properties: f, values: f, discriminator: f, mapping: f });
        // ENUM
        set.insert(FormSignature { ref_: f, type_: f, enum_: t, elements: f, properties: f, optional_properties: f, additional_properties: f, values: f, discriminator: f, mapping: f });
        // ELEMENTS
        set.insert(FormSignature { ref_: f, type_: f, enum_: f, elements: t, properties: f, optional_properties: f, additional_properties: f, values: f, discriminator: f, mapping: f });
        // PROPERTIES: properties and/or optionalProperties, additionalProperties independent
        for &props in &[true, false] {
            for &opt_props in &[true, false] {
                if !props && !opt_props {
                    continue;
                }
                for &additional in &[true, false] {
                    set.insert(FormSignature { ref_: f, type_: f, enum_: f, elements: f, properties: props, optional_properties: opt_props, additional_properties: additional, values: f, discriminator: f, mapping: f });
                }
            }
        }
        // VALUES
        set.insert(FormSignature { ref_: f, type_: f, enum_: f, elements: f, properties: f, optional_properties: f, additional_properties: f, values: t, discriminator: f, mapping: f });
        // DISCRIMINATOR
        set.insert(FormSignature { ref_: f, type_: f, enum_: f, elements: f, properties: f, optional_properties: f, additional_properties: f, values: f, discriminator: t, mapping: t });
        set
    };
}

impl Schema {
    /// Runs every semantic check against the whole schema tree rooted at
    /// `self`, returning the first violation encountered.
    ///
    /// Must only be called on the root schema: `definitions` is only legal
    /// there, and `ref` is resolved against the root's `definitions`.
    pub fn validate_self(&self) -> Result<(), SchemaError> {
        self.check_non_root(true)?;
        if let Some(definitions) = &self.definitions {
            for (_, sub) in definitions {
                sub.check_form()?;
                sub.check_fields()?;
                sub.check_ref(self)?;
            }
        }
        self.check_form()?;
        self.check_fields()?;
        self.check_ref(self)?;
        Ok(())
    }

    /// `definitions` may only appear on the root schema. Walks every node
    /// reachable from `self` -- including definitions' own entries, not
    /// just the ones reached through `elements`/`properties`/etc. -- since
    /// a non-root `definitions` can appear anywhere in the tree, not only
    /// under a path that happens to pass through the root's own
    /// `definitions` map.
    fn check_non_root(&self, is_root: bool) -> Result<(), SchemaError> {
        if self.definitions.is_some() && !is_root {
            return Err(SchemaError::NonRootDefinitions);
        }
        if let Some(definitions) = &self.definitions {
            for (_, sub) in definitions {
                sub.check_non_root(false)?;
            }
        }
        if let Some(sub) = &self.elements {
            sub.check_non_root(false)?;
        }
        if let Some(props) = &self.properties {
            for (_, sub) in props {
                sub.check_non_root(false)?;
            }
        }
        if let Some(props) = &self.optional_properties {
            for (_, sub) in props {
                sub.check_non_root(false)?;
            }
        }
        if let Some(sub) = &self.values {
            sub.check_non_root(false)?;
        }
        if let Some(mapping) = &self.mapping {
            for (_, sub) in mapping {
                sub.check_non_root(false)?;
            }
        }
        Ok(())
    }

    fn signature(&self) -> FormSignature {
        FormSignature {
            ref_: self.ref_.is_some(),
            type_: self.type_.is_some(),
            enum_: self.enum_.is_some(),
            elements: self.elements.is_some(),
            properties: self.properties.is_some(),
            optional_properties: self.optional_properties.is_some(),
            additional_properties: self.additional_properties.is_some(),
            values: self.values.is_some(),
            discriminator: self.discriminator.is_some(),
            mapping: self.mapping.is_some(),
        }
    }

    /// Checks this node's own form signature against the table, then
    /// recurses into every sub-schema reachable from it.
    fn check_form(&self) -> Result<(), SchemaError> {
        if !VALID_SIGNATURES.contains(&self.signature()) {
            return Err(SchemaError::InvalidForm);
        }
        if let Some(sub) = &self.elements {
            sub.check_form()?;
        }
        if let Some(props) = &self.properties {
            for (_, sub) in props {
                sub.check_form()?;
            }
        }
        if let Some(props) = &self.optional_properties {
            for (_, sub) in props {
                sub.check_form()?;
            }
        }
        if let Some(sub) = &self.values {
            sub.check_form()?;
        }
        if let Some(mapping) = &self.mapping {
            for (_, sub) in mapping {
                sub.check_form()?;
            }
        }
        Ok(())
    }

    /// Type-checks the individual keyword values (`nullable` a bool, `type`
    /// a valid tag, `enum` a non-empty array of unique strings, etc.) and
    /// the `properties`/`optionalProperties`/`mapping` cross-field rules,
    /// recursing into every sub-schema. `metadata` is never inspected here:
    /// it is an arbitrary JSON value, opaque to the validator.
    fn check_fields(&self) -> Result<(), SchemaError> {
        if let Some(value) = &self.nullable {
            if !value.is_boolean() {
                return Err(SchemaError::TypeInvariant("nullable"));
            }
        }
        if let Some(value) = &self.ref_ {
            if !value.is_string() {
                return Err(SchemaError::TypeInvariant("ref"));
            }
        }
        if let Some(value) = &self.type_ {
            let tag = value.as_str().ok_or(SchemaError::TypeInvariant("type"))?;
            if Type::from_str(tag).is_none() {
                return Err(SchemaError::InvalidType(tag.to_string()));
            }
        }
        if let Some(value) = &self.enum_ {
            let array = value
                .as_array()
                .ok_or(SchemaError::TypeInvariant("enum"))?;
            if array.is_empty() {
                return Err(SchemaError::EnumEmpty);
            }
            let mut seen = HashSet::new();
            for item in array {
                let s = item
                    .as_str()
                    .ok_or(SchemaError::TypeInvariant("enum"))?
                    .to_string();
                if !seen.insert(s.clone()) {
                    return Err(SchemaError::EnumDuplicate(s));
                }
            }
        }
        if let Some(value) = &self.additional_properties {
            if !value.is_boolean() {
                return Err(SchemaError::TypeInvariant("additionalProperties"));
            }
        }
        if let (Some(props), Some(opt_props)) = (&self.properties, &self.optional_properties) {
            for key in props.keys() {
                if opt_props.contains_key(key) {
                    return Err(SchemaError::PropOptPropOverlap(key.to_string()));
                }
            }
        }
        if let Some(value) = &self.discriminator {
            if !value.is_string() {
                return Err(SchemaError::TypeInvariant("discriminator"));
            }
        }
        if let Some(mapping) = &self.mapping {
            let discriminator_key = self.discriminator_key_checked();
            for (_, sub) in mapping {
                if sub.is_nullable() {
                    return Err(SchemaError::MappingNullable);
                }
                if sub.form() != Form::Properties {
                    return Err(SchemaError::MappingNotPropertiesForm);
                }
                if let Some(key) = discriminator_key {
                    let redefines = sub
                        .properties
                        .as_ref()
                        .map_or(false, |p| p.contains_key(key))
                        || sub
                            .optional_properties
                            .as_ref()
                            .map_or(false, |p| p.contains_key(key));
                    if redefines {
                        return Err(SchemaError::MappingRedefinesDiscriminator(
                            key.to_string(),
                        ));
                    }
                }
            }
        }

        if let Some(sub) = &self.elements {
            sub.check_fields()?;
        }
        if let Some(props) = &self.properties {
            for (_, sub) in props {
                sub.check_fields()?;
            }
        }
        if let Some(props) = &self.optional_properties {
            for (_, sub) in props {
                sub.check_fields()?;
            }
        }
        if let Some(sub) = &self.values {
            sub.check_fields()?;
        }
        if let Some(mapping) = &self.mapping {
            for (_, sub) in mapping {
                sub.check_fields()?;
            }
        }
        Ok(())
    }

    fn discriminator_key_checked(&self) -> Option<&str> {
        self.discriminator.as_ref().and_then(Value::as_str)
    }

    /// Confirms every `ref` in the tree names an entry present in `root`'s
    /// `definitions`, recursing into every sub-schema.
    fn check_ref(&self, root: &Schema) -> Result<(), SchemaError> {
        if let Some(name) = self.ref_name() {
            let definitions = root
                .definitions
                .as_ref()
                .ok_or(SchemaError::RefNoDefinitions)?;
            if !definitions.contains_key(name) {
                return Err(SchemaError::RefUnresolved(name.to_string()));
            }
        }
        if let Some(sub) = &self.elements {
            sub.check_ref(root)?;
        }
        if let Some(props) = &self.properties {
            for (_, sub) in props {
                sub.check_ref(root)?;
            }
        }
        if let Some(props) = &self.optional_properties {
            for (_, sub) in props {
                sub.check_ref(root)?;
            }
        }
        if let Some(sub) = &self.values {
            sub.check_ref(root)?;
        }
        if let Some(mapping) = &self.mapping {
            for (_, sub) in mapping {
                sub.check_ref(root)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn schema(value: serde_json::Value) -> Schema {
        Schema::from_json(&value).expect("must load syntactically")
    }

    #[test_case(serde_json::json!({}) ; "empty")]
    #[test_case(serde_json::json!({"type": "string"}) ; "type")]
    #[test_case(serde_json::json!({"enum": ["A", "B"]}) ; "enum")]
    #[test_case(serde_json::json!({"elements": {"type": "string"}}) ; "elements")]
    #[test_case(serde_json::json!({"properties": {"a": {"type": "string"}}}) ; "properties")]
    #[test_case(serde_json::json!({"values": {"type": "string"}}) ; "values")]
    #[test_case(serde_json::json!({"discriminator": "kind", "mapping": {"a": {"properties": {}}}}) ; "discriminator")]
    fn accepts_valid_forms(value: serde_json::Value) {
        let s = schema(value);
        assert!(s.validate_self().is_ok());
    }

    #[test]
    fn rejects_mixed_incompatible_keywords() {
        let s = schema(serde_json::json!({"type": "string", "enum": ["A"]}));
        assert_eq!(s.validate_self().unwrap_err(), SchemaError::InvalidForm);
    }

    #[test]
    fn rejects_unresolved_ref() {
        let s = schema(serde_json::json!({"ref": "missing"}));
        assert_eq!(
            s.validate_self().unwrap_err(),
            SchemaError::RefUnresolved("missing".to_string())
        );
    }

    #[test]
    fn rejects_ref_without_definitions() {
        let s = schema(serde_json::json!({"ref": "x"}));
        assert_eq!(s.validate_self().unwrap_err(), SchemaError::RefNoDefinitions);
    }

    #[test]
    fn accepts_non_object_metadata() {
        let s = schema(serde_json::json!({"metadata": "anything, really", "type": "string"}));
        assert!(s.validate_self().is_ok());
    }

    #[test]
    fn rejects_definitions_nested_under_non_definitions_path() {
        let s = schema(serde_json::json!({
            "properties": {"a": {"values": {"definitions": {"x": {}}}}}
        }));
        assert_eq!(
            s.validate_self().unwrap_err(),
            SchemaError::NonRootDefinitions
        );
    }

    #[test]
    fn rejects_definitions_outside_root() {
        let s = schema(serde_json::json!({
            "elements": {"definitions": {"x": {}}}
        }));
        assert_eq!(
            s.validate_self().unwrap_err(),
            SchemaError::NonRootDefinitions
        );
    }

    #[test]
    fn rejects_invalid_type_tag() {
        let s = schema(serde_json::json!({"type": "bogus"}));
        assert_eq!(
            s.validate_self().unwrap_err(),
            SchemaError::InvalidType("bogus".to_string())
        );
    }

    #[test]
    fn rejects_empty_enum() {
        let s = schema(serde_json::json!({"enum": []}));
        assert_eq!(s.validate_self().unwrap_err(), SchemaError::EnumEmpty);
    }

    #[test]
    fn rejects_duplicate_enum_value() {
        let s = schema(serde_json::json!({"enum": ["A", "A"]}));
        assert_eq!(
            s.validate_self().unwrap_err(),
            SchemaError::EnumDuplicate("A".to_string())
        );
    }

    #[test]
    fn rejects_properties_optional_properties_overlap() {
        let s = schema(serde_json::json!({
            "properties": {"a": {}},
            "optionalProperties": {"a": {}}
        }));
        assert_eq!(
            s.validate_self().unwrap_err(),
            SchemaError::PropOptPropOverlap("a".to_string())
        );
    }

    #[test]
    fn rejects_nullable_mapping_value() {
        let s = schema(serde_json::json!({
            "discriminator": "kind",
            "mapping": {"a": {"properties": {}, "nullable": true}}
        }));
        assert_eq!(s.validate_self().unwrap_err(), SchemaError::MappingNullable);
    }

    #[test]
    fn rejects_non_properties_mapping_value() {
        let s = schema(serde_json::json!({
            "discriminator": "kind",
            "mapping": {"a": {"type": "string"}}
        }));
        assert_eq!(
            s.validate_self().unwrap_err(),
            SchemaError::MappingNotPropertiesForm
        );
    }

    #[test]
    fn rejects_mapping_redefining_discriminator() {
        let s = schema(serde_json::json!({
            "discriminator": "kind",
            "mapping": {"a": {"properties": {"kind": {"type": "string"}}}}
        }));
        assert_eq!(
            s.validate_self().unwrap_err(),
            SchemaError::MappingRedefinesDiscriminator("kind".to_string())
        );
    }
}
