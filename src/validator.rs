//! The instance validator (C4): walks a [`Schema`]/instance pair and emits
//! [`ValidationError`]s whose paths match the reference JTD implementation
//! byte-for-byte. One function per form, with a single state struct
//! accumulating errors and tracking path tokens, rather than a trait
//! object tree -- JTD's eight forms are fixed and don't need open-ended
//! dispatch.
use crate::{
    checks::is_rfc3339,
    error::{MaxDepthExceeded, ValidationError, ValidationOptions},
    schema::{Form, Schema, Type},
};
use serde_json::Value;

/// Non-local exit used internally while walking: `MaxErrors` is caught by
/// [`validate`] and turned into a normal, truncated return; `MaxDepth`
/// escapes as [`MaxDepthExceeded`].
enum Abort {
    MaxErrors,
    MaxDepth,
}

type Walk = Result<(), Abort>;

/// Owns every piece of mutable state for one call to [`validate`]: the
/// instance path built up as we descend, a stack of schema-path frames (one
/// per active `ref`), the errors collected so far, and the configured
/// limits. Never shared across calls -- each `validate` call constructs its
/// own.
struct State<'a> {
    root: &'a Schema,
    options: ValidationOptions,
    instance_tokens: Vec<String>,
    schema_tokens: Vec<Vec<String>>,
    errors: Vec<ValidationError>,
}

impl<'a> State<'a> {
    fn new(root: &'a Schema, options: ValidationOptions) -> Self {
        State {
            root,
            options,
            instance_tokens: Vec::new(),
            schema_tokens: vec![Vec::new()],
            errors: Vec::new(),
        }
    }

    fn push_instance_token(&mut self, token: String) {
        self.instance_tokens.push(token);
    }

    fn pop_instance_token(&mut self) {
        self.instance_tokens.pop();
    }

    fn push_schema_token(&mut self, token: &str) {
        self.schema_tokens
            .last_mut()
            .expect("schema_tokens always has at least one frame")
            .push(token.to_string());
    }

    fn pop_schema_token(&mut self) {
        self.schema_tokens
            .last_mut()
            .expect("schema_tokens always has at least one frame")
            .pop();
    }

    fn push_ref_frame(&mut self, ref_name: &str) -> Walk {
        if self.options.max_depth != 0 && self.schema_tokens.len() == self.options.max_depth {
            return Err(Abort::MaxDepth);
        }
        self.schema_tokens
            .push(vec!["definitions".to_string(), ref_name.to_string()]);
        Ok(())
    }

    fn pop_ref_frame(&mut self) {
        self.schema_tokens.pop();
    }

    /// Snapshots the current instance path and the top schema frame into a
    /// new error. Returns `Err(Abort::MaxErrors)` once the cap is hit so
    /// the caller can unwind immediately, having already recorded this
    /// error.
    fn emit_error(&mut self) -> Walk {
        self.errors.push(ValidationError {
            instance_path: self.instance_tokens.clone(),
            schema_path: self
                .schema_tokens
                .last()
                .expect("schema_tokens always has at least one frame")
                .clone(),
        });
        if self.options.max_errors != 0 && self.errors.len() == self.options.max_errors {
            return Err(Abort::MaxErrors);
        }
        Ok(())
    }
}

/// Inclusive ranges for the six sized-integer type tags.
fn int_range(type_: Type) -> Option<(f64, f64)> {
    match type_ {
        Type::Int8 => Some((-128.0, 127.0)),
        Type::Uint8 => Some((0.0, 255.0)),
        Type::Int16 => Some((-32768.0, 32767.0)),
        Type::Uint16 => Some((0.0, 65535.0)),
        Type::Int32 => Some((-2_147_483_648.0, 2_147_483_647.0)),
        Type::Uint32 => Some((0.0, 4_294_967_295.0)),
        _ => None,
    }
}

fn is_in_range(instance: &Value, min: f64, max: f64) -> bool {
    match instance.as_f64() {
        Some(n) => n.fract() == 0.0 && n >= min && n <= max,
        None => false,
    }
}

fn type_matches(type_: Type, instance: &Value) -> bool {
    match type_ {
        Type::Boolean => instance.is_boolean(),
        Type::Float32 | Type::Float64 => instance.is_number(),
        Type::String => instance.is_string(),
        Type::Timestamp => instance.as_str().map_or(false, is_rfc3339),
        sized => {
            let (min, max) = int_range(sized).expect("every sized int tag has a range");
            is_in_range(instance, min, max)
        }
    }
}

/// Walks `schema` against `instance`, recursing per its [`Form`] and
/// appending findings to `state`. `parent_tag` is the discriminator key
/// propagated from an enclosing `DISCRIMINATOR` schema so the mapped
/// `PROPERTIES` schema doesn't flag it as an extra key.
fn walk(state: &mut State, schema: &Schema, instance: &Value, parent_tag: Option<&str>) -> Walk {
    if schema.is_nullable() && instance.is_null() {
        return Ok(());
    }

    match schema.form() {
        Form::Empty => Ok(()),
        Form::Ref => walk_ref(state, schema, instance),
        Form::Type => walk_type(state, schema, instance),
        Form::Enum => walk_enum(state, schema, instance),
        Form::Elements => walk_elements(state, schema, instance),
        Form::Properties => walk_properties(state, schema, instance, parent_tag),
        Form::Values => walk_values(state, schema, instance),
        Form::Discriminator => walk_discriminator(state, schema, instance),
    }
}

fn walk_ref(state: &mut State, schema: &Schema, instance: &Value) -> Walk {
    let name = schema
        .ref_name()
        .expect("REF form guarantees ref is present");
    state.push_ref_frame(name)?;
    let target = state
        .root
        .definitions
        .as_ref()
        .and_then(|defs| defs.get(name))
        .expect("validate_self guarantees every ref resolves");
    let result = walk(state, target, instance, None);
    state.pop_ref_frame();
    result
}

fn walk_type(state: &mut State, schema: &Schema, instance: &Value) -> Walk {
    state.push_schema_token("type");
    let result = if type_matches(schema.type_tag(), instance) {
        Ok(())
    } else {
        state.emit_error()
    };
    state.pop_schema_token();
    result
}

fn walk_enum(state: &mut State, schema: &Schema, instance: &Value) -> Walk {
    state.push_schema_token("enum");
    let matches = instance
        .as_str()
        .map_or(false, |s| schema.enum_values().iter().any(|v| v == s));
    let result = if matches { Ok(()) } else { state.emit_error() };
    state.pop_schema_token();
    result
}

fn walk_elements(state: &mut State, schema: &Schema, instance: &Value) -> Walk {
    state.push_schema_token("elements");
    let sub = schema
        .elements
        .as_ref()
        .expect("ELEMENTS form guarantees elements is present");
    let result = match instance.as_array() {
        Some(items) => (|| {
            for (i, item) in items.iter().enumerate() {
                state.push_instance_token(i.to_string());
                let r = walk(state, sub, item, None);
                state.pop_instance_token();
                r?;
            }
            Ok(())
        })(),
        None => state.emit_error(),
    };
    state.pop_schema_token();
    result
}

fn walk_properties(
    state: &mut State,
    schema: &Schema,
    instance: &Value,
    parent_tag: Option<&str>,
) -> Walk {
    let object = match instance.as_object() {
        Some(object) => object,
        None => {
            let token = if schema.properties.is_some() {
                "properties"
            } else {
                "optionalProperties"
            };
            state.push_schema_token(token);
            let result = state.emit_error();
            state.pop_schema_token();
            return result;
        }
    };

    if let Some(properties) = &schema.properties {
        state.push_schema_token("properties");
        let result = (|| {
            for (key, sub) in properties {
                state.push_schema_token(key);
                let r = match object.get(key) {
                    Some(value) => {
                        state.push_instance_token(key.clone());
                        let r = walk(state, sub, value, None);
                        state.pop_instance_token();
                        r
                    }
                    None => state.emit_error(),
                };
                state.pop_schema_token();
                r?;
            }
            Ok(())
        })();
        state.pop_schema_token();
        result?;
    }

    if let Some(optional_properties) = &schema.optional_properties {
        state.push_schema_token("optionalProperties");
        let result = (|| {
            for (key, sub) in optional_properties {
                state.push_schema_token(key);
                let r = if let Some(value) = object.get(key) {
                    state.push_instance_token(key.clone());
                    let r = walk(state, sub, value, None);
                    state.pop_instance_token();
                    r
                } else {
                    Ok(())
                };
                state.pop_schema_token();
                r?;
            }
            Ok(())
        })();
        state.pop_schema_token();
        result?;
    }

    if !schema.allows_additional_properties() {
        for key in object.keys() {
            let known = schema
                .properties
                .as_ref()
                .map_or(false, |p| p.contains_key(key))
                || schema
                    .optional_properties
                    .as_ref()
                    .map_or(false, |p| p.contains_key(key));
            if known || parent_tag == Some(key.as_str()) {
                continue;
            }
            state.push_instance_token(key.clone());
            let r = state.emit_error();
            state.pop_instance_token();
            r?;
        }
    }

    Ok(())
}

fn walk_values(state: &mut State, schema: &Schema, instance: &Value) -> Walk {
    state.push_schema_token("values");
    let sub = schema
        .values
        .as_ref()
        .expect("VALUES form guarantees values is present");
    let result = match instance.as_object() {
        Some(object) => (|| {
            for (key, value) in object {
                state.push_instance_token(key.clone());
                let r = walk(state, sub, value, None);
                state.pop_instance_token();
                r?;
            }
            Ok(())
        })(),
        None => state.emit_error(),
    };
    state.pop_schema_token();
    result
}

fn walk_discriminator(state: &mut State, schema: &Schema, instance: &Value) -> Walk {
    let object = match instance.as_object() {
        Some(object) => object,
        None => {
            state.push_schema_token("discriminator");
            let result = state.emit_error();
            state.pop_schema_token();
            return result;
        }
    };

    let discriminator_key = schema.discriminator_key();
    let tag = match object.get(discriminator_key) {
        Some(tag) => tag,
        None => {
            state.push_schema_token("discriminator");
            let result = state.emit_error();
            state.pop_schema_token();
            return result;
        }
    };

    let tag = match tag.as_str() {
        Some(tag) => tag,
        None => {
            state.push_schema_token("discriminator");
            state.push_instance_token(discriminator_key.to_string());
            let result = state.emit_error();
            state.pop_instance_token();
            state.pop_schema_token();
            return result;
        }
    };

    let mapping = schema
        .mapping
        .as_ref()
        .expect("DISCRIMINATOR form guarantees mapping is present");
    match mapping.get(tag) {
        Some(sub) => {
            state.push_schema_token("mapping");
            state.push_schema_token(tag);
            let result = walk(state, sub, instance, Some(discriminator_key));
            state.pop_schema_token();
            state.pop_schema_token();
            result
        }
        None => {
            state.push_schema_token("mapping");
            state.push_instance_token(discriminator_key.to_string());
            let result = state.emit_error();
            state.pop_instance_token();
            state.pop_schema_token();
            result
        }
    }
}

/// C4: validates `instance` against `root_schema`, which must already have
/// passed [`Schema::validate_self`]. Returns the ordered list of findings,
/// or [`MaxDepthExceeded`] if `ref` recursion would exceed
/// `options.max_depth`. Reaching `options.max_errors` is not an error: it
/// is a normal, truncated return.
pub fn validate(
    root_schema: &Schema,
    instance: &Value,
    options: ValidationOptions,
) -> Result<Vec<ValidationError>, MaxDepthExceeded> {
    let mut state = State::new(root_schema, options);
    match walk(&mut state, root_schema, instance, None) {
        Ok(()) | Err(Abort::MaxErrors) => Ok(state.errors),
        Err(Abort::MaxDepth) => Err(MaxDepthExceeded),
    }
}
