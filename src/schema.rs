//! The JTD schema model (C1, the form classifier) and its syntactic loader
//! (C2). Semantic checking lives in [`crate::semantic`]; this module only
//! knows how to turn a [`serde_json::Value`] into a [`Schema`] and how to
//! read off a schema's [`Form`].
use crate::{error::SchemaError, ordered_map::OrderedMap};
use serde_json::{Map, Value};

/// The thirteen keywords a JTD schema document may use, on the wire.
const KEYWORDS: &[&str] = &[
    "metadata",
    "nullable",
    "definitions",
    "ref",
    "type",
    "enum",
    "elements",
    "properties",
    "optionalProperties",
    "additionalProperties",
    "values",
    "discriminator",
    "mapping",
];

/// One of the eleven valid values of the `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Boolean,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
    String,
    Timestamp,
}

impl Type {
    pub(crate) fn from_str(s: &str) -> Option<Type> {
        Some(match s {
            "boolean" => Type::Boolean,
            "int8" => Type::Int8,
            "uint8" => Type::Uint8,
            "int16" => Type::Int16,
            "uint16" => Type::Uint16,
            "int32" => Type::Int32,
            "uint32" => Type::Uint32,
            "float32" => Type::Float32,
            "float64" => Type::Float64,
            "string" => Type::String,
            "timestamp" => Type::Timestamp,
            _ => return None,
        })
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Type::Boolean => "boolean",
            Type::Int8 => "int8",
            Type::Uint8 => "uint8",
            Type::Int16 => "int16",
            Type::Uint16 => "uint16",
            Type::Int32 => "int32",
            Type::Uint32 => "uint32",
            Type::Float32 => "float32",
            Type::Float64 => "float64",
            Type::String => "string",
            Type::Timestamp => "timestamp",
        }
    }
}

/// The eight disjoint shapes a JTD schema may take. See the valid-form table
/// in [`crate::semantic`] for which combinations of fields produce which
/// form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Empty,
    Ref,
    Type,
    Enum,
    Elements,
    Properties,
    Values,
    Discriminator,
}

/// A parsed JTD schema node.
///
/// The five primitive keywords (`metadata`, `nullable`, `ref`, `type`,
/// `discriminator`) and `enum`/`additionalProperties` are kept as raw JSON
/// values rather than typed fields: C2 (this module) performs no type
/// checking beyond rejecting unknown keywords, so a malformed value (e.g.
/// `"nullable": "yes"`) must survive the load and be reported by
/// [`Schema::validate_self`] instead. Once a schema has passed
/// `validate_self`, the `*_checked` accessors below may be used freely.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub metadata: Option<Value>,
    pub nullable: Option<Value>,
    pub definitions: Option<OrderedMap<Schema>>,
    pub ref_: Option<Value>,
    pub type_: Option<Value>,
    pub enum_: Option<Value>,
    pub elements: Option<Box<Schema>>,
    pub properties: Option<OrderedMap<Schema>>,
    pub optional_properties: Option<OrderedMap<Schema>>,
    pub additional_properties: Option<Value>,
    pub values: Option<Box<Schema>>,
    pub discriminator: Option<Value>,
    pub mapping: Option<OrderedMap<Schema>>,
}

impl Schema {
    /// Syntactic load (C2): reject non-object input and unknown keywords,
    /// recursively loading sub-schemas. Performs no other checking -- call
    /// [`Schema::validate_self`] afterwards.
    pub fn from_json(value: &Value) -> Result<Schema, SchemaError> {
        let object = value.as_object().ok_or(SchemaError::Shape)?;
        Self::from_object(object)
    }

    fn from_object(object: &Map<String, Value>) -> Result<Schema, SchemaError> {
        for key in object.keys() {
            if !KEYWORDS.contains(&key.as_str()) {
                return Err(SchemaError::UnknownKeyword(key.clone()));
            }
        }

        let definitions = match object.get("definitions") {
            Some(value) => Some(Self::load_map(value)?),
            None => None,
        };
        let elements = match object.get("elements") {
            Some(value) => Some(Box::new(Schema::from_json(value)?)),
            None => None,
        };
        let properties = match object.get("properties") {
            Some(value) => Some(Self::load_map(value)?),
            None => None,
        };
        let optional_properties = match object.get("optionalProperties") {
            Some(value) => Some(Self::load_map(value)?),
            None => None,
        };
        let values = match object.get("values") {
            Some(value) => Some(Box::new(Schema::from_json(value)?)),
            None => None,
        };
        let mapping = match object.get("mapping") {
            Some(value) => Some(Self::load_map(value)?),
            None => None,
        };

        Ok(Schema {
            metadata: object.get("metadata").cloned(),
            nullable: object.get("nullable").cloned(),
            definitions,
            ref_: object.get("ref").cloned(),
            type_: object.get("type").cloned(),
            enum_: object.get("enum").cloned(),
            elements,
            properties,
            optional_properties,
            additional_properties: object.get("additionalProperties").cloned(),
            values,
            discriminator: object.get("discriminator").cloned(),
            mapping,
        })
    }

    fn load_map(value: &Value) -> Result<OrderedMap<Schema>, SchemaError> {
        let object = value.as_object().ok_or(SchemaError::Shape)?;
        let mut map = OrderedMap::new();
        for (key, sub) in object {
            map.insert(key.clone(), Schema::from_json(sub)?);
        }
        Ok(map)
    }

    /// C1: the form this schema takes, computed purely from which of the
    /// ten form-bearing fields are present. Checked in REF, TYPE, ENUM,
    /// ELEMENTS, PROPERTIES, VALUES, DISCRIMINATOR order; EMPTY otherwise.
    /// Well-defined for any schema that has passed [`Schema::validate_self`].
    pub fn form(&self) -> Form {
        if self.ref_.is_some() {
            Form::Ref
        } else if self.type_.is_some() {
            Form::Type
        } else if self.enum_.is_some() {
            Form::Enum
        } else if self.elements.is_some() {
            Form::Elements
        } else if self.properties.is_some() || self.optional_properties.is_some() {
            Form::Properties
        } else if self.values.is_some() {
            Form::Values
        } else if self.discriminator.is_some() {
            Form::Discriminator
        } else {
            Form::Empty
        }
    }

    /// `true` iff `nullable` is present and `true`. Only meaningful once
    /// `nullable`'s type has been checked by [`Schema::validate_self`].
    pub(crate) fn is_nullable(&self) -> bool {
        matches!(self.nullable, Some(Value::Bool(true)))
    }

    /// `true` iff `additionalProperties` is present and `true`.
    pub(crate) fn allows_additional_properties(&self) -> bool {
        matches!(self.additional_properties, Some(Value::Bool(true)))
    }

    pub(crate) fn ref_name(&self) -> Option<&str> {
        self.ref_.as_ref().and_then(Value::as_str)
    }

    /// The parsed `type` tag. Panics if `type` is present but not a valid
    /// tag -- callers must only use this on a schema that passed
    /// `validate_self`.
    pub(crate) fn type_tag(&self) -> Type {
        let raw = self
            .type_
            .as_ref()
            .and_then(Value::as_str)
            .expect("type must be a valid tag on a validated schema");
        Type::from_str(raw).expect("type must be a valid tag on a validated schema")
    }

    pub(crate) fn enum_values(&self) -> &[Value] {
        self.enum_
            .as_ref()
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .expect("enum must be an array on a validated schema")
    }

    pub(crate) fn discriminator_key(&self) -> &str {
        self.discriminator
            .as_ref()
            .and_then(Value::as_str)
            .expect("discriminator must be a string on a validated schema")
    }
}
