//! Input schema model for tool definitions.
//!
//! Schemas describe the keyword arguments a tool accepts, restricted to a
//! fixed set of JSON Schema types. All structural rules are checked when a
//! value is built; a constructed `Property` or `InputSchema` is always valid.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("unknown property type '{0}'")]
    UnknownType(String),

    #[error("array property must declare 'items'")]
    MissingItems,

    #[error("enum value {value} does not match declared type '{kind}'")]
    EnumTypeMismatch { kind: PropertyType, value: Value },

    #[error("duplicate property '{0}'")]
    DuplicateProperty(String),

    #[error("required property '{0}' is not declared in 'properties'")]
    UnknownRequired(String),

    #[error("invalid property '{name}': {source}")]
    InvalidProperty {
        name: String,
        #[source]
        source: Box<SchemaError>,
    },
}

/// The closed set of types a tool input property may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Number => "number",
            PropertyType::Integer => "integer",
            PropertyType::Boolean => "boolean",
            PropertyType::Array => "array",
            PropertyType::Object => "object",
        }
    }

    /// Whether a JSON literal is a member of this type.
    fn matches(&self, value: &Value) -> bool {
        match self {
            PropertyType::String => value.is_string(),
            PropertyType::Number => value.is_number(),
            PropertyType::Integer => value.is_i64() || value.is_u64(),
            PropertyType::Boolean => value.is_boolean(),
            PropertyType::Array => value.is_array(),
            PropertyType::Object => value.is_object(),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(PropertyType::String),
            "number" => Ok(PropertyType::Number),
            "integer" => Ok(PropertyType::Integer),
            "boolean" => Ok(PropertyType::Boolean),
            "array" => Ok(PropertyType::Array),
            "object" => Ok(PropertyType::Object),
            other => Err(SchemaError::UnknownType(other.to_string())),
        }
    }
}

/// One named input parameter of a tool.
///
/// Immutable once built. `items` is mandatory for array properties and
/// ignored for everything else; nested `properties`/`required` are only
/// meaningful for object properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    #[serde(rename = "type")]
    kind: PropertyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    allowed_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Box<Property>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<BTreeMap<String, Property>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<Vec<String>>,
}

impl Property {
    pub fn builder(kind: PropertyType) -> PropertyBuilder {
        PropertyBuilder {
            kind,
            description: None,
            allowed_values: None,
            items: None,
            properties: Vec::new(),
            required: Vec::new(),
        }
    }

    /// A property with no optional fields, valid for any non-array type.
    pub fn new(kind: PropertyType) -> Result<Self, SchemaError> {
        Self::builder(kind).build()
    }

    pub fn kind(&self) -> PropertyType {
        self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn allowed_values(&self) -> Option<&[Value]> {
        self.allowed_values.as_deref()
    }

    pub fn items(&self) -> Option<&Property> {
        self.items.as_deref()
    }

    pub fn properties(&self) -> Option<&BTreeMap<String, Property>> {
        self.properties.as_ref()
    }

    pub fn required(&self) -> Option<&[String]> {
        self.required.as_deref()
    }
}

pub struct PropertyBuilder {
    kind: PropertyType,
    description: Option<String>,
    allowed_values: Option<Vec<Value>>,
    items: Option<Property>,
    properties: Vec<(String, Property)>,
    required: Vec<String>,
}

impl PropertyBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restrict the property to a fixed set of literal values.
    pub fn allowed_values<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.allowed_values = Some(values.into_iter().collect());
        self
    }

    /// Element schema for an array property.
    pub fn items(mut self, items: Property) -> Self {
        self.items = Some(items);
        self
    }

    /// Nested property of an object-typed property.
    pub fn property(mut self, name: impl Into<String>, property: Property) -> Self {
        self.properties.push((name.into(), property));
        self
    }

    /// Names of nested properties that callers must supply.
    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<Property, SchemaError> {
        let items = match (self.kind, self.items) {
            (PropertyType::Array, None) => return Err(SchemaError::MissingItems),
            (PropertyType::Array, Some(items)) => Some(Box::new(items)),
            // items only means something on arrays
            (_, _) => None,
        };

        let allowed_values = match self.allowed_values {
            Some(values) => {
                let mut deduped: Vec<Value> = Vec::new();
                for value in values {
                    if !self.kind.matches(&value) {
                        return Err(SchemaError::EnumTypeMismatch {
                            kind: self.kind,
                            value,
                        });
                    }
                    if !deduped.contains(&value) {
                        deduped.push(value);
                    }
                }
                Some(deduped)
            }
            None => None,
        };

        let (properties, required) = if self.kind == PropertyType::Object
            && (!self.properties.is_empty() || !self.required.is_empty())
        {
            let (properties, required) =
                validate_members(self.properties, self.required)?;
            (Some(properties), Some(required))
        } else {
            (None, None)
        };

        Ok(Property {
            kind: self.kind,
            description: self.description,
            allowed_values,
            items,
            properties,
            required,
        })
    }
}

/// Structural description of a tool's expected keyword arguments.
///
/// Always serializes with `"type": "object"`; `properties` and `required`
/// are kept even when empty, matching the canonical export shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    schema_type: &'static str,
    properties: BTreeMap<String, Property>,
    required: Vec<String>,
}

impl InputSchema {
    pub fn builder() -> InputSchemaBuilder {
        InputSchemaBuilder::default()
    }

    /// A schema declaring no parameters.
    pub fn empty() -> Self {
        Self {
            schema_type: "object",
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    pub fn properties(&self) -> &BTreeMap<String, Property> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }
}

#[derive(Default)]
pub struct InputSchemaBuilder {
    properties: Vec<(String, PropertyBuilder)>,
    required: Vec<String>,
}

impl InputSchemaBuilder {
    pub fn property(mut self, name: impl Into<String>, property: PropertyBuilder) -> Self {
        self.properties.push((name.into(), property));
        self
    }

    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<InputSchema, SchemaError> {
        let mut built = Vec::with_capacity(self.properties.len());
        for (name, builder) in self.properties {
            let property = builder.build().map_err(|source| SchemaError::InvalidProperty {
                name: name.clone(),
                source: Box::new(source),
            })?;
            built.push((name, property));
        }

        let (properties, required) = validate_members(built, self.required)?;

        Ok(InputSchema {
            schema_type: "object",
            properties,
            required,
        })
    }
}

/// Shared check for property maps: unique names, required is a deduplicated
/// subset of the declared properties.
fn validate_members(
    entries: Vec<(String, Property)>,
    required: Vec<String>,
) -> Result<(BTreeMap<String, Property>, Vec<String>), SchemaError> {
    let mut properties = BTreeMap::new();
    for (name, property) in entries {
        if properties.insert(name.clone(), property).is_some() {
            return Err(SchemaError::DuplicateProperty(name));
        }
    }

    let mut deduped = Vec::with_capacity(required.len());
    for name in required {
        if !properties.contains_key(&name) {
            return Err(SchemaError::UnknownRequired(name));
        }
        if !deduped.contains(&name) {
            deduped.push(name);
        }
    }

    Ok((properties, deduped))
}
