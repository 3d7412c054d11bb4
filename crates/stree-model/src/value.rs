//! Typed property bags.
//!
//! A [`PropertyBag`] is an ordered list of property descriptors plus one
//! value per descriptor. Values have a canonical text form
//! ([`PropertyValue::export_text`]) used for value comparison; export fails
//! for values that have no faithful text representation (non-finite
//! floats).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{ModelError, ModelResult};

/// Declared type of a bag property.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    Bool,
    Int32,
    Int64,
    Float,
    Double,
    Name,
    String,
    Text,
    /// Enum property, carrying the enum's type path.
    Enum(String),
    /// Struct property, carrying the struct's type path.
    Struct(String),
    /// Object reference, carrying the referenced class path.
    Object(String),
    Array(Box<PropertyType>),
}

impl PropertyType {
    /// Two descriptors are compatible when they describe the same value
    /// kind, including the referenced type path for enums, structs and
    /// objects, and the element type for arrays.
    pub fn is_compatible_with(&self, other: &PropertyType) -> bool {
        match (self, other) {
            (Self::Array(a), Self::Array(b)) => a.is_compatible_with(b),
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int32 => write!(f, "int32"),
            Self::Int64 => write!(f, "int64"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Name => write!(f, "name"),
            Self::String => write!(f, "string"),
            Self::Text => write!(f, "text"),
            Self::Enum(path) => write!(f, "enum<{path}>"),
            Self::Struct(path) => write!(f, "struct<{path}>"),
            Self::Object(path) => write!(f, "object<{path}>"),
            Self::Array(inner) => write!(f, "array<{inner}>"),
        }
    }
}

/// A property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Enum(String),
    Struct(BTreeMap<String, PropertyValue>),
    /// Object reference by path; `None` is a null reference.
    Object(Option<String>),
    Array(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Whether this value can be stored in a property of type `ty`.
    pub fn matches(&self, ty: &PropertyType) -> bool {
        match (self, ty) {
            (Self::Bool(_), PropertyType::Bool) => true,
            (Self::Int(v), PropertyType::Int32) => i32::try_from(*v).is_ok(),
            (Self::Int(_), PropertyType::Int64) => true,
            (Self::Float(_), PropertyType::Float | PropertyType::Double) => true,
            (
                Self::String(_),
                PropertyType::Name | PropertyType::String | PropertyType::Text,
            ) => true,
            (Self::Enum(_), PropertyType::Enum(_)) => true,
            (Self::Struct(_), PropertyType::Struct(_)) => true,
            (Self::Object(_), PropertyType::Object(_)) => true,
            (Self::Array(items), PropertyType::Array(inner)) => {
                items.iter().all(|item| item.matches(inner))
            }
            _ => false,
        }
    }

    /// Short name of the value kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Enum(_) => "enum",
            Self::Struct(_) => "struct",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
        }
    }

    /// Canonical JSON form of the value.
    ///
    /// Struct members are emitted in key order, so two structurally equal
    /// values always export identically.
    pub fn to_canonical_json(&self) -> ModelResult<Value> {
        Ok(match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Number((*i).into()),
            Self::Float(f) => Value::Number(
                Number::from_f64(*f)
                    .ok_or_else(|| ModelError::Export(format!("non-finite float {f}")))?,
            ),
            Self::String(s) | Self::Enum(s) => Value::String(s.clone()),
            Self::Object(path) => path.clone().map_or(Value::Null, Value::String),
            Self::Struct(fields) => {
                let mut map = Map::new();
                for (name, value) in fields {
                    map.insert(name.clone(), value.to_canonical_json()?);
                }
                Value::Object(map)
            }
            Self::Array(items) => Value::Array(
                items
                    .iter()
                    .map(PropertyValue::to_canonical_json)
                    .collect::<ModelResult<Vec<_>>>()?,
            ),
        })
    }

    /// Canonical text form used for value comparison.
    pub fn export_text(&self) -> ModelResult<String> {
        let json = self.to_canonical_json()?;
        serde_json::to_string(&json).map_err(|e| ModelError::Export(e.to_string()))
    }
}

/// Name and type of one bag property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDesc {
    pub name: String,
    pub value_type: PropertyType,
}

impl PropertyDesc {
    pub fn new(name: impl Into<String>, value_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

/// An ordered, typed bag of named properties.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyBag {
    #[serde(default)]
    descs: Vec<PropertyDesc>,
    #[serde(default)]
    values: BTreeMap<String, PropertyValue>,
}

impl PropertyBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property with its initial value.
    pub fn add_property(
        &mut self,
        name: impl Into<String>,
        value_type: PropertyType,
        value: PropertyValue,
    ) -> ModelResult<()> {
        let name = name.into();
        if self.descs.iter().any(|d| d.name == name) {
            return Err(ModelError::DuplicateProperty(name));
        }
        if !value.matches(&value_type) {
            return Err(ModelError::TypeMismatch {
                name,
                expected: value_type.to_string(),
                actual: value.kind_name().to_string(),
            });
        }
        self.descs.push(PropertyDesc::new(name.clone(), value_type));
        self.values.insert(name, value);
        Ok(())
    }

    /// Builder-style variant of [`add_property`](Self::add_property).
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        value_type: PropertyType,
        value: PropertyValue,
    ) -> ModelResult<Self> {
        self.add_property(name, value_type, value)?;
        Ok(self)
    }

    /// Replace the value of an existing property.
    pub fn set_value(&mut self, name: &str, value: PropertyValue) -> ModelResult<()> {
        let desc = self
            .descs
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| ModelError::UnknownProperty(name.to_string()))?;
        if !value.matches(&desc.value_type) {
            return Err(ModelError::TypeMismatch {
                name: name.to_string(),
                expected: desc.value_type.to_string(),
                actual: value.kind_name().to_string(),
            });
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Property descriptors in declaration order.
    pub fn descs(&self) -> &[PropertyDesc] {
        &self.descs
    }

    /// Value of a property, if the bag holds one.
    pub fn value(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Number of declared properties.
    pub fn len(&self) -> usize {
        self.descs.len()
    }

    /// Returns `true` if the bag declares no properties.
    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_read_property() {
        let mut bag = PropertyBag::new();
        bag.add_property("Speed", PropertyType::Float, PropertyValue::Float(2.5))
            .unwrap();
        assert_eq!(bag.len(), 1);
        assert_eq!(bag.value("Speed"), Some(&PropertyValue::Float(2.5)));
        assert_eq!(bag.descs()[0].name, "Speed");
    }

    #[test]
    fn add_rejects_type_mismatch() {
        let mut bag = PropertyBag::new();
        let err = bag
            .add_property("Count", PropertyType::Int32, PropertyValue::Bool(true))
            .unwrap_err();
        assert!(matches!(err, ModelError::TypeMismatch { .. }));
    }

    #[test]
    fn int32_range_is_checked() {
        assert!(PropertyValue::Int(i64::from(i32::MAX)).matches(&PropertyType::Int32));
        assert!(!PropertyValue::Int(i64::from(i32::MAX) + 1).matches(&PropertyType::Int32));
    }

    #[test]
    fn add_rejects_duplicate_name() {
        let mut bag = PropertyBag::new();
        bag.add_property("A", PropertyType::Bool, PropertyValue::Bool(true))
            .unwrap();
        assert!(matches!(
            bag.add_property("A", PropertyType::Bool, PropertyValue::Bool(false)),
            Err(ModelError::DuplicateProperty(_))
        ));
    }

    #[test]
    fn set_value_checks_type() {
        let mut bag = PropertyBag::new()
            .with_property("Name", PropertyType::Name, PropertyValue::String("a".into()))
            .unwrap();
        bag.set_value("Name", PropertyValue::String("b".into())).unwrap();
        assert!(bag.set_value("Name", PropertyValue::Int(1)).is_err());
        assert!(bag.set_value("Missing", PropertyValue::Int(1)).is_err());
    }

    #[test]
    fn export_is_key_ordered() {
        let mut a = BTreeMap::new();
        a.insert("z".to_string(), PropertyValue::Int(1));
        a.insert("a".to_string(), PropertyValue::Bool(false));
        let text = PropertyValue::Struct(a).export_text().unwrap();
        assert_eq!(text, r#"{"a":false,"z":1}"#);
    }

    #[test]
    fn export_fails_on_non_finite_float() {
        let value = PropertyValue::Array(vec![PropertyValue::Float(f64::NAN)]);
        assert!(matches!(value.export_text(), Err(ModelError::Export(_))));
    }

    #[test]
    fn array_types_compare_elementwise() {
        let a = PropertyType::Array(Box::new(PropertyType::Struct("/Game/Target".into())));
        let b = PropertyType::Array(Box::new(PropertyType::Struct("/Game/Target".into())));
        let c = PropertyType::Array(Box::new(PropertyType::Struct("/Game/Other".into())));
        assert!(a.is_compatible_with(&b));
        assert!(!a.is_compatible_with(&c));
    }
}
