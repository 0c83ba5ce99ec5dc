//! Style model: typed properties, per-tag style sheets, and the merge rule
//! used when the compiler resolves a tag's style.
//!
//! Two layers contribute to every element: the built-in default for the tag
//! and the caller's override for the same tag. The override wins key by key;
//! nothing cascades between tags.

pub mod sheet;
pub mod value;

pub use sheet::{ExternalStyle, ExternalStyleSheet, StyleSheet};
pub use value::{
    Color, FontStyle, FontWeight, StyleKey, StyleValue, TextAlign, TextDecorationLine,
    TextDecorationStyle, ValueKind,
};

use std::collections::BTreeMap;
use std::fmt;

use log::warn;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{Error, Result};

/// A flat set of style properties for one primitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    props: BTreeMap<StyleKey, StyleValue>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Style::set`]. A value of the wrong kind is dropped
    /// with a warning.
    pub fn with(mut self, key: StyleKey, value: impl Into<StyleValue>) -> Self {
        if let Err(e) = self.set(key, value) {
            warn!("{}", e);
        }
        self
    }

    /// Set `key`, replacing any previous value.
    pub fn set(&mut self, key: StyleKey, value: impl Into<StyleValue>) -> Result<()> {
        let value = value.into();
        if value.kind() != key.kind() {
            return Err(Error::StyleError(format!(
                "'{}' expects a {:?} value, got {:?}",
                key,
                key.kind(),
                value
            )));
        }
        self.props.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: StyleKey) -> Option<&StyleValue> {
        self.props.get(&key)
    }

    pub fn dimension(&self, key: StyleKey) -> Option<f32> {
        self.get(key).and_then(StyleValue::as_dimension)
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StyleKey, &StyleValue)> {
        self.props.iter().map(|(k, v)| (*k, v))
    }

    /// Shallow merge: every property of `over` replaces the same property of
    /// `self`. Neither input is modified.
    pub fn merge(&self, over: &Style) -> Style {
        let mut props = self.props.clone();
        for (k, v) in &over.props {
            props.insert(*k, v.clone());
        }
        Style { props }
    }

    /// Build a style from a JSON object such as `{"color": "red", "fontSize": 12}`.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Style> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::StyleError(format!("expected an object, got {}", value)))?;
        let mut style = Style::new();
        for (name, raw) in obj {
            let key: StyleKey = name.parse().map_err(Error::StyleError)?;
            let v = StyleValue::from_json(key, raw).map_err(Error::StyleError)?;
            style.props.insert(key, v);
        }
        Ok(style)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.props.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        f.write_str("}")
    }
}

impl Serialize for Style {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.props.len()))?;
        for (k, v) in &self.props {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Style {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Style::from_json_value(&raw).map_err(de::Error::custom)
    }
}
