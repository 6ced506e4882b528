use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A mode (named value-set) inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMode {
    pub mode_id: String,
    pub name: String,
    /// Identity recorded by a prior import, independent of `name`.
    pub original_id: Option<String>,
}

/// A collection of variables, partitioned into modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCollection {
    pub id: String,
    pub name: String,
    /// Identity recorded by a prior import, independent of `name`.
    pub original_id: Option<String>,
    pub modes: Vec<HostMode>,
    /// The implicit mode every collection is created with.
    pub default_mode_id: String,
}

impl HostCollection {
    pub fn mode(&self, mode_id: &str) -> Option<&HostMode> {
        self.modes.iter().find(|m| m.mode_id == mode_id)
    }
}

/// The resolved kind of a variable. Every declared token type maps to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Color,
    Number,
    String,
    Boolean,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Color => write!(f, "color"),
            ValueKind::Number => write!(f, "number"),
            ValueKind::String => write!(f, "string"),
            ValueKind::Boolean => write!(f, "boolean"),
        }
    }
}

/// Normalized colour channels, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
}

/// A value held by a variable for one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum HostValue {
    Color(Rgba),
    Number(f64),
    String(String),
    Boolean(bool),
    /// A pointer to another variable; resolved by the host at read time.
    Alias { variable_id: String },
}

impl HostValue {
    /// The concrete kind of this value, or `None` for aliases.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            HostValue::Color(_) => Some(ValueKind::Color),
            HostValue::Number(_) => Some(ValueKind::Number),
            HostValue::String(_) => Some(ValueKind::String),
            HostValue::Boolean(_) => Some(ValueKind::Boolean),
            HostValue::Alias { .. } => None,
        }
    }

    pub fn alias_target(&self) -> Option<&str> {
        match self {
            HostValue::Alias { variable_id } => Some(variable_id),
            _ => None,
        }
    }
}

/// A named, typed variable with a value per mode of its collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostVariable {
    pub id: String,
    /// Slash-delimited display name, e.g. `brand/primary`.
    pub name: String,
    pub collection_id: String,
    pub kind: ValueKind,
    /// Identity recorded by a prior import, independent of `name`.
    pub original_id: Option<String>,
    /// Values keyed by mode id.
    pub values: BTreeMap<String, HostValue>,
}
