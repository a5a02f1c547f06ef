//! Metadata side tables attached to meshes and data arrays.
//!
//! Only a fixed set of keys is known ([`MetaKey`]). Each key has a value type
//! and a name as it appears in files. The table of key descriptors is a
//! read-only static shared by all codecs.

use std::{
    collections::BTreeMap,
    fmt,
};

use derive_more::From;


/// The value type of a metadata key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Integer,
    Double,
}

/// One of the known metadata keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetaKey {
    Date,
    UserName,
    SubjectId,
    SurfaceId,
    UniqueId,
    Name,
    Description,
    TimeStep,
    DataSpace,
    AnatomicalStructurePrimary,
    AnatomicalStructureSecondary,
    GeometricType,
    TopologicalType,
    IntentCode,
    IntentP1,
    IntentP2,
    IntentP3,
}

struct KeyInfo {
    key: MetaKey,
    name: &'static str,
    ty: ValueType,
    aliases: &'static [&'static str],
}

macro_rules! key_table {
    ($( $key:ident => $name:literal, $ty:ident $(, [$($alias:literal),*])? ; )*) => {
        static KEYS: &[KeyInfo] = &[
            $(
                KeyInfo {
                    key: MetaKey::$key,
                    name: $name,
                    ty: ValueType::$ty,
                    aliases: &[$($($alias),*)?],
                },
            )*
        ];
    };
}

// Must be in the same order as the variants of `MetaKey`.
key_table! {
    Date => "Date", String;
    UserName => "UserName", String;
    SubjectId => "SubjectID", String;
    SurfaceId => "SurfaceID", String;
    UniqueId => "UniqueID", String;
    Name => "Name", String;
    Description => "Description", String;
    TimeStep => "TimeStep", Double;
    DataSpace => "DataSpace", String;
    AnatomicalStructurePrimary => "AnatomicalStructurePrimary", String;
    AnatomicalStructureSecondary => "AnatomicalStructureSecondary", String;
    GeometricType => "GeometricType", String;
    TopologicalType => "TopologicalType", String;
    IntentCode => "Intent_code", Integer, ["Intent", "IntentCode"];
    IntentP1 => "intent_p1", Double, ["Intent_p1", "IntentP1"];
    IntentP2 => "intent_p2", Double, ["Intent_p2", "IntentP2"];
    IntentP3 => "intent_p3", Double, ["Intent_p3", "IntentP3"];
}

impl MetaKey {
    /// All keys, in declaration order.
    pub const ALL: [MetaKey; 17] = [
        MetaKey::Date,
        MetaKey::UserName,
        MetaKey::SubjectId,
        MetaKey::SurfaceId,
        MetaKey::UniqueId,
        MetaKey::Name,
        MetaKey::Description,
        MetaKey::TimeStep,
        MetaKey::DataSpace,
        MetaKey::AnatomicalStructurePrimary,
        MetaKey::AnatomicalStructureSecondary,
        MetaKey::GeometricType,
        MetaKey::TopologicalType,
        MetaKey::IntentCode,
        MetaKey::IntentP1,
        MetaKey::IntentP2,
        MetaKey::IntentP3,
    ];

    fn info(self) -> &'static KeyInfo {
        &KEYS[self as usize]
    }

    /// The name used when writing this key to a file.
    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn value_type(self) -> ValueType {
        self.info().ty
    }

    /// Looks up a key by its file name or one of the alternative spellings
    /// accepted on read. Matching is case sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        KEYS.iter()
            .find(|info| info.name == name || info.aliases.contains(&name))
            .map(|info| info.key)
    }
}

impl fmt::Display for MetaKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.name().fmt(f)
    }
}

/// A typed metadata value.
#[derive(Debug, Clone, PartialEq, From)]
pub enum MetaValue {
    String(String),
    Integer(i64),
    Double(f64),
}

impl MetaValue {
    /// Parses `s` as a value of type `ty`. Returns `None` if `s` is not a
    /// valid integer or floating point number for the numeric types.
    pub fn parse(ty: ValueType, s: &str) -> Option<Self> {
        match ty {
            ValueType::String => Some(MetaValue::String(s.to_owned())),
            ValueType::Integer => s.trim().parse().ok().map(MetaValue::Integer),
            ValueType::Double => s.trim().parse().ok().map(MetaValue::Double),
        }
    }

    pub fn ty(&self) -> ValueType {
        match self {
            MetaValue::String(_) => ValueType::String,
            MetaValue::Integer(_) => ValueType::Integer,
            MetaValue::Double(_) => ValueType::Double,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            MetaValue::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match *self {
            MetaValue::Double(d) => Some(d),
            MetaValue::Integer(i) => Some(i as f64),
            _ => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(src: &str) -> Self {
        MetaValue::String(src.to_owned())
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MetaValue::String(s) => s.fmt(f),
            MetaValue::Integer(i) => i.fmt(f),
            MetaValue::Double(d) => d.fmt(f),
        }
    }
}

/// Key/value side table, ordered by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaData {
    entries: BTreeMap<MetaKey, MetaValue>,
}

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: MetaKey) -> Option<&MetaValue> {
        self.entries.get(&key)
    }

    /// Returns the value of `key` if it is a string.
    pub fn get_str(&self, key: MetaKey) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    pub fn get_integer(&self, key: MetaKey) -> Option<i64> {
        self.get(key).and_then(|v| v.as_integer())
    }

    pub fn get_double(&self, key: MetaKey) -> Option<f64> {
        self.get(key).and_then(|v| v.as_double())
    }

    pub fn contains(&self, key: MetaKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Sets `key` to `value` and returns the old value.
    pub fn set(&mut self, key: MetaKey, value: impl Into<MetaValue>) -> Option<MetaValue> {
        self.entries.insert(key, value.into())
    }

    /// Parses `raw` according to the value type of `key` and stores it.
    /// Returns `false` (and leaves the table untouched) if parsing fails.
    pub fn set_parsed(&mut self, key: MetaKey, raw: &str) -> bool {
        match MetaValue::parse(key.value_type(), raw) {
            Some(value) => {
                self.entries.insert(key, value);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: MetaKey) -> Option<MetaValue> {
        self.entries.remove(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetaKey, &MetaValue)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
