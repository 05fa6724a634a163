//! Map keys: the composite-key wrapper and the stored key form.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::ser::{Serialize, Serializer};

use crate::emit;
use crate::error::Error;
use crate::value::Value;

/// A sequence or map used as a map key.
///
/// The wrapper owns its own copy of the composite value together with a canonical flow-YAML
/// rendering of it. The text is for display and diagnostics only; two keys are equal exactly
/// when their data are structurally equal.
///
/// ```rust
/// use yaml_keys::{Key, Value};
///
/// let key = Key::new(Value::from(vec![Value::from(1), Value::from("x")])).unwrap();
/// assert_eq!(key.text(), "[1, x]");
/// assert!(Key::new(Value::from(1)).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Key {
    data: Value,
    text: String,
}

impl Key {
    /// Wrap a composite value. Scalars are rejected: they are keys on their own.
    pub fn new(data: Value) -> Result<Self, Error> {
        if data.is_simple() {
            return Err(Error::msg(format!(
                "a {} is a simple key and needs no wrapper",
                data.type_name()
            )));
        }
        let text = emit::to_flow_string(&data)?;
        Ok(Key { data, text })
    }

    #[inline]
    pub fn data(&self) -> &Value {
        &self.data
    }

    #[inline]
    pub fn into_data(self) -> Value {
        self.data
    }

    /// Canonical flow-style rendering, e.g. `{complex1: 0, complex2: 1}`.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Key {}

impl PartialEq<Value> for Key {
    fn eq(&self, other: &Value) -> bool {
        &self.data == other
    }
}

impl PartialEq<Key> for Value {
    fn eq(&self, other: &Key) -> bool {
        self == &other.data
    }
}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

/// Key as stored inside a [`crate::Map`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapKey {
    /// A scalar, indexed by hash.
    Simple(Value),
    /// A sequence or map, found by structural comparison.
    Composite(Key),
}

impl MapKey {
    /// Classify `data`, wrapping it when composite.
    pub fn new(data: Value) -> Result<Self, Error> {
        if data.is_simple() {
            Ok(MapKey::Simple(data))
        } else {
            Key::new(data).map(MapKey::Composite)
        }
    }

    /// The unwrapped key data.
    #[inline]
    pub fn data(&self) -> &Value {
        match self {
            MapKey::Simple(v) => v,
            MapKey::Composite(k) => k.data(),
        }
    }

    #[inline]
    pub fn is_composite(&self) -> bool {
        matches!(self, MapKey::Composite(_))
    }

    pub fn into_data(self) -> Value {
        match self {
            MapKey::Simple(v) => v,
            MapKey::Composite(k) => k.into_data(),
        }
    }
}

impl fmt::Display for MapKey {
    /// Strings verbatim, other scalars in YAML spelling, composites by their canonical text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Simple(Value::String(s)) => f.write_str(s),
            MapKey::Simple(v) => fmt::Display::fmt(v, f),
            MapKey::Composite(k) => fmt::Display::fmt(k, f),
        }
    }
}

impl PartialEq<Value> for MapKey {
    fn eq(&self, other: &Value) -> bool {
        self.data() == other
    }
}

impl Serialize for MapKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data().serialize(serializer)
    }
}

/// Anything that can name a map entry: a bare [`Value`], a [`Key`] or a stored [`MapKey`].
///
/// Lookups always go through [`KeyLike::key_data`], so a wrapper and the bare value it wraps
/// find the same entry.
pub trait KeyLike {
    /// The raw structural data of this key.
    fn key_data(&self) -> &Value;

    /// Convert into the stored key form, wrapping composites as needed.
    fn into_map_key(self) -> Result<MapKey, Error>
    where
        Self: Sized;
}

impl KeyLike for Value {
    #[inline]
    fn key_data(&self) -> &Value {
        self
    }

    fn into_map_key(self) -> Result<MapKey, Error> {
        MapKey::new(self)
    }
}

impl KeyLike for Key {
    #[inline]
    fn key_data(&self) -> &Value {
        self.data()
    }

    fn into_map_key(self) -> Result<MapKey, Error> {
        Ok(MapKey::Composite(self))
    }
}

impl KeyLike for MapKey {
    #[inline]
    fn key_data(&self) -> &Value {
        self.data()
    }

    fn into_map_key(self) -> Result<MapKey, Error> {
        Ok(self)
    }
}

/// Unwrap a key to its data; a bare value is returned unchanged.
#[inline]
pub fn key_data<K: KeyLike + ?Sized>(key: &K) -> &Value {
    key.key_data()
}
