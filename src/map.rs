//! Keyed map whose keys may be sequences or maps.
//!
//! Entries live in one vector. Simple keys are also indexed by hash (`ahash` over the key
//! value, buckets of positions in a `nohash` map since the keys are already hashes). Composite
//! keys are looked up by a linear scan with structural equality, the only comparison that is
//! reliable for them.

use std::collections::HashMap;
use std::fmt;

use ahash::RandomState;
use nohash_hasher::BuildNoHashHasher;
use serde::ser::{Serialize, SerializeMap, Serializer};
use smallvec::SmallVec;

use crate::error::Error;
use crate::key::{KeyLike, MapKey};
use crate::value::Value;

/// How [`Map::merge`] treats keys present on both sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergePolicy {
    /// First writer wins: entries already in the destination are never replaced.
    /// This is how YAML merge keys (`<<`) fold.
    KeepExisting,
    /// Last writer wins: incoming entries replace existing values.
    Overwrite,
}

/// A mapping from [`MapKey`] to [`Value`] holding at most one entry per structurally distinct key.
///
/// Iteration follows insertion order until the first [`Map::delete`]; after that the order is
/// unspecified.
///
/// ```rust
/// use yaml_keys::{Map, Value};
///
/// let mut map = Map::new();
/// let key = Value::from(vec![Value::from("a"), Value::from(1)]);
/// map.put(key.clone(), Value::from("first")).unwrap();
/// map.put(key.clone(), Value::from("second")).unwrap();
/// assert_eq!(map.len(), 1);
/// assert_eq!(map.get(&key), Some(&Value::from("second")));
/// ```
#[derive(Clone, Default)]
pub struct Map {
    entries: Vec<(MapKey, Value)>,
    index: HashMap<u64, SmallVec<[usize; 1]>, BuildNoHashHasher<u64>>,
    hasher: RandomState,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Map {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity_and_hasher(capacity, BuildNoHashHasher::default()),
            hasher: RandomState::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value stored under a key structurally equal to `key`.
    pub fn get<K: KeyLike + ?Sized>(&self, key: &K) -> Option<&Value> {
        self.find(key.key_data()).map(|i| &self.entries[i].1)
    }

    pub fn get_mut<K: KeyLike + ?Sized>(&mut self, key: &K) -> Option<&mut Value> {
        let i = self.find(key.key_data())?;
        Some(&mut self.entries[i].1)
    }

    /// Stored key and value for `key`. The stored key is the one first inserted.
    pub fn get_key_value<K: KeyLike + ?Sized>(&self, key: &K) -> Option<(&MapKey, &Value)> {
        self.find(key.key_data()).map(|i| {
            let (k, v) = &self.entries[i];
            (k, v)
        })
    }

    pub fn contains_key<K: KeyLike + ?Sized>(&self, key: &K) -> bool {
        self.find(key.key_data()).is_some()
    }

    /// Insert or overwrite.
    ///
    /// When a structurally equal key is already present its value is replaced in place, the
    /// stored key is kept, and the old value is returned. Otherwise the key is wrapped (if
    /// composite) and appended. Fails only when a new composite key cannot be rendered.
    pub fn put<K: KeyLike>(&mut self, key: K, value: Value) -> Result<Option<Value>, Error> {
        if let Some(i) = self.find(key.key_data()) {
            return Ok(Some(std::mem::replace(&mut self.entries[i].1, value)));
        }
        let key = key.into_map_key()?;
        self.push_new(key, value);
        Ok(None)
    }

    /// Remove the entry whose key is structurally equal to `key`.
    ///
    /// The last entry moves into the freed slot.
    pub fn delete<K: KeyLike + ?Sized>(&mut self, key: &K) -> Option<Value> {
        let pos = self.find(key.key_data())?;
        let last = self.entries.len() - 1;
        self.unindex(pos);
        if pos != last {
            self.unindex(last);
        }
        let (_, value) = self.entries.swap_remove(pos);
        if pos != last {
            self.index_entry(pos);
        }
        Some(value)
    }

    /// Fold every entry of `from` into `self` according to `policy`.
    ///
    /// Keys of `from` are already in stored form, so merging cannot fail.
    pub fn merge(&mut self, from: Map, policy: MergePolicy) {
        for (key, value) in from.entries {
            match self.find(key.data()) {
                Some(i) => {
                    if policy == MergePolicy::Overwrite {
                        self.entries[i].1 = value;
                    }
                }
                None => self.push_new(key, value),
            }
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &MapKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    /// Append an entry the caller knows is absent.
    pub(crate) fn push_new(&mut self, key: MapKey, value: Value) {
        self.entries.push((key, value));
        self.index_entry(self.entries.len() - 1);
    }

    fn find(&self, key: &Value) -> Option<usize> {
        if key.is_simple() {
            let bucket = self.index.get(&self.hasher.hash_one(key))?;
            bucket
                .iter()
                .copied()
                .find(|&i| self.entries[i].0.data() == key)
        } else {
            self.entries
                .iter()
                .position(|(k, _)| k.is_composite() && k.data() == key)
        }
    }

    fn index_entry(&mut self, pos: usize) {
        if let MapKey::Simple(v) = &self.entries[pos].0 {
            let hash = self.hasher.hash_one(v);
            self.index.entry(hash).or_default().push(pos);
        }
    }

    fn unindex(&mut self, pos: usize) {
        if let MapKey::Simple(v) = &self.entries[pos].0 {
            let hash = self.hasher.hash_one(v);
            if let Some(bucket) = self.index.get_mut(&hash) {
                bucket.retain(|i| *i != pos);
                if bucket.is_empty() {
                    self.index.remove(&hash);
                }
            }
        }
    }
}

impl PartialEq for Map {
    /// Same number of entries, and every key of `self` finds a structurally equal key in
    /// `other` with an equal value. Keys are unique on both sides, so this is symmetric.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| ov == v))
    }
}

impl Eq for Map {}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k.data(), v)))
            .finish()
    }
}

impl Serialize for Map {
    /// Keys serialize as their unwrapped data. Serializers that only accept string keys
    /// (such as JSON) reject maps with composite keys.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k.data(), v)?;
        }
        map.end()
    }
}

/// Borrowing iterator over `(key, value)` pairs.
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, (MapKey, Value)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a MapKey, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Owning iterator over `(key, value)` pairs.
pub struct IntoIter {
    inner: std::vec::IntoIter<(MapKey, Value)>,
}

impl Iterator for IntoIter {
    type Item = (MapKey, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for IntoIter {}

impl IntoIterator for Map {
    type Item = (MapKey, Value);
    type IntoIter = IntoIter;

    fn into_iter(self) -> IntoIter {
        IntoIter {
            inner: self.entries.into_iter(),
        }
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a MapKey, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    fn map_of(pairs: &[(&str, i64)]) -> Map {
        let mut map = Map::new();
        for (k, v) in pairs {
            map.put(s(k), Value::from(*v)).unwrap();
        }
        map
    }

    #[test]
    fn simple_keys_are_distinguished_by_kind() {
        let mut map = Map::new();
        map.put(Value::from(1), s("int")).unwrap();
        map.put(Value::from(1.0), s("float")).unwrap();
        map.put(s("1"), s("string")).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&Value::from(1)), Some(&s("int")));
        assert_eq!(map.get(&Value::from(1.0)), Some(&s("float")));
        assert_eq!(map.get(&s("1")), Some(&s("string")));
    }

    #[test]
    fn composite_put_overwrites_in_place() {
        let mut map = Map::new();
        let first = Value::Map(map_of(&[("b", 2), ("a", 1)]));
        let same = Value::Map(map_of(&[("a", 1), ("b", 2)]));
        assert_eq!(map.put(first, s("v1")).unwrap(), None);
        assert_eq!(map.put(same.clone(), s("v2")).unwrap(), Some(s("v1")));
        assert_eq!(map.len(), 1);

        // The stored key is still the one inserted first.
        let (stored, value) = map.get_key_value(&same).unwrap();
        assert_eq!(stored.to_string(), "{b: 2, a: 1}");
        assert_eq!(value, &s("v2"));
    }

    #[test]
    fn key_wrapper_and_bare_value_find_the_same_entry() {
        let mut map = Map::new();
        let data = Value::from(vec![s("x"), Value::Null]);
        map.put(Key::new(data.clone()).unwrap(), Value::from(true))
            .unwrap();
        assert_eq!(map.get(&data), Some(&Value::from(true)));
        assert!(map.contains_key(&Key::new(data.clone()).unwrap()));
        assert!(!map.contains_key(&Value::from(vec![Value::Null, s("x")])));
    }

    #[test]
    fn delete_keeps_index_consistent() {
        let mut map = map_of(&[("a", 1), ("b", 2), ("c", 3)]);
        map.put(Value::from(vec![s("k")]), s("seq")).unwrap();

        assert_eq!(map.delete(&s("a")), Some(Value::from(1)));
        assert_eq!(map.delete(&s("a")), None);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&s("b")), Some(&Value::from(2)));
        assert_eq!(map.get(&s("c")), Some(&Value::from(3)));

        assert_eq!(map.delete(&Value::from(vec![s("k")])), Some(s("seq")));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&s("c")), Some(&Value::from(3)));

        if let Some(v) = map.get_mut(&s("b")) {
            *v = Value::from(20);
        }
        assert_eq!(map.get(&s("b")), Some(&Value::from(20)));
    }

    #[test]
    fn merge_policies() {
        let mut keep = map_of(&[("a", 1)]);
        keep.merge(map_of(&[("a", 9), ("b", 2)]), MergePolicy::KeepExisting);
        assert_eq!(keep, map_of(&[("a", 1), ("b", 2)]));

        let mut overwrite = map_of(&[("a", 1)]);
        overwrite.merge(map_of(&[("a", 9), ("b", 2)]), MergePolicy::Overwrite);
        assert_eq!(overwrite, map_of(&[("a", 9), ("b", 2)]));
    }

    #[test]
    fn equality_ignores_order_and_checks_values() {
        let a = map_of(&[("x", 1), ("y", 2)]);
        let b = map_of(&[("y", 2), ("x", 1)]);
        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_ne!(a, map_of(&[("x", 1), ("y", 3)]));
        assert_ne!(a, map_of(&[("x", 1)]));
    }

    #[test]
    fn clone_is_independent() {
        let original = map_of(&[("a", 1)]);
        let mut copy = original.clone();
        assert_eq!(original, copy);
        copy.put(s("b"), Value::from(2)).unwrap();
        copy.delete(&s("a"));
        assert_eq!(original.len(), 1);
        assert_eq!(original.get(&s("a")), Some(&Value::from(1)));
        assert_eq!(copy.get(&s("b")), Some(&Value::from(2)));
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let map = map_of(&[("one", 1), ("two", 2), ("three", 3)]);
        let keys: Vec<String> = map.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["one", "two", "three"]);
        let total: i64 = map.values().filter_map(Value::as_i64).sum();
        assert_eq!(total, 6);
        assert_eq!(map.iter().len(), 3);
        assert_eq!(map.into_iter().count(), 3);
    }
}
