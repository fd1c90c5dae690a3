use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};

use super::PropertyValue;

/// Named property fields, kept in lexicographic key order.
///
/// A field is either present with a value or absent; there is no stored "unset"
/// value. Setting a field to `None` through [`PropertySet::set_opt`] removes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySet(BTreeMap<String, PropertyValue>);

impl PropertySet {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert or overwrite a field, returning the previous value.
    pub fn set<K, V>(&mut self, key: K, value: V) -> Option<PropertyValue>
    where
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        self.0.insert(key.into(), value.into())
    }

    /// Insert `Some` values; `None` removes the field.
    pub fn set_opt<K, V>(&mut self, key: K, value: Option<V>) -> Option<PropertyValue>
    where
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        let key = key.into();
        match value {
            Some(v) => self.0.insert(key, v.into()),
            None => self.0.remove(&key),
        }
    }

    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        self.set(key, value);
        self
    }

    pub fn with_opt<K, V>(mut self, key: K, value: Option<V>) -> Self
    where
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        self.set_opt(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.0.remove(key)
    }

    /// Iterate fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Combine two sets; fields from `other` override fields in `self`.
    pub fn merged(&self, other: &PropertySet) -> PropertySet {
        let mut out = self.clone();
        out.0
            .extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }
}

impl<K, V> FromIterator<(K, V)> for PropertySet
where
    K: Into<String>,
    V: Into<PropertyValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = PropertySet::new();
        for (k, v) in iter {
            set.set(k, v);
        }
        set
    }
}

impl IntoIterator for PropertySet {
    type Item = (String, PropertyValue);
    type IntoIter = btree_map::IntoIter<String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_opt_none_removes_field() {
        let mut set = PropertySet::new().with("keep-daily", 3i64);
        set.set_opt::<_, i64>("keep-daily", None);
        assert!(set.is_empty());
    }

    #[test]
    fn iteration_is_lexicographic() {
        let set = PropertySet::new()
            .with("keep-weekly", 1i64)
            .with("keep-all", false)
            .with("keep-last", 2i64);
        let keys: Vec<_> = set.keys().collect();
        assert_eq!(keys, vec!["keep-all", "keep-last", "keep-weekly"]);
    }

    #[test]
    fn merged_other_overrides_base() {
        let base = PropertySet::new().with("order", 1i64).with("up", 30i64);
        let other = PropertySet::new().with("order", 5i64).with("down", 60i64);

        let merged = base.merged(&other);

        assert_eq!(merged.get("order"), Some(&PropertyValue::Int(5)));
        assert_eq!(merged.get("up"), Some(&PropertyValue::Int(30)));
        assert_eq!(merged.get("down"), Some(&PropertyValue::Int(60)));
    }

    #[test]
    fn serde_transparent_json_object() {
        let set = PropertySet::new()
            .with("disk", "rootfs")
            .with("size", "+4G");
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"disk":"rootfs","size":"+4G"}"#);
    }
}
