//! Request parameter mapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered mapping from parameter names to their string form.
///
/// Keys are kept in byte-wise lexicographic order, which is the order the
/// request signature is computed in. Values are coerced to strings on insert.
///
/// # Examples
///
/// ```
/// use bilirq_core::types::Params;
///
/// let params = Params::new().with("season_id", 42).with("build", "1");
/// assert_eq!(params.get("season_id"), Some("42"));
/// assert_eq!(params.keys().collect::<Vec<_>>(), ["build", "season_id"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter and returns the set.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        self.0.insert(key.into(), value.to_string());
    }

    /// Inserts a parameter only when `value` is present.
    pub fn insert_opt(&mut self, key: impl Into<String>, value: Option<impl fmt::Display>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Removes a parameter, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns true if the parameter is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over parameter names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates over `(name, value)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes the parameters as `key=value` pairs joined by `&`,
    /// in sorted key order and without percent-encoding.
    #[must_use]
    pub fn to_sorted_query(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: fmt::Display> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl<K: Into<String>, V: fmt::Display> Extend<(K, V)> for Params {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_query() {
        let params = Params::new()
            .with("symbol", "BTC")
            .with("amount", 1)
            .with("side", "BUY");
        assert_eq!(params.to_sorted_query(), "amount=1&side=BUY&symbol=BTC");
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a: Params = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        let b: Params = [("c", "3"), ("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(a.to_sorted_query(), b.to_sorted_query());
    }

    #[test]
    fn test_byte_order_is_lexicographic() {
        let params = Params::new().with("device_name", "iPad").with("device", "pad");
        assert_eq!(params.to_sorted_query(), "device=pad&device_name=iPad");
    }

    #[test]
    fn test_insert_opt() {
        let mut params = Params::new();
        params.insert_opt("access_key", None::<String>);
        assert!(params.is_empty());
        params.insert_opt("access_key", Some("tok"));
        assert_eq!(params.get("access_key"), Some("tok"));
    }

    #[test]
    fn test_replace_and_remove() {
        let mut params = Params::new().with("ts", 1);
        params.insert("ts", 2);
        assert_eq!(params.len(), 1);
        assert_eq!(params.remove("ts").as_deref(), Some("2"));
        assert!(!params.contains("ts"));
    }
}
