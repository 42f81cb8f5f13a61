//! Request Parameters Module
//!
//! A small key/value list used for query strings and OAuth signing.

use std::fmt;

use super::oauth::percent_encode;

// == Params ==
/// Ordered list of string parameters with unique keys.
///
/// Insertion order is kept for display, but every consumer that affects the
/// wire (signing, query rendering) goes through [`Params::sorted`], so two
/// lists with the same pairs always produce the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pair, replacing the value of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Builder-style [`Params::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Copies every pair of `other` into `self`; `other` wins on collision.
    pub fn merge(&mut self, other: &Params) {
        for (k, v) in other.iter() {
            self.insert(k, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Pairs sorted by key, then value.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self.iter().collect();
        pairs.sort();
        pairs
    }

    /// Renders `k=v&k=v` with RFC 3986 encoding, sorted by key.
    pub fn to_query_string(&self) -> String {
        self.sorted()
            .into_iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut params = Params::new();
        params.insert("limit", "10");
        params.insert("offset", "0");
        params.insert("limit", "20");

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("limit"), Some("20"));
    }

    #[test]
    fn test_query_string_is_order_insensitive() {
        let a: Params = [("offset", "0"), ("limit", "2")].into_iter().collect();
        let b: Params = [("limit", "2"), ("offset", "0")].into_iter().collect();

        assert_eq!(a.to_query_string(), "limit=2&offset=0");
        assert_eq!(a.to_query_string(), b.to_query_string());
    }

    #[test]
    fn test_query_string_encodes_values() {
        let params = Params::new().with("q", "name IS \"A&B\"");
        assert_eq!(params.to_query_string(), "q=name%20IS%20%22A%26B%22");
    }

    #[test]
    fn test_merge_other_wins() {
        let mut base = Params::new().with("a", "1").with("b", "2");
        let other = Params::new().with("b", "3");
        base.merge(&other);

        assert_eq!(base.get("b"), Some("3"));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_empty() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.to_query_string(), "");
    }
}
