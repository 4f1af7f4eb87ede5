//! Ordered name/value parameter lists for query strings and request bodies.

use std::collections::{BTreeMap, HashMap};

/// Parameters in caller order. Duplicate names are kept as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_vec(self) -> Vec<(String, String)> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for Params {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> From<BTreeMap<K, V>> for Params {
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> From<HashMap<K, V>> for Params {
    fn from(map: HashMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_caller_order_and_duplicates() {
        let params = Params::from([("b", "2"), ("a", "1"), ("b", "3")]);
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("b", "2"), ("a", "1"), ("b", "3")]);
        assert_eq!(params.get("b"), Some("2"));
    }

    #[test]
    fn builder_and_conversions() {
        let built = Params::new().add("country", "AU").add("city", "Sydney");
        let from_vec = Params::from(vec![
            ("country".to_string(), "AU".to_string()),
            ("city".to_string(), "Sydney".to_string()),
        ]);
        assert_eq!(built, from_vec);
        assert_eq!(built.len(), 2);
        assert!(Params::new().is_empty());
    }

    #[test]
    fn from_sorted_map() {
        let mut map = BTreeMap::new();
        map.insert("z", "last");
        map.insert("a", "first");
        let params = Params::from(map);
        assert_eq!(params.into_vec()[0], ("a".to_string(), "first".to_string()));
    }
}
