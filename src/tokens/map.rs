//! Insertion-ordered token table

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Built-in phonetic symbol table, in its canonical order
pub const DEFAULT_TOKENS: &[(&str, &str)] = &[
    ("o", "ø"),
    ("a", "ɛ"),
    ("oe", "œ"),
    ("OE", "ɶ"),
    ("t", "ʈ"),
    ("d", "ɖ"),
    ("th", "θ"),
    ("dh", "ð"),
    ("sh", "ʃ"),
    ("zh", "ʒ"),
    (".s", "ʂ"),
    (".z", "ʐ"),
    ("v", "ʋ"),
    ("r", "ɹ"),
];

/// Mapping from a literal token to its replacement.
///
/// Iteration follows insertion order. Updating an existing key keeps its
/// position; new keys are appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap {
    entries: Vec<(String, String)>,
}

impl TokenMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in phonetic table
    pub fn builtin() -> Self {
        DEFAULT_TOKENS.iter().copied().collect()
    }

    /// Insert or update a token, returning the previous replacement
    pub fn insert(&mut self, token: impl Into<String>, replacement: impl Into<String>) -> Option<String> {
        let token = token.into();
        let replacement = replacement.into();
        match self.entries.iter_mut().find(|(key, _)| *key == token) {
            Some((_, value)) => Some(std::mem::replace(value, replacement)),
            None => {
                self.entries.push((token, replacement));
                None
            }
        }
    }

    /// Remove a token, returning its replacement
    pub fn remove(&mut self, token: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(key, _)| key == token)?;
        Some(self.entries.remove(idx).1)
    }

    /// Look up the replacement for a token
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == token)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.get(token).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(token, replacement)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TokenMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TokenMap::new();
        for (token, replacement) in iter {
            map.insert(token, replacement);
        }
        map
    }
}

impl Serialize for TokenMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (token, replacement) in &self.entries {
            map.serialize_entry(token, replacement)?;
        }
        map.end()
    }
}

struct TokenMapVisitor;

impl<'de> Visitor<'de> for TokenMapVisitor {
    type Value = TokenMap;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a table of token = replacement strings")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = TokenMap::new();
        while let Some((token, replacement)) = access.next_entry::<String, String>()? {
            map.insert(token, replacement);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for TokenMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TokenMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let map = TokenMap::builtin();
        let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys.first(), Some(&"o"));
        assert_eq!(keys.last(), Some(&"r"));
        assert_eq!(map.len(), 14);
        assert_eq!(map.get("th"), Some("θ"));
        assert_eq!(map.get(".z"), Some("ʐ"));
    }

    #[test]
    fn test_update_keeps_position() {
        let mut map: TokenMap = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        assert_eq!(map.insert("b", "two"), Some("2".to_string()));
        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "two"), ("c", "3")]);
    }

    #[test]
    fn test_insert_appends_and_remove() {
        let mut map = TokenMap::new();
        assert!(map.is_empty());
        map.insert("x", "ks");
        map.insert("ng", "ŋ");
        assert_eq!(map.iter().last(), Some(("ng", "ŋ")));
        assert_eq!(map.remove("x"), Some("ks".to_string()));
        assert_eq!(map.remove("x"), None);
        assert!(!map.contains("x"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_toml_preserves_order() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            lookup: TokenMap,
        }

        let source = "[lookup]\nzh = \"ʒ\"\na = \"ɛ\"\n\".s\" = \"ʂ\"\n";
        let parsed: Wrapper = toml::from_str(source).unwrap();
        let keys: Vec<_> = parsed.lookup.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zh", "a", ".s"]);

        let written = toml::to_string(&parsed).unwrap();
        let reparsed: Wrapper = toml::from_str(&written).unwrap();
        assert_eq!(reparsed.lookup, parsed.lookup);
    }
}
