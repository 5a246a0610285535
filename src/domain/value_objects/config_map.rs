//! Configuration Mapping Value Object
//!
//! The flat key/value mapping substituted into templates. Every value
//! carries a secrecy flag so the renderer can mark artifacts that embed
//! sensitive material.

use std::collections::BTreeMap;

use crate::domain::value_objects::SecretString;

/// One mapping value with its secrecy flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue {
    value: String,
    secret: bool,
}

impl ConfigValue {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            secret: false,
        }
    }

    pub fn secret(value: &SecretString) -> Self {
        Self {
            value: value.expose().to_string(),
            secret: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }
}

/// Flat key to string mapping handed to the template renderer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMap(BTreeMap<String, ConfigValue>);

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a plain value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), ConfigValue::plain(value));
    }

    /// Insert a sensitive value
    pub fn insert_secret(&mut self, key: impl Into<String>, value: &SecretString) {
        self.0.insert(key.into(), ConfigValue::secret(value));
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.0.iter()
    }

    /// Merge in the synthetic `name` key for a deployment unit
    ///
    /// The synthetic key wins over any caller-supplied `name`.
    pub fn merged_with_name(&self, name: &str) -> ConfigMap {
        let mut merged = self.clone();
        merged
            .0
            .insert("name".to_string(), ConfigValue::plain(name));
        merged
    }
}

impl FromIterator<(String, String)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = ConfigMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get_plain_value() {
        let mut map = ConfigMap::new();
        map.insert("server", "smtp.example.org");

        let value = map.get("server").unwrap();
        assert_eq!(value.as_str(), "smtp.example.org");
        assert!(!value.is_secret());
    }

    #[test]
    fn insert_secret_marks_value() {
        let mut map = ConfigMap::new();
        map.insert_secret("password", &SecretString::new("hunter2"));

        let value = map.get("password").unwrap();
        assert_eq!(value.as_str(), "hunter2");
        assert!(value.is_secret());
    }

    #[test]
    fn merged_with_name_adds_synthetic_key() {
        let map = ConfigMap::new();
        let merged = map.merged_with_name("svc1");
        assert_eq!(merged.get("name").unwrap().as_str(), "svc1");
    }

    #[test]
    fn merged_with_name_overrides_caller_name() {
        let mut map = ConfigMap::new();
        map.insert("name", "caller-supplied");

        let merged = map.merged_with_name("svc1");
        assert_eq!(merged.get("name").unwrap().as_str(), "svc1");
    }

    #[test]
    fn merged_with_name_does_not_mutate_original() {
        let map = ConfigMap::new();
        let _ = map.merged_with_name("svc1");
        assert!(map.is_empty());
    }

    #[test]
    fn from_iterator_collects_plain_values() {
        let map: ConfigMap = vec![("a".to_string(), "1".to_string())]
            .into_iter()
            .collect();
        assert_eq!(map.get("a").unwrap().as_str(), "1");
        assert_eq!(map.len(), 1);
    }
}
