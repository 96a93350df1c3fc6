use serde::Serialize;

use crate::error::FieldError;

/// One `!re` data row: ordered `key -> value` pairs, all values are strings.
///
/// `command` is the command that produced the row (e.g. `/interface/print`).
/// It travels with the record so that lookup failures can name their origin.
///
/// Serializes as `{"command": ..., "fields": [[key, value], ...]}`, keeping
/// key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResponseRecord {
    command: String,
    fields: Vec<(String, String)>,
}

impl ResponseRecord {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            fields: Vec::new(),
        }
    }

    pub fn from_pairs<K, V>(command: impl Into<String>, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new(command);
        for (k, v) in pairs {
            record.insert(k, v);
        }
        record
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a field. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.fields.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.fields.push((key, value));
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Value of a mandatory key.
    pub fn get(&self, key: &str) -> Result<&str, FieldError> {
        self.find(key).ok_or_else(|| FieldError {
            field: key.to_string(),
            command: self.command.clone(),
        })
    }

    /// Value of an optional key, `default` when absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.find(key).unwrap_or(default)
    }

    /// Value of a key, `None` when absent.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.find(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn find(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// One `!trap` row: an error reported by the device in place of a data row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrapRecord {
    command: String,
    fields: Vec<(String, String)>,
}

impl TrapRecord {
    pub fn new(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            fields: vec![("message".to_string(), message.into())],
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.fields.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.fields.push((key, value));
        }
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Device-supplied message; empty when the trap carried none.
    pub fn message(&self) -> &str {
        self.get("message").unwrap_or("")
    }

    /// Numeric trap category, if the device sent one.
    pub fn category(&self) -> Option<&str> {
        self.get("category")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_names_field_and_command() {
        let record = ResponseRecord::new("/interface/print").with("name", "ether1");

        assert_eq!(record.get("name").unwrap(), "ether1");
        let err = record.get("mtu").unwrap_err();
        assert_eq!(err.field, "mtu");
        assert_eq!(err.command, "/interface/print");
    }

    #[test]
    fn test_get_or_falls_back_only_when_absent() {
        let record = ResponseRecord::new("/interface/print")
            .with("disabled", "")
            .with("name", "ether1");

        assert_eq!(record.get_or("disabled", "false"), "");
        assert_eq!(record.get_or("running", "false"), "false");
    }

    #[test]
    fn test_serializes_fields_in_order() {
        let record = ResponseRecord::new("/interface/print")
            .with("name", "ether1")
            .with("disabled", "false");

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"command":"/interface/print","fields":[["name","ether1"],["disabled","false"]]}"#
        );
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = ResponseRecord::from_pairs("/ip/address/print", [("a", "1"), ("b", "2")]);
        record.insert("a", "3");

        let pairs: Vec<_> = record.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_trap_accessors() {
        let trap = TrapRecord::new("/ip/address/add", "failure: already have such address")
            .with("category", "2");

        assert_eq!(trap.message(), "failure: already have such address");
        assert_eq!(trap.category(), Some("2"));
        assert_eq!(TrapRecord::default().message(), "");
    }
}
