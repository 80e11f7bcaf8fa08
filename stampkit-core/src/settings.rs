//! Key/value settings seam.
//!
//! Settings are owned and mutated outside the renderer; the core only reads
//! them through [`SettingsProvider`].

use std::collections::HashMap;

/// Read-only access to an external settings store.
pub trait SettingsProvider {
    fn get_string(&self, key: &str, default: &str) -> String;
    fn get_bool(&self, key: &str, default: bool) -> bool;
    fn get_int(&self, key: &str, default: i64) -> i64;
}

/// A stored setting value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    String(String),
    Bool(bool),
    Int(i64),
}

/// In-memory settings store.
///
/// Reading a key with the wrong type yields the caller's default.
#[derive(Debug, Default, Clone)]
pub struct SettingsStore {
    values: HashMap<String, SettingValue>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.values
            .insert(key.to_string(), SettingValue::String(value.into()));
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), SettingValue::Bool(value));
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), SettingValue::Int(value));
    }

    pub fn remove(&mut self, key: &str) -> Option<SettingValue> {
        self.values.remove(key)
    }
}

impl SettingsProvider for SettingsStore {
    fn get_string(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(SettingValue::String(value)) => value.clone(),
            _ => default.to_string(),
        }
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(SettingValue::Bool(value)) => *value,
            _ => default,
        }
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(SettingValue::Int(value)) => *value,
            _ => default,
        }
    }
}
