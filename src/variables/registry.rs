use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Named values written by special fields and read by rules.
///
/// One registry belongs to one editing or preview session and is passed by
/// reference into every evaluation. Entries stay until they are deleted or the
/// registry is cleared, even when the field that wrote them is gone. The last
/// write to a name wins.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableRegistry {
    entries: IndexMap<String, Value>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        debug!(variable = %name, value = %value, "variable written");
        self.entries.insert(name, value);
    }

    /// Writes several entries in iteration order.
    pub fn set_many<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in entries {
            self.set(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// A snapshot of every entry, in first-write order.
    pub fn get_all(&self) -> IndexMap<String, Value> {
        self.entries.clone()
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Removes an entry, returning its last value.
    pub fn delete(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
