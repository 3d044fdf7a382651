// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Field redaction on decoded values.
//!
//! Redaction is shallow: only the keys of the object handed to [`redact`] are
//! inspected. Nested objects keep their fields.

use serde_json::Value;

/// Field names removed from dumped values, compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactionSet {
    names: Vec<String>,
}

impl RedactionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name. Duplicates (ignoring case) are collapsed.
    pub fn insert(&mut self, name: impl AsRef<str>) {
        let lowered = name.as_ref().to_lowercase();
        if !self.names.contains(&lowered) {
            self.names.push(lowered);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        let lowered = key.to_lowercase();
        self.names.iter().any(|n| *n == lowered)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for RedactionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl<S: AsRef<str>> Extend<S> for RedactionSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name);
        }
    }
}

/// Remove every key of a top-level object that matches a name in `names`.
///
/// Non-object values are returned untouched. The object is modified in place
/// and handed back, so callers must not expect the input to survive.
pub fn redact(value: Value, names: &RedactionSet) -> Value {
    match value {
        Value::Object(mut map) => {
            if !names.is_empty() {
                map.retain(|key, _| !names.contains(key));
            }
            Value::Object(map)
        }
        other => other,
    }
}
