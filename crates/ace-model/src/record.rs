//! Flat string records decoded from sheet rows.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How a single field write treats absent and present fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldUpdate {
    /// Insert the field when the record does not hold it yet.
    pub create: bool,
    /// Replace the value when the record already holds the field.
    pub overwrite: bool,
}

impl FieldUpdate {
    /// Create or overwrite.
    pub const UPSERT: Self = Self {
        create: true,
        overwrite: true,
    };
    /// Only fill fields that are missing.
    pub const CREATE_ONLY: Self = Self {
        create: true,
        overwrite: false,
    };
    /// Only replace fields that already exist.
    pub const OVERWRITE_ONLY: Self = Self {
        create: false,
        overwrite: true,
    };
}

/// An ordered mapping from standardized variable name to value.
///
/// Field order is insertion order, which for decoded rows is column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from `(name, value)` pairs, later pairs overwriting earlier ones.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (name, value) in pairs {
            record.set(name, value);
        }
        record
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Returns the value of `name`, or `default` when the field is absent.
    pub fn value_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Writes one field according to `mode`.
    ///
    /// Returns `true` when the record changed.
    pub fn update(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        mode: FieldUpdate,
    ) -> bool {
        let name = name.into();
        let value = value.into();
        match self.fields.get_mut(&name) {
            Some(existing) if mode.overwrite => {
                if *existing == value {
                    return false;
                }
                *existing = value;
                true
            }
            Some(_) => false,
            None if mode.create => {
                self.fields.insert(name, value);
                true
            }
            None => false,
        }
    }

    /// Create-or-overwrite shorthand.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.update(name, value, FieldUpdate::UPSERT);
    }

    /// Upserts every field of `other` into `self`, in `other`'s order.
    pub fn merge_from(&mut self, other: &Record) {
        self.merge_replacing(other);
    }

    /// Like [`Record::merge_from`], returning how many fields already held
    /// a different value and were replaced.
    pub fn merge_replacing(&mut self, other: &Record) -> usize {
        let mut replaced = 0;
        for (name, value) in other.iter() {
            let present = self.contains(name);
            if self.update(name, value, FieldUpdate::UPSERT) && present {
                replaced += 1;
            }
        }
        replaced
    }

    /// Copies the value of `from` into `to` when `from` is present.
    pub fn alias(&mut self, from: &str, to: &str) -> bool {
        match self.get(from).map(str::to_string) {
            Some(value) => {
                self.set(to, value);
                true
            }
            None => false,
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
