//! Field-keyed validation outcome.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::FieldId;

/// Mapping from field identifier to violation message.
///
/// An empty result means the draft can be submitted. Iteration order follows
/// [`FieldId`] ordering, so rendering is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationResult {
    violations: BTreeMap<FieldId, String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn get(&self, field: FieldId) -> Option<&str> {
        self.violations.get(&field).map(String::as_str)
    }

    /// Look up a violation by its stable string identifier
    pub fn get_key(&self, key: &str) -> Option<&str> {
        key.parse::<FieldId>().ok().and_then(|field| self.get(field))
    }

    pub fn contains(&self, field: FieldId) -> bool {
        self.violations.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.violations.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &str)> {
        self.violations.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// The first violation recorded for a field wins
    pub(crate) fn insert(&mut self, field: FieldId, message: impl Into<String>) {
        self.violations.entry(field).or_insert_with(|| message.into());
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&rendered)
    }
}
