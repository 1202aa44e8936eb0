//! Pluggable implementation registries.
//!
//! Inputs, behaviors, panes and validators are all registered by name and
//! resolved through a capability trait — an explicit map owned by whoever
//! needs one, not an ambient global. The store itself owns a
//! [`Validator`] registry; the widget layers own their own instances of
//! [`Registry`] for inputs and panes.

use crate::state::{Issue, IssueLevel, State};
use std::collections::HashMap;
use std::sync::Arc;

/// Name → implementation map, polymorphic over a capability trait
pub struct Registry<T: ?Sized> {
    entries: HashMap<String, Arc<T>>,
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T: ?Sized> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last registration wins, matching last-write-wins everywhere else in
    /// the ui layer
    pub fn register(&mut self, name: impl Into<String>, implementation: Arc<T>) {
        self.entries.insert(name.into(), implementation);
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<T>> {
        self.entries.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<T>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A validation rule run against the whole state tree after form edits
pub trait Validator: Send + Sync {
    fn validate(&self, state: &State) -> Vec<Issue>;
}

/// Run every registered validator, partitioning issues by level
pub fn run_validators(registry: &Registry<dyn Validator>, state: &State) -> (Vec<Issue>, Vec<Issue>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for (_, validator) in registry.iter() {
        for issue in validator.validate(state) {
            match issue.level {
                IssueLevel::Error => errors.push(issue),
                IssueLevel::Warning => warnings.push(issue),
            }
        }
    }
    (errors, warnings)
}
