//! Composite Config: layering two Configs with first-wins precedence
//!
//! Supports combining independently maintained configuration documents (a
//! team-wide baseline plus a project override) where each property is
//! overridden individually rather than whole-document, and the override
//! relationship holds at arbitrarily deep nesting.

use std::sync::Arc;

use indexmap::IndexSet;

use super::tree::TreeConfig;
use super::validation::{Notification, ValidationSettings};
use super::value::{PropertyTree, PropertyValue};
use super::{Config, ConfigHandle};

/// A Config delegating to `first` when it has any non-absent value for a key,
/// else to `second`. The rule applies at every nesting level independently,
/// never picking one side wholesale.
#[derive(Debug, Clone)]
pub struct CompositeConfig {
    first: ConfigHandle,
    second: ConfigHandle,
}

impl CompositeConfig {
    pub fn new(first: ConfigHandle, second: ConfigHandle) -> Self {
        Self { first, second }
    }

    pub fn handle(first: ConfigHandle, second: ConfigHandle) -> ConfigHandle {
        Arc::new(Self::new(first, second))
    }

    /// Folds documents left-to-right into one layered Config.
    ///
    /// Each new document becomes the `first` side of a composite wrapping the
    /// accumulated result, so the most recently folded document has the
    /// highest precedence, applied property-by-property.
    pub fn layered(documents: impl IntoIterator<Item = ConfigHandle>) -> ConfigHandle {
        let mut iter = documents.into_iter();
        let Some(mut accumulated) = iter.next() else {
            return Arc::new(TreeConfig::empty());
        };
        for document in iter {
            accumulated = Self::handle(document, accumulated);
        }
        accumulated
    }
}

impl Config for CompositeConfig {
    fn sub_config(&self, key: &str) -> ConfigHandle {
        Self::handle(self.first.sub_config(key), self.second.sub_config(key))
    }

    fn sub_config_keys(&self) -> IndexSet<String> {
        let mut keys = self.first.sub_config_keys();
        keys.extend(self.second.sub_config_keys());
        keys
    }

    fn path(&self) -> &[String] {
        // Both sides were navigated with the same keys.
        self.first.path()
    }

    fn raw_value(&self, key: &str) -> Option<PropertyValue> {
        self.first
            .raw_value(key)
            .or_else(|| self.second.raw_value(key))
    }

    fn validate(
        &self,
        baseline: &PropertyTree,
        settings: &ValidationSettings,
    ) -> Vec<Notification> {
        let mut notifications = self.first.validate(baseline, settings);
        notifications.extend(self.second.validate(baseline, settings));
        notifications
    }
}
