//! Tree-backed Config: resolution directly against a property tree

use std::sync::Arc;

use indexmap::IndexSet;

use super::validation::{self, Notification, ValidationSettings};
use super::value::{PropertyTree, PropertyValue};
use super::{Config, ConfigHandle, child_path};

/// A Config resolving directly against an immutable [`PropertyTree`].
///
/// This is the only variant exposing its raw tree for structural validation;
/// all wrapper variants delegate to the trees at their leaves.
#[derive(Debug, Clone)]
pub struct TreeConfig {
    path: Vec<String>,
    tree: PropertyTree,
}

impl TreeConfig {
    /// A root Config over `tree`.
    pub fn new(tree: PropertyTree) -> Self {
        Self {
            path: Vec::new(),
            tree,
        }
    }

    /// A root Config with no properties.
    pub fn empty() -> Self {
        Self::new(PropertyTree::new())
    }

    /// Shared-handle constructor, the form most callers want.
    pub fn handle(tree: PropertyTree) -> ConfigHandle {
        Arc::new(Self::new(tree))
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    fn child(&self, key: &str) -> Self {
        let tree = match self.tree.get(key) {
            Some(PropertyValue::Map(nested)) => nested.clone(),
            _ => PropertyTree::new(),
        };
        Self {
            path: child_path(&self.path, key),
            tree,
        }
    }
}

impl Config for TreeConfig {
    fn sub_config(&self, key: &str) -> ConfigHandle {
        Arc::new(self.child(key))
    }

    fn sub_config_keys(&self) -> IndexSet<String> {
        self.tree
            .iter()
            .filter(|(_, value)| value.as_map().is_some())
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn path(&self) -> &[String] {
        &self.path
    }

    fn raw_value(&self, key: &str) -> Option<PropertyValue> {
        self.tree.get(key).cloned()
    }

    fn as_tree(&self) -> Option<&PropertyTree> {
        Some(&self.tree)
    }

    fn validate(
        &self,
        baseline: &PropertyTree,
        settings: &ValidationSettings,
    ) -> Vec<Notification> {
        let mut notifications = Vec::new();
        validation::walk(&self.tree, baseline, "", settings, &mut notifications);
        notifications
    }
}
