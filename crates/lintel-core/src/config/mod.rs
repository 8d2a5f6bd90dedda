//! Configuration resolution and schema validation for lintel
//!
//! This module is the correctness backbone of the analyzer: every rule's
//! behavior (active/inactive, thresholds, exclusions, auto-fix permission) is
//! mediated through it. It provides:
//!
//! - A bounded YAML [`DocumentLoader`] turning raw text into immutable
//!   property trees
//! - The [`Config`] capability: path-aware navigation and typed value
//!   coercion over a property tree
//! - [`CompositeConfig`] for layering override documents with first-wins
//!   precedence at every nesting level
//! - [`AllRulesConfig`] / [`CheckOnlyConfig`] overlays forcing rule
//!   activation and auto-correction behavior
//! - Schema validation of user configuration against the shipped baseline,
//!   producing ordered [`Notification`]s
//!
//! ## Layering
//!
//! Documents are folded left-to-right; the most recently folded document has
//! the highest precedence, applied property-by-property:
//!
//! ```text
//! baseline  <-  team.yml  <-  project.yml
//! ```
//!
//! Every Config variant is immutable after construction, so the resolved
//! graph can be read concurrently from many rule-execution threads without
//! locking.

mod composite;
mod loader;
mod overlays;
mod policy;
mod tree;
mod validation;
pub mod value;

use std::fmt;
use std::sync::Arc;

use crate::result::Result;
use indexmap::IndexSet;

// Re-export main types
pub use composite::CompositeConfig;
pub use loader::{DocumentLoader, default_baseline, resolve_configuration};
pub use overlays::{ACTIVE_KEY, AUTO_CORRECT_KEY, AllRulesConfig, CheckOnlyConfig};
pub use policy::{FailurePolicy, IssueSeverity, IssueSummary, MaxIssuePolicy};
pub use tree::TreeConfig;
pub use validation::{
    Level, Notification, ValidationSettings, check_configuration, validate,
};
pub use value::{ConfigValue, PropertyTree, PropertyValue, ValueShape, ValueWithReason};

/// Shared, immutable handle to any Config variant.
pub type ConfigHandle = Arc<dyn Config>;

/// Separator used when matching dotted paths against patterns.
pub const PATH_SEPARATOR: &str = ">";

/// A navigable, queryable capability over hierarchical key/value settings.
///
/// The four variants (tree-backed, composite, and the two overlays) implement
/// this one interface compositionally, each holding handles to the Config(s)
/// it wraps. Typed reads live on [`ConfigExt`] so that this trait stays
/// object-safe.
pub trait Config: fmt::Debug + Send + Sync {
    /// Child Config scoped to `key`, with the path extended by `key`.
    ///
    /// Never errors; an absent key yields an empty child.
    fn sub_config(&self, key: &str) -> ConfigHandle;

    /// The set of immediate nested-mapping keys, in document order.
    fn sub_config_keys(&self) -> IndexSet<String>;

    /// Every key traversed from the configuration root to this Config.
    fn path(&self) -> &[String];

    /// The raw stored value for `key`, before any coercion.
    ///
    /// `None` means genuinely absent. This is the single resolution hook the
    /// variants override: composites pick the first non-absent side, overlays
    /// force their reserved keys here.
    fn raw_value(&self, key: &str) -> Option<PropertyValue>;

    /// Structural access to the backing property tree.
    ///
    /// Only tree-backed Configs expose it; every other variant returns `None`
    /// and must delegate validation to its wrapped Config(s).
    fn as_tree(&self) -> Option<&PropertyTree> {
        None
    }

    /// Walk this Config against the baseline tree, collecting findings.
    ///
    /// Callers go through [`validate`], which checks the preconditions first.
    fn validate(&self, baseline: &PropertyTree, settings: &ValidationSettings)
    -> Vec<Notification>;
}

/// Typed value access over any [`Config`].
pub trait ConfigExt {
    /// The coerced value at `key`, or `default` when the key is absent.
    ///
    /// The coercion target is the type of `default`; an incompatible stored
    /// value fails with an error naming the full dotted path and the literal
    /// offending value. Errors surface lazily, at the point a key is actually
    /// read.
    fn value_or_default<T: ConfigValue>(&self, key: &str, default: T) -> Result<T>;

    /// The coerced value at `key`, or `None` when the key is absent.
    ///
    /// Never fails for a genuinely absent key; coercion semantics match
    /// [`ConfigExt::value_or_default`].
    fn value_or_null<T: ConfigValue>(&self, key: &str) -> Result<Option<T>>;
}

impl<C: Config + ?Sized> ConfigExt for C {
    fn value_or_default<T: ConfigValue>(&self, key: &str, default: T) -> Result<T> {
        match self.raw_value(key) {
            Some(raw) => T::coerce(&raw, &display_path(self.path(), key)),
            None => Ok(default),
        }
    }

    fn value_or_null<T: ConfigValue>(&self, key: &str) -> Result<Option<T>> {
        match self.raw_value(key) {
            Some(raw) => T::coerce(&raw, &display_path(self.path(), key)).map(Some),
            None => Ok(None),
        }
    }
}

/// Joins path segments with `">"` for pattern matching.
pub(crate) fn dotted_path(segments: &[String]) -> String {
    segments.join(PATH_SEPARATOR)
}

/// Joins path segments plus a final key with `" > "` for diagnostics.
pub(crate) fn display_path(segments: &[String], key: &str) -> String {
    let mut parts: Vec<&str> = segments.iter().map(String::as_str).collect();
    parts.push(key);
    parts.join(" > ")
}

/// Extends a path by one segment, allocating a fresh vector.
pub(crate) fn child_path(segments: &[String], key: &str) -> Vec<String> {
    let mut path = segments.to_vec();
    path.push(key.to_string());
    path
}
