//! Overlay Configs forcing specific key resolutions
//!
//! Two independent wrappers, each delegating everything except one reserved
//! key: [`AllRulesConfig`] presents an "every rule enabled unless deprecated"
//! view independent of the baseline's stated defaults, and
//! [`CheckOnlyConfig`] forces a check-only mode in which no rule may rewrite
//! files regardless of what any layered configuration requests.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexSet;

use super::validation::{Notification, ValidationSettings};
use super::value::{PropertyTree, PropertyValue};
use super::{Config, ConfigHandle, dotted_path};

/// Reserved key gating whether a rule runs at all.
pub const ACTIVE_KEY: &str = "active";

/// Reserved key gating whether a rule may rewrite files.
pub const AUTO_CORRECT_KEY: &str = "autoCorrect";

/// A view in which every rule is active unless its path is deprecated.
///
/// For the `active` key: a Config whose own path matches one of the
/// deprecated identifiers always resolves to `false`; otherwise the wrapped
/// value applies, defaulting to `true` when absent (not to the caller's
/// supplied default). Every other key delegates unchanged.
#[derive(Debug, Clone)]
pub struct AllRulesConfig {
    wrapped: ConfigHandle,
    deprecated: Arc<HashSet<String>>,
}

impl AllRulesConfig {
    /// `deprecated` holds dotted rule paths such as `"style>WildcardImport"`.
    pub fn new(wrapped: ConfigHandle, deprecated: HashSet<String>) -> Self {
        Self {
            wrapped,
            deprecated: Arc::new(deprecated),
        }
    }

    pub fn handle(wrapped: ConfigHandle, deprecated: HashSet<String>) -> ConfigHandle {
        Arc::new(Self::new(wrapped, deprecated))
    }

    fn is_deprecated(&self) -> bool {
        self.deprecated.contains(&dotted_path(self.wrapped.path()))
    }
}

impl Config for AllRulesConfig {
    fn sub_config(&self, key: &str) -> ConfigHandle {
        Arc::new(Self {
            wrapped: self.wrapped.sub_config(key),
            deprecated: Arc::clone(&self.deprecated),
        })
    }

    fn sub_config_keys(&self) -> IndexSet<String> {
        self.wrapped.sub_config_keys()
    }

    fn path(&self) -> &[String] {
        self.wrapped.path()
    }

    fn raw_value(&self, key: &str) -> Option<PropertyValue> {
        if key != ACTIVE_KEY {
            return self.wrapped.raw_value(key);
        }
        if self.is_deprecated() {
            return Some(PropertyValue::Bool(false));
        }
        self.wrapped
            .raw_value(ACTIVE_KEY)
            .or(Some(PropertyValue::Bool(true)))
    }

    fn validate(
        &self,
        baseline: &PropertyTree,
        settings: &ValidationSettings,
    ) -> Vec<Notification> {
        self.wrapped.validate(baseline, settings)
    }
}

/// A view in which no rule is ever permitted to auto-correct.
///
/// The `autoCorrect` key always resolves to `false`, ignoring the wrapped
/// value and the caller's default entirely; every other key delegates
/// unchanged. The wrapper survives navigation so the key is forced at every
/// nesting level.
#[derive(Debug, Clone)]
pub struct CheckOnlyConfig {
    wrapped: ConfigHandle,
}

impl CheckOnlyConfig {
    pub fn new(wrapped: ConfigHandle) -> Self {
        Self { wrapped }
    }

    pub fn handle(wrapped: ConfigHandle) -> ConfigHandle {
        Arc::new(Self::new(wrapped))
    }
}

impl Config for CheckOnlyConfig {
    fn sub_config(&self, key: &str) -> ConfigHandle {
        Arc::new(Self {
            wrapped: self.wrapped.sub_config(key),
        })
    }

    fn sub_config_keys(&self) -> IndexSet<String> {
        self.wrapped.sub_config_keys()
    }

    fn path(&self) -> &[String] {
        self.wrapped.path()
    }

    fn raw_value(&self, key: &str) -> Option<PropertyValue> {
        if key == AUTO_CORRECT_KEY {
            return Some(PropertyValue::Bool(false));
        }
        self.wrapped.raw_value(key)
    }

    fn validate(
        &self,
        baseline: &PropertyTree,
        settings: &ValidationSettings,
    ) -> Vec<Notification> {
        self.wrapped.validate(baseline, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigExt;
    use crate::config::loader::DocumentLoader;

    fn config(yaml: &str) -> ConfigHandle {
        DocumentLoader::from_str("test.yml", yaml).unwrap()
    }

    fn deprecated(paths: &[&str]) -> HashSet<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn deprecated_rule_is_forced_inactive() {
        let wrapped = config("style:\n  WildcardImport:\n    active: true\n");
        let all = AllRulesConfig::handle(wrapped, deprecated(&["style>WildcardImport"]));

        let rule = all.sub_config("style").sub_config("WildcardImport");
        assert!(!rule.value_or_default(ACTIVE_KEY, true).unwrap());
        // Even an explicit caller default of false cannot resurrect it.
        assert!(!rule.value_or_default(ACTIVE_KEY, false).unwrap());
    }

    #[test]
    fn absent_activation_defaults_to_true() {
        let wrapped = config("style:\n  MagicNumber:\n    threshold: 3\n");
        let all = AllRulesConfig::handle(wrapped, HashSet::new());

        let rule = all.sub_config("style").sub_config("MagicNumber");
        // The view defaults to true even when the caller supplies false.
        assert!(rule.value_or_default(ACTIVE_KEY, false).unwrap());
        assert_eq!(rule.value_or_null::<bool>(ACTIVE_KEY).unwrap(), Some(true));
    }

    #[test]
    fn explicit_deactivation_survives_when_not_deprecated() {
        let wrapped = config("style:\n  MagicNumber:\n    active: false\n");
        let all = AllRulesConfig::handle(wrapped, HashSet::new());

        let rule = all.sub_config("style").sub_config("MagicNumber");
        assert!(!rule.value_or_default(ACTIVE_KEY, true).unwrap());
    }

    #[test]
    fn other_keys_delegate_with_caller_defaults() {
        let wrapped = config("style:\n  MagicNumber:\n    threshold: 3\n");
        let all = AllRulesConfig::handle(wrapped, HashSet::new());

        let rule = all.sub_config("style").sub_config("MagicNumber");
        assert_eq!(rule.value_or_default("threshold", -1i64).unwrap(), 3);
        assert_eq!(rule.value_or_default("allowedLines", 60i64).unwrap(), 60);
    }

    #[test]
    fn auto_correct_is_forced_off_at_every_level() {
        let wrapped = config(
            "autoCorrect: true\nstyle:\n  MagicNumber:\n    autoCorrect: true\n    threshold: 3\n",
        );
        let check_only = CheckOnlyConfig::handle(wrapped);

        assert!(!check_only.value_or_default(AUTO_CORRECT_KEY, true).unwrap());
        let rule = check_only.sub_config("style").sub_config("MagicNumber");
        assert!(!rule.value_or_default(AUTO_CORRECT_KEY, true).unwrap());
        // A key with a non-default stored value passes through unchanged.
        assert_eq!(rule.value_or_default("threshold", -1i64).unwrap(), 3);
    }
}
