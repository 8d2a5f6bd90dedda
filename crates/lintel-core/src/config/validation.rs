//! Schema validation of user configuration against the baseline
//!
//! Walks a user Config against the shipped baseline tree and reports every
//! misspelled, deprecated, or structurally mismatched property in a single
//! pass, so one run surfaces every problem. Findings are [`Notification`]s;
//! deciding pass/fail is left to [`check_configuration`].

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::value::{PropertyTree, PropertyValue};
use super::{Config, ConfigExt, ConfigHandle};
use crate::error::LintelError;
use crate::result::Result;

/// Migration messages for removed or renamed properties, keyed by a regex
/// over the dotted property path. First match wins.
const DEPRECATIONS_RESOURCE: &str = include_str!("../../resources/deprecations.properties");

/// Properties that are never validated against the baseline because rules
/// define them freely, at one or two levels of nesting.
const DEFAULT_PROPERTY_EXCLUDES: &[&str] = &[
    ".*>excludes",
    ".*>includes",
    ".*>active",
    ".*>autoCorrect",
    ".*>severity",
    ".*>.*>excludes",
    ".*>.*>includes",
    ".*>.*>active",
    ".*>.*>autoCorrect",
    ".*>.*>severity",
    ".*>.*>ignoreAnnotated",
    ".*>.*>ignoreFunction",
    "build>weights.*",
];

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Level {
    Warning,
    Error,
}

/// A single validation finding. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub level: Level,
}

impl Notification {
    fn new(message: String, level: Level) -> Self {
        Self { message, level }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

/// Caller-controlled knobs for one validation pass.
#[derive(Debug)]
pub struct ValidationSettings {
    excludes: Vec<Regex>,
    pub warnings_as_errors: bool,
}

impl ValidationSettings {
    /// Settings from explicit exclude regexes, merged with the built-in
    /// default excludes.
    pub fn new(excludes: Vec<Regex>, warnings_as_errors: bool) -> Result<Self> {
        let mut patterns = Vec::with_capacity(DEFAULT_PROPERTY_EXCLUDES.len() + excludes.len());
        for pattern in DEFAULT_PROPERTY_EXCLUDES {
            patterns.push(Regex::new(pattern).map_err(|e| {
                LintelError::precondition(format!("invalid default exclude pattern: {e}"))
            })?);
        }
        patterns.extend(excludes);
        Ok(Self {
            excludes: patterns,
            warnings_as_errors,
        })
    }

    /// Settings read from the `config` sub-tree of a resolved Config:
    /// `excludes` (comma-separated glob-ish fragments) and `warningsAsErrors`.
    pub fn from_config(config: &dyn Config) -> Result<Self> {
        let sub = config.sub_config("config");
        let fragments: Vec<String> = sub.value_or_default("excludes", Vec::new())?;
        let warnings_as_errors = sub.value_or_default("warningsAsErrors", false)?;
        let excludes = fragments
            .iter()
            .map(|fragment| glob_fragment_to_regex(fragment))
            .collect();
        Self::new(excludes, warnings_as_errors)
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.excludes.iter().any(|pattern| pattern.is_match(path))
    }

    fn report_level(&self) -> Level {
        if self.warnings_as_errors {
            Level::Error
        } else {
            Level::Warning
        }
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self::new(Vec::new(), false).expect("default excludes compile")
    }
}

/// Converts a user-supplied glob-ish fragment into a path regex.
///
/// `*` becomes `.*`; everything else matches literally, so the conversion
/// itself cannot fail.
fn glob_fragment_to_regex(fragment: &str) -> Regex {
    let mut pattern = String::with_capacity(fragment.len() + 8);
    for ch in fragment.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            c if regex_syntax_char(c) => {
                pattern.push('\\');
                pattern.push(c);
            }
            c => pattern.push(c),
        }
    }
    Regex::new(&pattern).expect("escaped fragment is a valid regex")
}

fn regex_syntax_char(c: char) -> bool {
    matches!(
        c,
        '\\' | '.' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|'
    )
}

fn deprecations() -> &'static [(Regex, String)] {
    static TABLE: OnceLock<Vec<(Regex, String)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = Vec::new();
        for line in DEPRECATIONS_RESOURCE.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((pattern, message)) = line.split_once('=') else {
                tracing::warn!("skipping malformed deprecation entry: {line}");
                continue;
            };
            match Regex::new(pattern.trim()) {
                Ok(regex) => table.push((regex, message.trim().to_string())),
                Err(e) => tracing::warn!("skipping invalid deprecation pattern '{pattern}': {e}"),
            }
        }
        table
    })
}

fn deprecation_message(path: &str) -> Option<&'static str> {
    deprecations()
        .iter()
        .find(|(pattern, _)| pattern.is_match(path))
        .map(|(_, message)| message.as_str())
}

/// Validates `user` against `baseline`, returning every finding in order.
///
/// Fails fast (not with notifications) when the baseline is empty or not
/// tree-backed; that is a setup error of the tool itself. An empty user
/// Config validates cleanly. Non-tree-backed user variants delegate to each
/// wrapped side and concatenate the findings.
pub fn validate(
    user: &dyn Config,
    baseline: &dyn Config,
    settings: &ValidationSettings,
) -> Result<Vec<Notification>> {
    let base = baseline.as_tree().ok_or_else(|| {
        LintelError::precondition("baseline configuration must be tree-backed")
    })?;
    if base.is_empty() {
        return Err(LintelError::precondition(
            "baseline configuration must not be empty",
        ));
    }
    if let Some(tree) = user.as_tree() {
        if tree.is_empty() {
            return Ok(Vec::new());
        }
    }
    Ok(user.validate(base, settings))
}

/// One recursion step over two sibling property trees.
///
/// `parent` is the already-joined dotted path of the trees being compared;
/// root keys are unqualified. Findings are collected without
/// short-circuiting.
pub(crate) fn walk(
    current: &PropertyTree,
    base: &PropertyTree,
    parent: &str,
    settings: &ValidationSettings,
    out: &mut Vec<Notification>,
) {
    for (key, current_value) in current {
        let path = if parent.is_empty() {
            key.clone()
        } else {
            format!("{parent}>{key}")
        };

        if let Some(message) = deprecation_message(&path) {
            out.push(Notification::new(
                format!("Property '{path}' is deprecated. {message}"),
                settings.report_level(),
            ));
            continue;
        }
        if settings.is_excluded(&path) {
            continue;
        }

        let Some(base_value) = base.get(key) else {
            // Always a warning, independent of warningsAsErrors.
            out.push(Notification::new(
                format!("Property '{path}' is misspelled or does not exist."),
                Level::Warning,
            ));
            continue;
        };

        if current_value.is_string() && base_value.is_list() {
            out.push(Notification::new(
                format!(
                    "Property '{path}' should be a YAML array instead of a comma-separated string."
                ),
                settings.report_level(),
            ));
        }

        match (current_value.as_map(), base_value.as_map()) {
            (Some(current_nested), Some(base_nested)) => {
                walk(current_nested, base_nested, &path, settings, out);
            }
            (None, Some(_)) => {
                out.push(Notification::new(
                    format!("Nested configuration expected for property '{path}'."),
                    settings.report_level(),
                ));
            }
            (Some(_), None) => {
                out.push(Notification::new(
                    format!("Unexpected nested configuration for property '{path}'."),
                    settings.report_level(),
                ));
            }
            (None, None) => {}
        }
    }
}

/// The caller-facing validation gate.
///
/// Honors the `config > validation` toggle, logs every finding, and fails
/// when any Error-level findings exist. This is the only control-flow effect
/// validation has on a run.
pub fn check_configuration(user: &ConfigHandle, baseline: &ConfigHandle) -> Result<()> {
    let gate = user.sub_config("config");
    if !gate.value_or_default("validation", true)? {
        tracing::debug!("configuration validation disabled");
        return Ok(());
    }

    let settings = ValidationSettings::from_config(user.as_ref())?;
    let notifications = validate(user.as_ref(), baseline.as_ref(), &settings)?;

    let mut errors = 0usize;
    for notification in &notifications {
        match notification.level {
            Level::Error => {
                errors += 1;
                tracing::error!("{}", notification.message);
            }
            Level::Warning => tracing::warn!("{}", notification.message),
        }
    }

    if errors > 0 {
        Err(LintelError::InvalidConfigProperties { count: errors })
    } else {
        Ok(())
    }
}
