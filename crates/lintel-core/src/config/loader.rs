//! Bounded configuration document loading and discovery
//!
//! Turns raw YAML text into immutable property trees. Input is untrusted, so
//! loading enforces hard bounds before and during parsing: a document size
//! cap and an alias-expansion cap (the billion-laughs guard). Duplicate keys
//! and unresolvable anchors are rejected by the underlying parser and wrapped
//! into one "invalid configuration" error naming the offending document.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use regex::Regex;

use super::composite::CompositeConfig;
use super::tree::TreeConfig;
use super::value::{PropertyTree, PropertyValue};
use super::ConfigHandle;
use crate::error::LintelError;
use crate::result::Result;

/// Hard cap on the size of a single configuration document.
const MAX_DOCUMENT_BYTES: usize = 100 * 1024;

/// Hard cap on alias-expanded entries in any single collection.
const MAX_ALIAS_EXPANSIONS: usize = 100;

/// The baseline configuration shipped with the tool.
const DEFAULT_CONFIG_RESOURCE: &str = include_str!("../../resources/default-config.yml");

/// File names probed during auto-discovery, in priority order.
const CONFIG_FILE_NAMES: &[&str] = &["lintel.yml", "lintel.yaml"];

/// Loader for bounded configuration documents.
pub struct DocumentLoader;

impl DocumentLoader {
    /// Parses `text` into a tree-backed Config.
    ///
    /// `name` identifies the document in error messages. An absent or empty
    /// document yields an empty Config, not an error.
    pub fn from_str(name: &str, text: &str) -> Result<ConfigHandle> {
        if text.len() > MAX_DOCUMENT_BYTES {
            return Err(oversized_document(name, text.len()));
        }

        let value: serde_yaml::Value = serde_yaml::from_str(text)
            .map_err(|e| LintelError::invalid_config(name, e.to_string()))?;
        let tree = match value {
            serde_yaml::Value::Null => PropertyTree::new(),
            serde_yaml::Value::Mapping(mapping) => tree_from_mapping(name, mapping)?,
            _ => {
                return Err(LintelError::invalid_config(
                    name,
                    "top-level structure must be a mapping",
                ));
            }
        };
        // Aliases expand during parsing; bound what they expanded into.
        if contains_alias_syntax(text) {
            checked_tree_entries(name, &tree)?;
        }
        tracing::debug!(document = name, properties = tree.len(), "loaded configuration");
        Ok(TreeConfig::handle(tree))
    }

    /// Reads a bounded document from `reader` and parses it.
    pub fn from_reader(name: &str, reader: impl Read) -> Result<ConfigHandle> {
        let mut bytes = Vec::new();
        reader
            .take(MAX_DOCUMENT_BYTES as u64 + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| LintelError::invalid_config(name, e.to_string()))?;
        // Length first: a truncated stream may end mid-character and must
        // still report the byte limit, not a UTF-8 error.
        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(oversized_document(name, bytes.len()));
        }
        let text = String::from_utf8(bytes)
            .map_err(|e| LintelError::invalid_config(name, e.to_string()))?;
        Self::from_str(name, &text)
    }

    /// Loads a configuration document from a file path.
    pub fn from_file(path: &Path) -> Result<ConfigHandle> {
        let text =
            std::fs::read_to_string(path).map_err(|e| LintelError::io_error(path, e))?;
        Self::from_str(&path.display().to_string(), &text)
    }

    /// Auto-discover a config file by traversing upward from `start_path`.
    ///
    /// Probes `lintel.yml` then `lintel.yaml` in each directory, moving up
    /// the tree until a file is found or the filesystem root is reached.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path.canonicalize().map_err(|e| {
            LintelError::precondition(format!("invalid discovery start path: {e}"))
        })?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }
            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}

/// Loads the given documents and folds them over the shipped baseline.
///
/// Later paths take precedence over earlier ones, property-by-property; the
/// baseline supplies defaults for every key no document overrides.
pub fn resolve_configuration(paths: &[PathBuf]) -> Result<ConfigHandle> {
    let mut layers = vec![default_baseline()?];
    for path in paths {
        layers.push(DocumentLoader::from_file(path)?);
    }
    Ok(CompositeConfig::layered(layers))
}

/// The packaged baseline Config, parsed once per process.
///
/// It is both the lowest-precedence layer of every resolved configuration and
/// the schema user configuration is validated against.
pub fn default_baseline() -> Result<ConfigHandle> {
    static BASELINE: OnceLock<ConfigHandle> = OnceLock::new();
    if let Some(config) = BASELINE.get() {
        return Ok(Arc::clone(config));
    }
    let config = DocumentLoader::from_str("default-config.yml", DEFAULT_CONFIG_RESOURCE)?;
    Ok(Arc::clone(BASELINE.get_or_init(|| config)))
}

fn oversized_document(name: &str, bytes: usize) -> LintelError {
    LintelError::invalid_config(
        name,
        format!("document is {bytes} bytes, exceeding the {MAX_DOCUMENT_BYTES} byte limit"),
    )
}

fn contains_alias_syntax(text: &str) -> bool {
    static ALIAS_RE: OnceLock<Regex> = OnceLock::new();
    let re = ALIAS_RE.get_or_init(|| {
        Regex::new(r"(?m)(?:^|[\s\[,{])\*[A-Za-z0-9_-]+").expect("alias pattern is valid")
    });
    re.is_match(text)
}

/// Counts the entries a mapping expanded into, recursively, erroring as soon
/// as any single collection exceeds [`MAX_ALIAS_EXPANSIONS`]. Layered anchors
/// multiply entry counts, so the check runs against the expanded tree rather
/// than the alias references in the source text.
fn checked_tree_entries(name: &str, tree: &PropertyTree) -> Result<usize> {
    let mut count = 0;
    for value in tree.values() {
        count += 1 + checked_value_entries(name, value)?;
    }
    ensure_expansion_bound(name, count)?;
    Ok(count)
}

fn checked_value_entries(name: &str, value: &PropertyValue) -> Result<usize> {
    match value {
        PropertyValue::List(items) => {
            let mut count = 0;
            for item in items {
                count += 1 + checked_value_entries(name, item)?;
            }
            ensure_expansion_bound(name, count)?;
            Ok(count)
        }
        PropertyValue::Map(tree) => checked_tree_entries(name, tree),
        _ => Ok(0),
    }
}

fn ensure_expansion_bound(name: &str, count: usize) -> Result<()> {
    if count > MAX_ALIAS_EXPANSIONS {
        return Err(LintelError::invalid_config(
            name,
            format!(
                "a collection expands to {count} entries, exceeding the {MAX_ALIAS_EXPANSIONS} entry alias expansion limit"
            ),
        ));
    }
    Ok(())
}

fn tree_from_mapping(name: &str, mapping: serde_yaml::Mapping) -> Result<PropertyTree> {
    let mut tree = PropertyTree::new();
    for (key, value) in mapping {
        let key = scalar_key(name, &key)?;
        // Null values mean "not set"; readers fall back to their defaults.
        let Some(value) = property_from_yaml(name, value)? else {
            continue;
        };
        if tree.insert(key.clone(), value).is_some() {
            return Err(LintelError::invalid_config(
                name,
                format!("duplicate key '{key}'"),
            ));
        }
    }
    Ok(tree)
}

fn scalar_key(name: &str, key: &serde_yaml::Value) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        _ => Err(LintelError::invalid_config(
            name,
            "mapping keys must be scalars",
        )),
    }
}

fn property_from_yaml(name: &str, value: serde_yaml::Value) -> Result<Option<PropertyValue>> {
    let converted = match value {
        serde_yaml::Value::Null => return Ok(None),
        serde_yaml::Value::Bool(b) => PropertyValue::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                PropertyValue::Int(i)
            } else {
                PropertyValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_yaml::Value::String(s) => PropertyValue::String(s),
        serde_yaml::Value::Sequence(items) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                if let Some(item) = property_from_yaml(name, item)? {
                    list.push(item);
                }
            }
            PropertyValue::List(list)
        }
        serde_yaml::Value::Mapping(mapping) => {
            PropertyValue::Map(tree_from_mapping(name, mapping)?)
        }
        serde_yaml::Value::Tagged(tagged) => {
            return property_from_yaml(name, tagged.value);
        }
    };
    Ok(Some(converted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfigExt};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn empty_document_yields_empty_config() {
        let config = DocumentLoader::from_str("empty.yml", "").unwrap();
        assert!(config.as_tree().unwrap().is_empty());

        let config = DocumentLoader::from_str("null.yml", "---\n").unwrap();
        assert!(config.as_tree().unwrap().is_empty());
    }

    #[test]
    fn oversized_document_is_rejected() {
        let huge = format!("key: '{}'\n", "x".repeat(MAX_DOCUMENT_BYTES));
        let err = DocumentLoader::from_str("huge.yml", &huge).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("huge.yml"));
        assert!(message.contains("byte limit"));
    }

    #[test]
    fn excessive_alias_expansion_is_rejected() {
        let mut text = String::from("anchor: &a 'value'\nlist:\n");
        for _ in 0..(MAX_ALIAS_EXPANSIONS + 1) {
            text.push_str("  - *a\n");
        }
        let err = DocumentLoader::from_str("aliases.yml", &text).unwrap_err();
        assert!(err.to_string().contains("alias expansion limit"));
    }

    #[test]
    fn layered_anchors_cannot_multiply_past_the_expansion_cap() {
        // Twenty alias references, but each tier multiplies the previous one.
        let text = "\
a: &a [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]
b: &b [*a, *a, *a, *a, *a, *a, *a, *a, *a, *a]
c: [*b, *b, *b, *b, *b, *b, *b, *b, *b, *b]
";
        let err = DocumentLoader::from_str("layered.yml", text).unwrap_err();
        assert!(err.to_string().contains("alias expansion limit"));
    }

    #[test]
    fn bounded_alias_use_is_fine() {
        let text = "anchor: &a 'value'\nlist:\n  - *a\n  - *a\n";
        let config = DocumentLoader::from_str("aliases.yml", text).unwrap();
        let values: Vec<String> = config.value_or_default("list", Vec::new()).unwrap();
        assert_eq!(values, vec!["value".to_string(), "value".to_string()]);
    }

    #[test]
    fn large_alias_free_lists_are_not_capped() {
        let mut text = String::from("list:\n");
        for i in 0..(MAX_ALIAS_EXPANSIONS * 2) {
            text.push_str(&format!("  - 'item{i}'\n"));
        }
        let config = DocumentLoader::from_str("big.yml", &text).unwrap();
        let values: Vec<String> = config.value_or_default("list", Vec::new()).unwrap();
        assert_eq!(values.len(), MAX_ALIAS_EXPANSIONS * 2);
    }

    #[test]
    fn asterisk_inside_plain_text_is_not_an_alias() {
        let config =
            DocumentLoader::from_str("prose.yml", "note: 'see *notes for details'\n").unwrap();
        let note: String = config.value_or_default("note", String::new()).unwrap();
        assert_eq!(note, "see *notes for details");
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let err =
            DocumentLoader::from_str("dup.yml", "style:\n  active: true\n  active: false\n")
                .unwrap_err();
        assert!(err.to_string().to_lowercase().contains("duplicate"));
    }

    #[test]
    fn syntax_error_names_the_document() {
        let err = DocumentLoader::from_str("broken.yml", "a:\n - b\n c: d\n").unwrap_err();
        assert!(err.to_string().contains("broken.yml"));
    }

    #[test]
    fn scalar_top_level_is_rejected() {
        let err = DocumentLoader::from_str("scalar.yml", "just a string").unwrap_err();
        assert!(err.to_string().contains("must be a mapping"));
    }

    #[test]
    fn null_values_read_as_absent() {
        let config = DocumentLoader::from_str("nulls.yml", "style:\n  threshold: ~\n").unwrap();
        let style = config.sub_config("style");
        assert_eq!(style.value_or_null::<i64>("threshold").unwrap(), None);
        assert_eq!(style.value_or_default("threshold", 9i64).unwrap(), 9);
    }

    #[test]
    fn from_reader_matches_from_str() {
        let yaml = "style:\n  active: true\n";
        let from_reader = DocumentLoader::from_reader("doc.yml", yaml.as_bytes()).unwrap();
        let from_str = DocumentLoader::from_str("doc.yml", yaml).unwrap();
        assert_eq!(
            from_reader
                .sub_config("style")
                .value_or_default("active", false)
                .unwrap(),
            from_str
                .sub_config("style")
                .value_or_default("active", false)
                .unwrap()
        );
    }

    #[test]
    fn oversized_reader_reports_the_byte_limit() {
        // Two-byte characters ensure the read cutoff lands mid-character.
        let text = format!("key: '{}'\n", "é".repeat(MAX_DOCUMENT_BYTES / 2));
        let err = DocumentLoader::from_reader("stream.yml", text.as_bytes()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("stream.yml"));
        assert!(message.contains("byte limit"), "{message}");
    }

    #[test]
    fn auto_discover_walks_up_the_directory_tree() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp_dir.path().join("lintel.yml"), "style:\n  active: true\n").unwrap();

        let found = DocumentLoader::auto_discover(&nested).unwrap().unwrap();
        assert!(found.ends_with("lintel.yml"));
    }

    #[test]
    fn resolve_configuration_layers_files_over_the_baseline() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lintel.yml");
        fs::write(&path, "style:\n  MaxLineLength:\n    maxLineLength: 80\n").unwrap();

        let config = resolve_configuration(&[path]).unwrap();
        let rule = config.sub_config("style").sub_config("MaxLineLength");
        assert_eq!(rule.value_or_default("maxLineLength", -1i64).unwrap(), 80);
        // Baseline still supplies defaults the file does not override.
        assert!(rule.value_or_default("active", false).unwrap());
    }

    #[test]
    fn default_baseline_is_non_empty() {
        let baseline = default_baseline().unwrap();
        assert!(!baseline.as_tree().unwrap().is_empty());
        assert!(baseline.sub_config_keys().contains("style"));
    }
}
