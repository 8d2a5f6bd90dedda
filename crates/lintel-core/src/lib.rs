//! Lintel Core
//!
//! Configuration resolution and schema-validation engine for the Lintel
//! static analyzer. This crate composes a shipped baseline, user-supplied
//! override documents, and programmatic overlays into a single queryable
//! configuration view, coerces individual values with precise error
//! reporting, and validates user configuration against the baseline schema
//! before the costly analysis phase begins.

pub mod config;
pub mod error;
pub mod result;

// Re-export commonly used types
pub use config::{
    ACTIVE_KEY, AUTO_CORRECT_KEY, AllRulesConfig, CheckOnlyConfig, CompositeConfig, Config,
    ConfigExt, ConfigHandle, ConfigValue, DocumentLoader, FailurePolicy, IssueSeverity,
    IssueSummary, Level, MaxIssuePolicy, Notification, PropertyTree, PropertyValue, TreeConfig,
    ValidationSettings, ValueShape, ValueWithReason, check_configuration, default_baseline,
    resolve_configuration, validate,
};
pub use error::{ErrorKind, LintelError};
pub use result::Result;

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lintel=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
