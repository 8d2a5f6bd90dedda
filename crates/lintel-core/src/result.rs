//! Result type alias for configuration operations

use crate::error::LintelError;

/// Standard Result type for configuration operations
pub type Result<T> = std::result::Result<T, LintelError>;
