//! ---
//! emu_section: "02-versioned-store"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Versioned key-value store primitive and standalone service dispatch."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use relay_emu_common::QueryError;
use serde_json::{json, Value};

/// Errors surfaced by the store and its standalone service dispatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KvsError {
    /// The request path names an operation the service does not offer.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// `get` on a key that is not present.
    #[error("key not found: {0}")]
    KeyNotFound(String),
    #[error("missing required argument '{0}'")]
    MissingArgument(&'static str),
    #[error("malformed query: {0}")]
    MalformedQuery(#[from] QueryError),
}

impl KvsError {
    /// JSON body describing the error.
    pub fn to_body(&self) -> Value {
        json!({ "error": self.to_string() })
    }

    pub fn label(&self) -> &'static str {
        match self {
            KvsError::InvalidOperation(_) => "invalid_operation",
            KvsError::KeyNotFound(_) => "key_not_found",
            KvsError::MissingArgument(_) => "missing_argument",
            KvsError::MalformedQuery(_) => "malformed_query",
        }
    }
}
