//! Error types for memograph operations.
//!
//! Every fallible operation returns [`MemographResult`]. Structured variants
//! carry an [`ErrorCode`] so callers (the MCP shim in particular) can map
//! failures without matching on message text.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for memograph operations.
pub type MemographResult<T> = Result<T, MemographError>;

/// Main error type for all memograph operations.
#[derive(Error, Debug)]
pub enum MemographError {
    /// Could not reach or authenticate to the backing graph store.
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
        suggestion: Option<String>,
    },

    /// Graph store query failed.
    #[error("Graph store error: {message}")]
    GraphStore {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Begin, commit or rollback of a unit of work failed.
    #[error("Transaction error: {message}")]
    Transaction {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedded database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider not supported (or not compiled in).
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider { provider: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValInvalidRelationType,

    // Graph (GRP_xxx)
    GrpConnectionFailed,
    GrpOperationFailed,
    GrpAuthFailed,

    // Transaction (TXN_xxx)
    TxnBeginFailed,
    TxnCommitFailed,
    TxnRollbackFailed,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValInvalidRelationType => "VAL_002",
            ErrorCode::GrpConnectionFailed => "GRP_001",
            ErrorCode::GrpOperationFailed => "GRP_002",
            ErrorCode::GrpAuthFailed => "GRP_003",
            ErrorCode::TxnBeginFailed => "TXN_001",
            ErrorCode::TxnCommitFailed => "TXN_002",
            ErrorCode::TxnRollbackFailed => "TXN_003",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl MemographError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: None,
        }
    }

    /// Create a validation error with suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create a validation error for a relation type outside the allowed character set.
    pub fn invalid_relation_type(relation_type: impl Into<String>) -> Self {
        let relation_type = relation_type.into();
        let mut details = HashMap::new();
        details.insert("relation_type".to_string(), relation_type.clone());
        Self::Validation {
            message: format!("Invalid relation type '{}'", relation_type),
            code: ErrorCode::ValInvalidRelationType,
            details,
            suggestion: Some(
                "Relation types must start with a letter or underscore and contain only letters, digits and underscores"
                    .to_string(),
            ),
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            code: ErrorCode::GrpConnectionFailed,
            source: None,
        }
    }

    /// Create a graph store error.
    pub fn graph_store(message: impl Into<String>) -> Self {
        Self::GraphStore {
            message: message.into(),
            code: ErrorCode::GrpOperationFailed,
            source: None,
        }
    }

    /// Create a graph store error that keeps the driver error as its source.
    pub fn graph_store_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::GraphStore {
            message: message.into(),
            code: ErrorCode::GrpOperationFailed,
            source: Some(Box::new(source)),
        }
    }

    /// Create a transaction error.
    pub fn transaction(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Transaction {
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Connection { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::GraphStore { code, .. } => *code,
            Self::Transaction { code, .. } => *code,
            Self::Database { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether the error was caused by the caller's input rather than the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { .. } => {
                Some("Please check the graph store URI, credentials and that the server is reachable")
            }
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::Configuration(_) => Some("Please check your memograph configuration file and environment"),
            Self::UnsupportedProvider { .. } => {
                Some("Please enable the matching cargo feature for this graph store provider")
            }
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for MemographError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}
