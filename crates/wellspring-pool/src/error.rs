//! Error types for wellspring-pool
//!
//! Distinguishes the failure modes that matter to callers:
//! - Connection establishment failures (fatal at pool construction)
//! - A pool configured with zero connections (fail fast, never block)
//! - Acquires racing pool shutdown

use std::fmt;
use thiserror::Error;

/// Result type for wellspring-pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection-related errors (retriable)
    Connection,
    /// Query execution errors
    Query,
    /// Configuration error
    Configuration,
    /// Pool has no connections configured
    EmptyPool,
    /// Pool has been shut down
    Closed,
}

impl ErrorCategory {
    /// Whether errors in this category are generally retriable
    #[inline]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Connection)
    }
}

/// Main error type for wellspring-pool
#[derive(Error, Debug)]
pub enum Error {
    /// Connection failed
    #[error("connection error: {message}")]
    Connection {
        /// Human-readable failure description
        message: String,
        /// Underlying driver error, when available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution failed
    #[error("query error: {message}")]
    Query {
        /// Human-readable failure description
        message: String,
        /// Underlying driver error, when available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration {
        /// What was wrong with the configuration
        message: String,
    },

    /// The pool holds no connections; acquire can never succeed
    #[error("pool has no connections configured")]
    EmptyPool,

    /// The pool has been shut down
    #[error("pool is closed")]
    Closed,
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Connection { .. } => ErrorCategory::Connection,
            Self::Query { .. } => ErrorCategory::Query,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::EmptyPool => ErrorCategory::EmptyPool,
            Self::Closed => ErrorCategory::Closed,
        }
    }

    /// Whether this error is retriable
    #[inline]
    pub fn is_retriable(&self) -> bool {
        self.category().is_retriable()
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            source: None,
        }
    }

    /// Create a query error with source
    pub fn query_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Query {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => write!(f, "connection"),
            Self::Query => write!(f, "query"),
            Self::Configuration => write!(f, "configuration"),
            Self::EmptyPool => write!(f, "empty_pool"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_retriable() {
        assert!(ErrorCategory::Connection.is_retriable());

        assert!(!ErrorCategory::Query.is_retriable());
        assert!(!ErrorCategory::Configuration.is_retriable());
        assert!(!ErrorCategory::EmptyPool.is_retriable());
        assert!(!ErrorCategory::Closed.is_retriable());
    }

    #[test]
    fn test_error_category_mapping() {
        assert_eq!(
            Error::connection("refused").category(),
            ErrorCategory::Connection
        );
        assert_eq!(Error::query("bad sql").category(), ErrorCategory::Query);
        assert_eq!(
            Error::config("bad capacity").category(),
            ErrorCategory::Configuration
        );
        assert_eq!(Error::EmptyPool.category(), ErrorCategory::EmptyPool);
        assert_eq!(Error::Closed.category(), ErrorCategory::Closed);
    }

    #[test]
    fn test_error_is_retriable() {
        assert!(Error::connection("failed").is_retriable());
        assert!(!Error::EmptyPool.is_retriable());
        assert!(!Error::Closed.is_retriable());
    }

    #[test]
    fn test_error_display() {
        let err = Error::connection("connection refused");
        assert!(err.to_string().contains("connection refused"));

        assert_eq!(
            Error::EmptyPool.to_string(),
            "pool has no connections configured"
        );
        assert_eq!(Error::Closed.to_string(), "pool is closed");
    }

    #[test]
    fn test_error_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::connection_with_source("failed to connect", io);

        let source = std::error::Error::source(&err).expect("source preserved");
        assert!(source.to_string().contains("refused"));
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Connection.to_string(), "connection");
        assert_eq!(ErrorCategory::EmptyPool.to_string(), "empty_pool");
        assert_eq!(ErrorCategory::Closed.to_string(), "closed");
    }
}
