//! Connection traits for wellspring-pool
//!
//! Core abstractions for database connectivity:
//! - Connection: a live handle the pool owns and lends out
//! - ConnectionFactory: establishes handles from connection parameters
//! - ConnParams: immutable connection parameters

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Default MySQL server port
const DEFAULT_PORT: u16 = 3306;

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Parameters for establishing database connections.
///
/// Fixed at pool construction; the pool never mutates them afterwards.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnParams {
    /// Database server hostname or IP address
    pub host: String,
    /// Login user
    pub user: String,
    /// Login credential
    pub password: String,
    /// Database (schema) name to select after connecting
    pub database: String,
    /// Server TCP port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ConnParams {
    /// Create connection parameters with the default port.
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
            port: DEFAULT_PORT,
        }
    }

    /// Set the server port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

impl fmt::Debug for ConnParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Redact the credential so it cannot leak into logs.
        f.debug_struct("ConnParams")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("port", &self.port)
            .finish()
    }
}

/// A live connection owned by the pool.
///
/// The pool treats the handle as opaque: it only establishes, lends out and
/// closes connections. Query execution belongs to the borrower.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Check that the connection is alive
    async fn ping(&self) -> bool;

    /// Execute a statement, returning the affected row count
    async fn execute(&self, sql: &str) -> Result<u64>;

    /// Close the connection
    async fn close(&self) -> Result<()>;
}

/// Factory for establishing connections
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Establish a new connection.
    ///
    /// Parameter validation is implicit: bad credentials or an unreachable
    /// host surface here as a connection error.
    async fn connect(&self, params: &ConnParams) -> Result<Box<dyn Connection>>;
}
