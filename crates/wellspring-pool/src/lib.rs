//! # wellspring-pool
//!
//! Bounded database connection pooling for the Wellspring web server.
//!
//! A fixed set of connections is established up front and handed out to at
//! most `capacity` concurrent borrowers. When the pool is exhausted,
//! acquirers wait on a counting semaphore until a borrower returns its
//! connection; every checkout is a scope guard that returns the connection
//! on every exit path, including early returns and propagated errors.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wellspring_pool::prelude::*;
//!
//! let params = ConnParams::new("localhost", "web", "secret", "app");
//! let pool = ConnPool::new(
//!     PoolConfig::new(params).with_capacity(8),
//!     &MySqlConnectionFactory,
//! )
//! .await?;
//!
//! let conn = pool.acquire().await?;
//! conn.execute("UPDATE visits SET hits = hits + 1").await?;
//! // Connection is returned to the pool when `conn` is dropped.
//! ```
//!
//! The pool is owned by the process composition root and shared with request
//! handlers behind an `Arc`; shut it down once at process exit with
//! [`pool::ConnPool::close`].
//!
//! ## Feature Flags
//!
//! - `mysql` - MySQL/MariaDB support via mysql_async

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod connection;
pub mod error;
pub mod pool;

// Backend implementations (conditionally compiled)
#[cfg(feature = "mysql")]
pub mod mysql;

/// Prelude module for convenient imports
pub mod prelude {
    // Error types
    pub use crate::error::{Error, ErrorCategory, Result};

    // Connection traits and parameters
    pub use crate::connection::{ConnParams, Connection, ConnectionFactory};

    // Pool types
    pub use crate::pool::{ConnPool, PoolConfig, PooledConn};

    #[cfg(feature = "mysql")]
    pub use crate::mysql::{MySqlConnection, MySqlConnectionFactory};
}

// Re-export commonly used items at crate root
pub use error::{Error, Result};
