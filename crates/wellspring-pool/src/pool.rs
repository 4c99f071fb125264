//! Bounded connection pooling for wellspring
//!
//! The pool owns a fixed set of live connections, all established eagerly at
//! construction. Admission is bounded by a counting semaphore initialized to
//! the pool capacity; the idle collection is guarded by a mutex held only
//! for O(1) queue operations, never across driver I/O or the semaphore wait.
//!
//! # Example
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
//! // Connection is returned to the pool when dropped
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};

use crate::connection::{ConnParams, Connection, ConnectionFactory};
use crate::error::{Error, Result};

/// Default number of connections held by a pool
const DEFAULT_CAPACITY: usize = 8;

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Connection parameters shared by every pooled connection
    pub params: ConnParams,
    /// Number of connections established at construction; fixed for the
    /// lifetime of the pool
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl PoolConfig {
    /// Create a pool configuration with the default capacity
    pub fn new(params: ConnParams) -> Self {
        Self {
            params,
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Set the pool capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

/// A bounded pool of database connections.
///
/// At most `capacity` connections are checked out at any moment; further
/// acquirers wait on the admission semaphore until a borrower returns its
/// connection. There is no acquire timeout: a caller waits until a
/// connection frees up or the pool is shut down.
///
/// One pool instance is expected per process, owned by the composition root
/// and shared with workers behind an [`Arc`].
pub struct ConnPool {
    config: PoolConfig,
    /// Connections currently not checked out
    idle: Mutex<VecDeque<Box<dyn Connection>>>,
    /// Advisory counters; mutated only while holding the `idle` lock
    free: AtomicUsize,
    in_use: AtomicUsize,
    /// Bounds how many callers may hold a connection concurrently
    admission: Semaphore,
    /// Teardown latch, set once by [`ConnPool::close`]
    closed: AtomicBool,
}

impl ConnPool {
    /// Create a pool and eagerly establish `capacity` connections.
    ///
    /// Any establishment failure aborts construction: already-created
    /// connections are closed best-effort and the error is returned. A
    /// process that cannot build its pool cannot serve requests, so callers
    /// treat this as fatal at startup.
    pub async fn new(
        config: PoolConfig,
        factory: &dyn ConnectionFactory,
    ) -> Result<Arc<Self>> {
        let mut created: VecDeque<Box<dyn Connection>> = VecDeque::with_capacity(config.capacity);

        for slot in 0..config.capacity {
            match factory.connect(&config.params).await {
                Ok(conn) => created.push_back(conn),
                Err(err) => {
                    warn!(slot, error = %err, "connection setup failed, aborting pool initialization");
                    for conn in created.drain(..) {
                        if let Err(close_err) = conn.close().await {
                            warn!(error = %close_err, "failed to close connection while unwinding");
                        }
                    }
                    return Err(err);
                }
            }
        }

        let capacity = config.capacity;
        info!(
            capacity,
            host = %config.params.host,
            database = %config.params.database,
            "connection pool initialized"
        );

        Ok(Arc::new(Self {
            admission: Semaphore::new(capacity),
            idle: Mutex::new(created),
            free: AtomicUsize::new(capacity),
            in_use: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            config,
        }))
    }

    /// Check a connection out of the pool.
    ///
    /// Blocks while the pool is exhausted. The returned [`PooledConn`] is
    /// owned by exactly one caller and returns the connection on drop.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyPool`] if the pool was configured with zero
    ///   connections; returns immediately, never blocks.
    /// - [`Error::Closed`] if the pool has been shut down, including while
    ///   this caller was waiting.
    pub async fn acquire(self: &Arc<Self>) -> Result<PooledConn> {
        if self.config.capacity == 0 {
            return Err(Error::EmptyPool);
        }
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }

        // The only suspension point: wait for a connection to free up.
        let permit = self
            .admission
            .acquire()
            .await
            .map_err(|_| Error::Closed)?;

        let conn = {
            let mut idle = self.idle.lock().await;
            let Some(conn) = idle.pop_front() else {
                // close() drained the queue between the permit grant and
                // the lock; the permit is returned on drop.
                return Err(Error::Closed);
            };
            self.free.fetch_sub(1, Ordering::Release);
            self.in_use.fetch_add(1, Ordering::Release);
            conn
        };

        // The permit is re-minted by release(); dropping it here would admit
        // a caller the pool has no connection for.
        permit.forget();

        debug!(free = self.free_count(), "connection checked out");
        Ok(PooledConn {
            conn: Some(conn),
            pool: Arc::clone(self),
        })
    }

    /// Return a connection to the pool.
    ///
    /// `None` is rejected with `false` and no state change — the only
    /// validation performed. Returning a connection that did not come from
    /// this pool, or returning one twice, corrupts the counters and is a
    /// caller contract violation the pool does not defend against.
    ///
    /// The connection is visible in the idle queue before the admission
    /// permit is restored, so a woken acquirer always finds one to pop.
    pub async fn release(&self, conn: Option<Box<dyn Connection>>) -> bool {
        let Some(conn) = conn else {
            warn!("release called without a connection");
            return false;
        };

        {
            let mut idle = self.idle.lock().await;
            if !self.closed.load(Ordering::Acquire) {
                idle.push_back(conn);
                self.free.fetch_add(1, Ordering::Release);
                self.in_use.fetch_sub(1, Ordering::Release);
                drop(idle);
                self.admission.add_permits(1);
                debug!(free = self.free_count(), "connection returned");
                return true;
            }
        }

        // Pool already shut down; dispose of the handle instead of pooling it.
        if let Err(err) = conn.close().await {
            warn!(error = %err, "failed to close connection returned after shutdown");
        }
        true
    }

    /// Number of connections currently free.
    ///
    /// Point-in-time advisory read; may be stale under concurrent checkouts.
    pub fn free_count(&self) -> usize {
        self.free.load(Ordering::Relaxed)
    }

    /// Number of connections currently checked out.
    ///
    /// Point-in-time advisory read, like [`ConnPool::free_count`].
    pub fn in_use_count(&self) -> usize {
        self.in_use.load(Ordering::Relaxed)
    }

    /// Total number of connections the pool was built with
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Whether the pool has been shut down
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Connection parameters the pool was built with
    pub fn params(&self) -> &ConnParams {
        &self.config.params
    }

    /// Shut the pool down, closing every idle connection.
    ///
    /// Callers blocked in [`ConnPool::acquire`] are woken and observe
    /// [`Error::Closed`]. Connections checked out by outstanding leases are
    /// not reclaimed here; a lease dropped after shutdown closes its
    /// connection instead of re-pooling it. Calling `close` a second time is
    /// a no-op.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        // Wake blocked acquirers; they observe Error::Closed.
        self.admission.close();

        let drained: Vec<Box<dyn Connection>> = {
            let mut idle = self.idle.lock().await;
            self.free.store(0, Ordering::Release);
            self.in_use.store(0, Ordering::Release);
            idle.drain(..).collect()
        };

        let count = drained.len();
        for conn in drained {
            if let Err(err) = conn.close().await {
                warn!(error = %err, "failed to close pooled connection");
            }
        }

        info!(closed = count, "connection pool shut down");
    }
}

impl Drop for ConnPool {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::Acquire) {
            warn!("connection pool dropped without close(); pooled connections were not shut down cleanly");
        }
    }
}

impl std::fmt::Debug for ConnPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnPool")
            .field("capacity", &self.config.capacity)
            .field("free", &self.free_count())
            .field("in_use", &self.in_use_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A connection checked out of the pool.
///
/// Scope-bound ownership of one connection: the borrower reaches the
/// connection through `Deref`, and dropping the lease returns the connection
/// to the pool exactly once, on every exit path — normal completion, early
/// return or propagated error. Not cloneable; cloning would double-release.
pub struct PooledConn {
    /// The underlying connection; taken out exactly once, on drop
    conn: Option<Box<dyn Connection>>,
    /// Pool to return the connection to
    pool: Arc<ConnPool>,
}

impl PooledConn {
    /// Get the underlying connection
    pub fn connection(&self) -> &(dyn Connection + 'static) {
        self.conn
            .as_ref()
            .expect("connection already returned")
            .as_ref()
    }

    /// Get a mutable reference to the underlying connection
    pub fn connection_mut(&mut self) -> &mut (dyn Connection + 'static) {
        self.conn
            .as_mut()
            .expect("connection already returned")
            .as_mut()
    }
}

impl std::ops::Deref for PooledConn {
    type Target = dyn Connection;

    fn deref(&self) -> &Self::Target {
        self.connection()
    }
}

impl std::ops::DerefMut for PooledConn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection_mut()
    }
}

impl Drop for PooledConn {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            let pool = Arc::clone(&self.pool);
            tokio::spawn(async move {
                pool.release(Some(conn)).await;
            });
        }
    }
}

impl std::fmt::Debug for PooledConn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConn")
            .field("returned", &self.conn.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ConnParams {
        ConnParams::new("localhost", "web", "secret", "app")
    }

    #[test]
    fn test_pool_config_default_capacity() {
        let config = PoolConfig::new(params());
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn test_pool_config_builder() {
        let config = PoolConfig::new(params()).with_capacity(2);

        assert_eq!(config.capacity, 2);
        assert_eq!(config.params.host, "localhost");
        assert_eq!(config.params.database, "app");
    }

    #[test]
    fn test_pool_config_capacity_from_serde_default() {
        let config: PoolConfig = serde_json::from_str(
            r#"{"params":{"host":"localhost","user":"web","password":"secret","database":"app"}}"#,
        )
        .expect("deserializes");

        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.params.port, 3306);
    }
}
