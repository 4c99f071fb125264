//! MySQL backend implementation for wellspring-pool
//!
//! Provides the [`Connection`] and [`ConnectionFactory`] implementations
//! backed by `mysql_async`. Enabled with the `mysql` feature.

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, OptsBuilder};
use tokio::sync::Mutex;
use tracing::debug;

use crate::connection::{ConnParams, Connection, ConnectionFactory};
use crate::error::{Error, Result};

/// A live MySQL connection.
///
/// The driver handle is consumed by a clean disconnect, so it lives in an
/// `Option` that [`Connection::close`] takes out exactly once.
pub struct MySqlConnection {
    conn: Mutex<Option<Conn>>,
}

impl MySqlConnection {
    /// Establish a connection from pool parameters.
    pub async fn connect(params: &ConnParams) -> Result<Self> {
        let opts = OptsBuilder::default()
            .ip_or_hostname(params.host.clone())
            .tcp_port(params.port)
            .user(Some(params.user.clone()))
            .pass(Some(params.password.clone()))
            .db_name(Some(params.database.clone()));

        let conn = Conn::new(opts).await.map_err(|e| {
            Error::connection_with_source(
                format!("failed to connect to {}:{}", params.host, params.port),
                e,
            )
        })?;

        debug!(
            host = %params.host,
            database = %params.database,
            "mysql connection established"
        );

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }
}

#[async_trait]
impl Connection for MySqlConnection {
    async fn ping(&self) -> bool {
        match self.conn.lock().await.as_mut() {
            Some(conn) => conn.ping().await.is_ok(),
            None => false,
        }
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        let mut guard = self.conn.lock().await;
        let Some(conn) = guard.as_mut() else {
            return Err(Error::connection("connection already closed"));
        };

        conn.query_drop(sql)
            .await
            .map_err(|e| Error::query_with_source("statement execution failed", e))?;
        Ok(conn.affected_rows())
    }

    async fn close(&self) -> Result<()> {
        if let Some(conn) = self.conn.lock().await.take() {
            conn.disconnect()
                .await
                .map_err(|e| Error::connection_with_source("failed to close connection", e))?;
        }
        Ok(())
    }
}

/// Factory producing MySQL connections from pool parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnectionFactory;

#[async_trait]
impl ConnectionFactory for MySqlConnectionFactory {
    async fn connect(&self, params: &ConnParams) -> Result<Box<dyn Connection>> {
        Ok(Box::new(MySqlConnection::connect(params).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_from_env() -> ConnParams {
        let host = std::env::var("WELLSPRING_DB_HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let user = std::env::var("WELLSPRING_DB_USER").unwrap_or_else(|_| "root".into());
        let password = std::env::var("WELLSPRING_DB_PASSWORD").unwrap_or_default();
        let database = std::env::var("WELLSPRING_DB_NAME").unwrap_or_else(|_| "mysql".into());
        ConnParams::new(host, user, password, database)
    }

    // Integration test; run against a real server with:
    // WELLSPRING_DB_HOST=... cargo test -p wellspring-pool --features mysql -- --ignored

    #[tokio::test]
    #[ignore = "requires a MySQL server"]
    async fn mysql_connect_ping_close() {
        let conn = MySqlConnection::connect(&params_from_env())
            .await
            .expect("connect failed");

        assert!(conn.ping().await);
        conn.close().await.expect("close failed");
        assert!(!conn.ping().await);
    }

    #[tokio::test]
    #[ignore = "requires a MySQL server"]
    async fn mysql_execute_via_factory() {
        let conn = MySqlConnectionFactory
            .connect(&params_from_env())
            .await
            .expect("connect failed");

        conn.execute("SELECT 1").await.expect("execute failed");
        conn.close().await.expect("close failed");
    }
}
