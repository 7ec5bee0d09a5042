//! Process-wide pool of idle [`Connection`]s, keyed by `(host, username)`.
//!
//! Checking a connection back in after use avoids paying the LOGIN
//! round-trip (and, for TLS, the handshake) on every operation. Connections
//! sit idle behind a mutex that is never held across I/O; only the
//! map bookkeeping happens under lock.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use super::config::ConnectionConfig;
use super::engine::Connection;
use crate::Result;
use crate::time::{Clock, SystemClock};

/// Key identifying one pool bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PoolKey {
    host: String,
    username: String,
}

impl PoolKey {
    /// Builds a key from a host and username.
    #[must_use]
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
        }
    }

    fn from_config(config: &ConnectionConfig) -> Self {
        Self::new(config.host.clone(), config.username.clone())
    }
}

struct IdleConnection {
    connection: Connection,
    idle_since: std::time::Instant,
}

/// A connection checked out from a [`ConnectionPool`].
///
/// Dropping this without calling [`Self::into_inner`] is fine: the
/// connection is simply not returned to the pool and is closed when
/// dropped.
pub struct PooledConnection {
    connection: Option<Connection>,
}

impl PooledConnection {
    /// Takes ownership of the underlying connection, detaching it from the
    /// pool permanently (it will not be returned on drop).
    #[must_use]
    pub fn into_inner(mut self) -> Connection {
        self.connection.take().expect("connection always present")
    }
}

impl std::ops::Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.connection.as_ref().expect("connection always present")
    }
}

impl std::ops::DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        self.connection.as_mut().expect("connection always present")
    }
}

/// Pool of idle, pre-authenticated connections keyed by `(host, username)`.
///
/// Use [`ConnectionPool::global`] for the process-wide singleton, or
/// construct a private instance for tests.
pub struct ConnectionPool {
    buckets: Mutex<HashMap<PoolKey, Vec<IdleConnection>>>,
    clock: Box<dyn Clock>,
}

impl Default for ConnectionPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionPool {
    /// Creates a fresh, empty pool using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            clock: Box::new(SystemClock),
        }
    }

    /// Returns the process-wide pool singleton, constructing it on first
    /// use.
    #[must_use]
    pub fn global() -> &'static Self {
        static POOL: OnceLock<ConnectionPool> = OnceLock::new();
        POOL.get_or_init(Self::new)
    }

    /// Explicitly establishes the process-wide pool.
    ///
    /// Equivalent to [`Self::global`]; exists as a named entry point so
    /// program startup can make the pool's lifetime visible instead of
    /// relying on whichever caller happens to touch it first. Tests that
    /// want isolation should construct their own instance with
    /// [`Self::new`] rather than use the shared singleton.
    #[must_use]
    pub fn init() -> &'static Self {
        Self::global()
    }

    /// Logs out and drops every idle connection currently held, leaving the
    /// pool empty.
    ///
    /// Intended to be called once during graceful program shutdown. Safe to
    /// call again afterward (a no-op on an empty pool); new connections
    /// acquired after `shutdown` repopulate it normally.
    pub async fn shutdown(&self) {
        let drained: Vec<Connection> = {
            let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
            buckets
                .drain()
                .flat_map(|(_, stack)| stack)
                .map(|entry| entry.connection)
                .collect()
        };

        for mut connection in drained {
            if let Err(e) = connection.disconnect().await {
                tracing::warn!(?e, "error logging out pooled connection during shutdown");
            }
        }
    }

    /// Checks out a connection for `config`, reusing an idle one if
    /// available and still fresh, or dialing a new one otherwise.
    ///
    /// A pooled connection older than `2 * keepalive_interval` since it was
    /// released is discarded rather than reused, since the server is likely
    /// to have dropped it.
    ///
    /// # Errors
    ///
    /// Returns an error if no idle connection is available and dialing a
    /// new one fails.
    pub async fn acquire(&self, config: &ConnectionConfig) -> Result<PooledConnection> {
        let key = PoolKey::from_config(config);
        let max_idle_age = config.keepalive_interval.saturating_mul(2);

        let candidate = {
            let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
            let stack = buckets.entry(key).or_default();
            loop {
                let Some(entry) = stack.pop() else {
                    break None;
                };
                if self.clock.elapsed(entry.idle_since) <= max_idle_age {
                    break Some(entry.connection);
                }
                tracing::debug!("discarding stale pooled connection");
            }
        };

        let connection = match candidate {
            Some(conn) => conn,
            None => Connection::connect(config.clone()).await?,
        };

        Ok(PooledConnection {
            connection: Some(connection),
        })
    }

    /// Returns a connection to the pool for reuse, enforcing
    /// `config.pool_max_per_key`. Connections beyond the cap are dropped
    /// (and thus logged out) rather than retained.
    pub fn release(&self, config: &ConnectionConfig, pooled: PooledConnection) {
        let Some(connection) = pooled.connection else {
            return;
        };
        if !connection.is_connected() {
            return;
        }

        let key = PoolKey::from_config(config);
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        let stack = buckets.entry(key).or_default();
        if stack.len() >= config.pool_max_per_key {
            return;
        }
        stack.push(IdleConnection {
            connection,
            idle_since: self.clock.now(),
        });
    }

    /// Runs `func` with a checked-out connection and automatically returns
    /// it to the pool afterward (on both success and error).
    ///
    /// # Errors
    ///
    /// Returns whatever error `func` returns, or a connection error if no
    /// connection could be acquired.
    pub async fn with_connection<F, Fut, T>(&self, config: &ConnectionConfig, func: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut pooled = self.acquire(config).await?;
        let result = func(&mut pooled).await;
        self.release(config, pooled);
        result
    }

    /// Removes all idle connections whose age exceeds `2 * keepalive_interval`.
    ///
    /// Intended to be called periodically (e.g. on `health_check_interval`)
    /// by a background task; does nothing on its own.
    pub fn evict_stale(&self, keepalive_interval: Duration) {
        let max_idle_age = keepalive_interval.saturating_mul(2);
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        for stack in buckets.values_mut() {
            stack.retain(|entry| self.clock.elapsed(entry.idle_since) <= max_idle_age);
        }
        buckets.retain(|_, stack| !stack.is_empty());
    }

    /// Returns the number of idle connections currently held for `key`.
    #[must_use]
    pub fn idle_count(&self, key: &PoolKey) -> usize {
        self.buckets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .map_or(0, Vec::len)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_key_equality() {
        let a = PoolKey::new("imap.example.com", "user@example.com");
        let b = PoolKey::new("imap.example.com", "user@example.com");
        let c = PoolKey::new("imap.example.com", "other@example.com");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_empty_pool_idle_count_is_zero() {
        let pool = ConnectionPool::new();
        let key = PoolKey::new("imap.example.com", "user@example.com");
        assert_eq!(pool.idle_count(&key), 0);
    }

    #[test]
    fn test_global_pool_is_a_singleton() {
        let a: *const ConnectionPool = ConnectionPool::global();
        let b: *const ConnectionPool = ConnectionPool::global();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_init_returns_the_same_singleton_as_global() {
        let a: *const ConnectionPool = ConnectionPool::init();
        let b: *const ConnectionPool = ConnectionPool::global();
        assert!(std::ptr::eq(a, b));
    }

    #[tokio::test]
    async fn test_shutdown_on_empty_pool_is_a_noop() {
        let pool = ConnectionPool::new();
        pool.shutdown().await;
        let key = PoolKey::new("imap.example.com", "user@example.com");
        assert_eq!(pool.idle_count(&key), 0);
    }
}
