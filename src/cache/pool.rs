//! Acquire/release lifecycle for pooled cache connections.
//!
//! The pool owns at most `max_active` live connections. A borrower holds a
//! [`PooledConnection`] guard with exclusive use of one connection; dropping
//! the guard parks the connection in the idle set and wakes one waiter.
//! Callers never touch raw connections outside acquire/drop.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;

use super::connector::Connector;
use crate::config::RedisConfig;

#[derive(Debug, Error)]
pub enum PoolError {
    /// Network-level failure opening a connection.
    #[error("failed to dial cache store: {0:#}")]
    Dial(anyhow::Error),
    /// The construction-time liveness probe failed.
    #[error("cache liveness probe failed: {0:#}")]
    Probe(anyhow::Error),
    /// All `max_active` connections are checked out and the pool was told not
    /// to wait, or the configured wait deadline passed.
    #[error("cache connection pool exhausted")]
    Exhausted,
}

/// Immutable pool limits, built once by the owner of the pool.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Cap on checked-out connections.
    pub max_active: usize,
    /// Park a saturated acquire instead of failing it.
    pub wait_on_exhaustion: bool,
    /// Deadline for a parked acquire. `None` reproduces the historical
    /// behavior: a saturated pool blocks the caller indefinitely.
    pub acquire_timeout: Option<Duration>,
    /// Idle connections parked longer than this are discarded on next
    /// acquire, not actively killed. `None` keeps them forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_active: 29500,
            wait_on_exhaustion: true,
            acquire_timeout: None,
            idle_timeout: None,
        }
    }
}

impl From<&RedisConfig> for PoolOptions {
    fn from(config: &RedisConfig) -> Self {
        Self {
            max_active: config.max_active,
            wait_on_exhaustion: config.wait_on_exhaustion,
            acquire_timeout: config.acquire_timeout.map(Duration::from_secs),
            idle_timeout: match config.idle_timeout {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }
}

/// Point-in-time snapshot of the pool counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub acquisitions: u64,
    pub reused: u64,
    pub fresh: u64,
    pub exhausted: u64,
    pub idle_expired: u64,
    /// Connections currently parked in the idle set.
    pub idle: usize,
}

#[derive(Debug, Default)]
struct Counters {
    acquisitions: AtomicU64,
    reused: AtomicU64,
    fresh: AtomicU64,
    exhausted: AtomicU64,
    idle_expired: AtomicU64,
}

struct IdleEntry<T> {
    conn: T,
    parked_at: Instant,
}

type IdleSet<T> = Arc<Mutex<Vec<IdleEntry<T>>>>;

/// Bounded pool of reusable connections to a remote store.
///
/// Safe for concurrent acquire/release from many tasks; idle-set bookkeeping
/// is serialized internally. Waiters are woken in unspecified order when a
/// borrower releases.
pub struct CachePool<C: Connector> {
    connector: C,
    options: PoolOptions,
    semaphore: Arc<Semaphore>,
    idle: IdleSet<C::Conn>,
    counters: Counters,
}

impl<C: Connector> CachePool<C> {
    /// Construct the pool and eagerly verify the endpoint is alive.
    ///
    /// One connection is dialed and probed; failure of either step fails
    /// construction, so callers never receive a pool backed by a dead
    /// endpoint. The probed connection seeds the idle set.
    pub async fn new(connector: C, options: PoolOptions) -> Result<Self, PoolError> {
        let mut first = connector.connect().await.map_err(PoolError::Dial)?;
        connector.probe(&mut first).await.map_err(PoolError::Probe)?;

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(options.max_active)),
            idle: Arc::new(Mutex::new(vec![IdleEntry {
                conn: first,
                parked_at: Instant::now(),
            }])),
            connector,
            options,
            counters: Counters::default(),
        })
    }

    /// Borrow a connection, dialing a fresh one when the idle set is empty.
    ///
    /// With `wait_on_exhaustion` a saturated pool parks the caller until a
    /// borrower releases, bounded by `acquire_timeout` when configured.
    /// Without it, saturation is an immediate [`PoolError::Exhausted`].
    pub async fn acquire(&self) -> Result<PooledConnection<C>, PoolError> {
        let permit = self.grab_permit().await?;
        self.counters.acquisitions.fetch_add(1, Ordering::Relaxed);

        let conn = match self.pop_idle() {
            Some(conn) => {
                self.counters.reused.fetch_add(1, Ordering::Relaxed);
                conn
            }
            None => match self.connector.connect().await {
                Ok(conn) => {
                    self.counters.fresh.fetch_add(1, Ordering::Relaxed);
                    conn
                }
                Err(e) => {
                    tracing::error!(error = %e, "cache dial failed");
                    // Permit drops here, freeing the slot for the next caller.
                    return Err(PoolError::Dial(e));
                }
            },
        };

        Ok(PooledConnection {
            conn: Some(conn),
            idle: Arc::clone(&self.idle),
            permit: Some(permit),
        })
    }

    /// Run the connector's liveness probe on a borrowed connection.
    pub async fn probe(&self, conn: &mut C::Conn) -> anyhow::Result<()> {
        self.connector.probe(conn).await
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            acquisitions: self.counters.acquisitions.load(Ordering::Relaxed),
            reused: self.counters.reused.load(Ordering::Relaxed),
            fresh: self.counters.fresh.load(Ordering::Relaxed),
            exhausted: self.counters.exhausted.load(Ordering::Relaxed),
            idle_expired: self.counters.idle_expired.load(Ordering::Relaxed),
            idle: self.lock_idle().len(),
        }
    }

    pub fn options(&self) -> &PoolOptions {
        &self.options
    }

    async fn grab_permit(&self) -> Result<OwnedSemaphorePermit, PoolError> {
        if !self.options.wait_on_exhaustion {
            return Arc::clone(&self.semaphore).try_acquire_owned().map_err(|_| {
                self.counters.exhausted.fetch_add(1, Ordering::Relaxed);
                PoolError::Exhausted
            });
        }

        let parked = Arc::clone(&self.semaphore).acquire_owned();
        let acquired = match self.options.acquire_timeout {
            None => parked.await,
            Some(limit) => match timeout(limit, parked).await {
                Ok(acquired) => acquired,
                Err(_) => {
                    self.counters.exhausted.fetch_add(1, Ordering::Relaxed);
                    return Err(PoolError::Exhausted);
                }
            },
        };

        // The semaphore is never closed while the pool is alive.
        acquired.map_err(|_| PoolError::Exhausted)
    }

    fn pop_idle(&self) -> Option<C::Conn> {
        let mut idle = self.lock_idle();

        while let Some(entry) = idle.pop() {
            if let Some(limit) = self.options.idle_timeout {
                if entry.parked_at.elapsed() >= limit {
                    // Stale: drop the connection and look at the next one.
                    self.counters.idle_expired.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
            }
            return Some(entry.conn);
        }

        None
    }

    fn lock_idle(&self) -> std::sync::MutexGuard<'_, Vec<IdleEntry<C::Conn>>> {
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Exclusive borrow of one pooled connection.
///
/// Dereferences to the raw connection. Dropping the guard parks the
/// connection back in the idle set, then releases the capacity permit so a
/// waiter always finds it there.
pub struct PooledConnection<C: Connector> {
    conn: Option<C::Conn>,
    idle: IdleSet<C::Conn>,
    permit: Option<OwnedSemaphorePermit>,
}

impl<C: Connector> Deref for PooledConnection<C> {
    type Target = C::Conn;

    fn deref(&self) -> &Self::Target {
        self.conn
            .as_ref()
            .expect("connection already returned to pool")
    }
}

impl<C: Connector> DerefMut for PooledConnection<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn
            .as_mut()
            .expect("connection already returned to pool")
    }
}

impl<C: Connector> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            let mut idle = self
                .idle
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            idle.push(IdleEntry {
                conn,
                parked_at: Instant::now(),
            });
        }

        // Permit drops last: the parked connection is visible before the
        // semaphore wakes a waiter.
        self.permit.take();
    }
}
