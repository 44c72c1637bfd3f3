//! In-memory connector for exercising pool semantics without a live store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;

use crate::cache::Connector;

/// Connector whose "connections" are plain tickets.
///
/// Clones share state, so a test can keep a handle for assertions after
/// moving a clone into the pool. Dial and probe failures can be toggled to
/// drive the pool's error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    state: Arc<State>,
}

#[derive(Debug, Default)]
struct State {
    dials: AtomicU64,
    fail_dial: AtomicBool,
    fail_probe: AtomicBool,
}

/// One fake connection, tagged with its dial sequence number.
#[derive(Debug, PartialEq, Eq)]
pub struct MemoryConn(pub u64);

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of dials performed so far.
    pub fn dials(&self) -> u64 {
        self.state.dials.load(Ordering::SeqCst)
    }

    /// Make subsequent dials fail.
    pub fn fail_dial(&self, fail: bool) {
        self.state.fail_dial.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent probes fail.
    pub fn fail_probe(&self, fail: bool) {
        self.state.fail_probe.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Conn = MemoryConn;

    async fn connect(&self) -> Result<MemoryConn> {
        if self.state.fail_dial.load(Ordering::SeqCst) {
            bail!("dial refused");
        }

        Ok(MemoryConn(self.state.dials.fetch_add(1, Ordering::SeqCst) + 1))
    }

    async fn probe(&self, _conn: &mut MemoryConn) -> Result<()> {
        if self.state.fail_probe.load(Ordering::SeqCst) {
            bail!("probe refused");
        }

        Ok(())
    }
}
