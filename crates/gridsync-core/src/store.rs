//! Grid store: the single authoritative cache of fetched and written cells.
//!
//! Every remote call goes through the store. Responses are merged into the
//! cache as they arrive; how out-of-order arrivals are reconciled depends on
//! the configured [`WritePolicy`].

use crate::cell::{Cell, CellRef, CellWrite};
use crate::error::Result;
use crate::gateway::Gateway;
use crate::rect::{Rect, Window};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, OwnedMutexGuard, watch};
use tracing::{debug, warn};

/// How concurrent writes to the same cell are reconciled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritePolicy {
    /// At most one commit per cell is in flight; a second commit for the same
    /// cell is issued only after the first resolves. Fetch responses never
    /// overwrite a cell with a commit in flight, nor one refreshed by a later
    /// request.
    #[default]
    SerializePerCell,
    /// Responses are merged in arrival order, whatever order they were
    /// issued in. A slow early response can overwrite a newer value.
    LastArrivalWins,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
    Fetch,
    Commit,
}

/// In-memory cache of the cells in the visible window.
pub struct GridStore<G> {
    gateway: G,
    window: Window,
    table_id: Option<String>,
    policy: WritePolicy,
    cells: DashMap<CellRef, Cell>,
    /// Sequence number of the request (or commit resolution) each entry came from.
    stamps: DashMap<CellRef, u64>,
    next_seq: AtomicU64,
    /// Per-cell write locks, held from issue until the response is merged.
    write_locks: DashMap<CellRef, Arc<Mutex<()>>>,
    revision: watch::Sender<u64>,
}

impl<G: Gateway> GridStore<G> {
    /// Create an empty store for `window` that talks to the default table.
    pub fn new(gateway: G, window: Window) -> Self {
        let (revision, _) = watch::channel(0);
        GridStore {
            gateway,
            window,
            table_id: None,
            policy: WritePolicy::default(),
            cells: DashMap::new(),
            stamps: DashMap::new(),
            next_seq: AtomicU64::new(0),
            write_locks: DashMap::new(),
            revision,
        }
    }

    /// Scope every remote call to the logical spreadsheet `table_id`.
    pub fn with_table(mut self, table_id: impl Into<String>) -> Self {
        self.table_id = Some(table_id.into());
        self
    }

    pub fn with_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetch `rect` from the remote store and merge the result.
    ///
    /// Returns the number of cells merged. On failure nothing is merged and
    /// the range simply stays unfetched.
    pub async fn load_range(&self, rect: Rect) -> Result<usize> {
        rect.validate()?;
        let seq = self.issue();
        debug!(%rect, seq, table = ?self.table_id, "fetching range");

        let cells = self
            .gateway
            .fetch_range(rect, self.table_id.as_deref())
            .await
            .inspect_err(|err| warn!(%rect, %err, "fetch range failed"))?;

        Ok(self.merge(&cells, seq, Source::Fetch))
    }

    /// Send `edits` as one insert-cells batch and merge the authoritative
    /// cells the remote store returns.
    ///
    /// Keys outside the window are rejected before anything is sent. On
    /// failure the cache is left exactly as it was.
    pub async fn commit_edits(&self, edits: Vec<CellWrite>) -> Result<Vec<Cell>> {
        for edit in &edits {
            self.window.check(edit.at())?;
        }
        if edits.is_empty() {
            return Ok(Vec::new());
        }

        let _guards = match self.policy {
            WritePolicy::SerializePerCell => self.lock_keys(&edits).await,
            WritePolicy::LastArrivalWins => Vec::new(),
        };
        let seq = self.issue();
        debug!(seq, count = edits.len(), table = ?self.table_id, "inserting cells");

        let cells = self
            .gateway
            .insert_cells(&edits, self.table_id.as_deref())
            .await
            .inspect_err(|err| warn!(seq, %err, "insert cells failed"))?;

        // Stamp with the resolution time so fetches issued while this write
        // was pending cannot overwrite it.
        let settled = self.issue();
        self.merge(&cells, settled, Source::Commit);
        Ok(cells)
    }

    /// The cached cell, or the empty default. Never fetches.
    pub fn get(&self, at: CellRef) -> Cell {
        self.cells
            .get(&at)
            .map(|cell| cell.clone())
            .unwrap_or_else(|| Cell::empty(at))
    }

    /// Receiver that observes a revision counter bumped after every merge.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn table_id(&self) -> Option<&str> {
        self.table_id.as_deref()
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn issue(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    async fn lock_keys(&self, edits: &[CellWrite]) -> Vec<OwnedMutexGuard<()>> {
        let mut keys: Vec<CellRef> = edits.iter().map(CellWrite::at).collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            let lock = Arc::clone(&self.write_locks.entry(key).or_default());
            guards.push(lock.lock_owned().await);
        }
        guards
    }

    fn commit_in_flight(&self, at: CellRef) -> bool {
        self.write_locks
            .get(&at)
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    fn accepts(&self, at: CellRef, seq: u64, source: Source) -> bool {
        match self.policy {
            WritePolicy::LastArrivalWins => true,
            WritePolicy::SerializePerCell => {
                let newer = self.stamps.get(&at).is_some_and(|stamp| *stamp > seq);
                !newer && (source == Source::Commit || !self.commit_in_flight(at))
            }
        }
    }

    fn merge(&self, cells: &[Cell], seq: u64, source: Source) -> usize {
        let mut merged = 0;
        for cell in cells {
            let at = cell.at();
            if !self.window.contains(at) {
                warn!(cell = %at, "dropping cell outside the window");
                continue;
            }
            if !self.accepts(at, seq, source) {
                debug!(cell = %at, seq, ?source, "dropping stale response");
                continue;
            }
            self.stamps.insert(at, seq);
            self.cells.insert(at, cell.clone());
            merged += 1;
        }
        self.revision.send_modify(|rev| *rev += 1);
        merged
    }
}
