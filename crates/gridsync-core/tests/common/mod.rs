//! Scripted gateway: every call parks until the test releases it, so tests
//! decide the order in which responses arrive.

#![allow(dead_code)]

use gridsync_core::{Cell, CellWrite, Gateway, GatewayError, Rect};
use std::sync::Mutex;
use tokio::sync::oneshot;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Fetch(Rect, Option<String>),
    Insert(Vec<CellWrite>, Option<String>),
}

type Reply = Result<Vec<Cell>, GatewayError>;

struct Parked {
    call: Call,
    reply: oneshot::Sender<Reply>,
}

#[derive(Default)]
pub struct ScriptedGateway {
    parked: Mutex<Vec<Parked>>,
    log: Mutex<Vec<Call>>,
}

impl ScriptedGateway {
    /// Every call issued so far, in issue order.
    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn inserts(&self) -> Vec<Vec<CellWrite>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Insert(cells, _) => Some(cells),
                Call::Fetch(..) => None,
            })
            .collect()
    }

    /// Calls issued but not yet released.
    pub fn parked(&self) -> Vec<Call> {
        self.parked
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.call.clone())
            .collect()
    }

    /// Yield until at least `n` calls are parked.
    pub async fn wait_for_parked(&self, n: usize) {
        while self.parked.lock().unwrap().len() < n {
            tokio::task::yield_now().await;
        }
    }

    /// Resolve the parked call at `index` with `reply`.
    pub fn release(&self, index: usize, reply: Reply) {
        let parked = self.parked.lock().unwrap().remove(index);
        let _ = parked.reply.send(reply);
    }

    /// Resolve a parked insert by echoing its writes with the raw value as
    /// display value.
    pub fn release_echo(&self, index: usize) {
        let call = self.parked.lock().unwrap()[index].call.clone();
        let Call::Insert(writes, _) = call else {
            panic!("parked call {index} is not an insert");
        };
        let cells = writes
            .iter()
            .map(|w| Cell::new(w.at(), w.raw_value.clone(), w.raw_value.clone()))
            .collect();
        self.release(index, Ok(cells));
    }

    async fn park(&self, call: Call) -> Reply {
        let (tx, rx) = oneshot::channel();
        self.log.lock().unwrap().push(call.clone());
        self.parked.lock().unwrap().push(Parked { call, reply: tx });
        rx.await
            .unwrap_or_else(|_| Err(GatewayError::Transport("reply dropped".into())))
    }
}

impl Gateway for ScriptedGateway {
    async fn fetch_range(&self, rect: Rect, table_id: Option<&str>) -> Reply {
        self.park(Call::Fetch(rect, table_id.map(str::to_string))).await
    }

    async fn insert_cells(&self, cells: &[CellWrite], table_id: Option<&str>) -> Reply {
        self.park(Call::Insert(cells.to_vec(), table_id.map(str::to_string)))
            .await
    }
}

/// Yield until `done` holds.
pub async fn until(mut done: impl FnMut() -> bool) {
    while !done() {
        tokio::task::yield_now().await;
    }
}
