//! Error types for Gridsync core.

use thiserror::Error;

use crate::cell::CellRef;
use crate::rect::Rect;

/// Terminal failure of a single gateway call.
///
/// Callers treat both variants the same way: the cache stays untouched and
/// the user may retry. They are kept apart so the view can word its message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The call could not complete (connection, timeout, undecodable reply).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The remote service answered with an application-level error.
    #[error("remote rejected request: {0}")]
    Rejected(String),
}

/// Errors that can occur while synchronizing or editing the grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridsyncError {
    #[error(transparent)]
    Remote(#[from] GatewayError),

    #[error("invalid range ({rect}): start must not exceed stop")]
    InvalidRect { rect: Rect },

    #[error("cell {cell} is outside the {rows}x{cols} window")]
    OutOfWindow {
        cell: CellRef,
        rows: usize,
        cols: usize,
    },

    #[error("no cell is selected")]
    NoSelection,
}

impl GridsyncError {
    /// True for failures reported by (or on the way to) the remote store, as
    /// opposed to local misuse that never reached the network.
    pub fn is_remote(&self) -> bool {
        matches!(self, GridsyncError::Remote(_))
    }
}

pub type Result<T> = std::result::Result<T, GridsyncError>;
