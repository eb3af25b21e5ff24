//! gridsync-core - UI-agnostic cell store and edit session.
//!
//! A [`GridStore`] caches the cells of a fixed window and reconciles them
//! with a remote spreadsheet service reached through a [`Gateway`]. An
//! [`EditSession`] tracks the single active cell and decides when typed
//! text becomes a write.

pub mod cell;
pub mod error;
pub mod gateway;
pub mod rect;
pub mod session;
pub mod store;
pub mod view;

pub use cell::{Cell, CellRef, CellWrite};
pub use error::{GatewayError, GridsyncError, Result};
pub use gateway::Gateway;
pub use rect::{Rect, Window};
pub use session::{ActiveCell, CommitIntent, CommitOutcome, EditSession, SessionState};
pub use store::{GridStore, WritePolicy};
pub use view::{GridSnapshot, ViewCell};
