//! The seam between the grid store and the remote spreadsheet service.

use crate::cell::{Cell, CellWrite};
use crate::error::GatewayError;
use crate::rect::Rect;
use std::future::Future;
use std::sync::Arc;

/// Asynchronous request/response wrapper around the two remote operations.
///
/// Implementations hold no cache and never retry: every call resolves to
/// exactly one outcome. Whether a failed write may be retried is only known
/// to the caller.
pub trait Gateway {
    /// Fetch every stored cell inside `rect`. An empty range, or a range
    /// with no stored cells, yields an empty list.
    fn fetch_range(
        &self,
        rect: Rect,
        table_id: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Cell>, GatewayError>>;

    /// Write a batch of raw values and return the authoritative post-write
    /// cells, display values included.
    fn insert_cells(
        &self,
        cells: &[CellWrite],
        table_id: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Cell>, GatewayError>>;
}

impl<G: Gateway> Gateway for Arc<G> {
    fn fetch_range(
        &self,
        rect: Rect,
        table_id: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Cell>, GatewayError>> {
        (**self).fetch_range(rect, table_id)
    }

    fn insert_cells(
        &self,
        cells: &[CellWrite],
        table_id: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Cell>, GatewayError>> {
        (**self).insert_cells(cells, table_id)
    }
}
