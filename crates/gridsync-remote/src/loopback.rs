//! In-process stand-in for the spreadsheet service.
//!
//! Keeps one table per table id, created on first use. It does no formula
//! evaluation: the display value of every stored cell is its raw value.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use gridsync_core::{Cell, CellRef, CellWrite, Gateway, GatewayError, Rect};

/// Key of the table used when no table id is given.
const DEFAULT_TABLE: &str = "";

type Table = DashMap<CellRef, Cell>;

#[derive(Default)]
pub struct LoopbackGateway {
    tables: DashMap<String, Table>,
    fetches: AtomicUsize,
    inserts: AtomicUsize,
}

impl LoopbackGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a table, as if the cells had been inserted earlier.
    pub fn with_cells(self, table_id: Option<&str>, cells: impl IntoIterator<Item = Cell>) -> Self {
        {
            let table = self.tables.entry(table_key(table_id)).or_default();
            for cell in cells {
                table.insert(cell.at(), cell);
            }
        }
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::Relaxed)
    }

    /// Number of stored cells in a table (0 for a table never used).
    pub fn table_len(&self, table_id: Option<&str>) -> usize {
        self.tables
            .get(table_id.unwrap_or(DEFAULT_TABLE))
            .map(|table| table.len())
            .unwrap_or(0)
    }
}

fn table_key(table_id: Option<&str>) -> String {
    table_id.unwrap_or(DEFAULT_TABLE).to_string()
}

impl Gateway for LoopbackGateway {
    async fn fetch_range(
        &self,
        rect: Rect,
        table_id: Option<&str>,
    ) -> Result<Vec<Cell>, GatewayError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        rect.validate()
            .map_err(|e| GatewayError::Rejected(e.to_string()))?;

        let table = self.tables.entry(table_key(table_id)).or_default();
        let mut cells: Vec<Cell> = table
            .iter()
            .filter(|entry| rect.contains(*entry.key()))
            .map(|entry| entry.value().clone())
            .collect();
        cells.sort_by_key(Cell::at);
        Ok(cells)
    }

    async fn insert_cells(
        &self,
        cells: &[CellWrite],
        table_id: Option<&str>,
    ) -> Result<Vec<Cell>, GatewayError> {
        self.inserts.fetch_add(1, Ordering::Relaxed);

        let table = self.tables.entry(table_key(table_id)).or_default();
        let stored = cells
            .iter()
            .map(|write| {
                let cell = Cell::new(write.at(), write.raw_value.clone(), write.raw_value.clone());
                table.insert(write.at(), cell.clone());
                cell
            })
            .collect();
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::LoopbackGateway;
    use gridsync_core::{Cell, CellRef, CellWrite, Gateway, GatewayError, Rect};

    #[tokio::test(flavor = "current_thread")]
    async fn fetch_returns_stored_cells_inside_rect_in_row_major_order() {
        let gw = LoopbackGateway::new().with_cells(
            None,
            [
                Cell::new(CellRef::new(3, 0), "d", "d"),
                Cell::new(CellRef::new(0, 1), "b", "b"),
                Cell::new(CellRef::new(0, 0), "a", "a"),
                Cell::new(CellRef::new(9, 9), "far", "far"),
            ],
        );

        let cells = gw.fetch_range(Rect::new(0, 5, 0, 5).unwrap(), None).await.unwrap();
        let raws: Vec<_> = cells.iter().map(|c| c.raw_value.as_str()).collect();
        assert_eq!(raws, vec!["a", "b", "d"]);
        assert_eq!(gw.fetch_count(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn empty_range_is_not_an_error() {
        let gw = LoopbackGateway::new();
        let cells = gw.fetch_range(Rect::new(2, 2, 0, 4).unwrap(), None).await.unwrap();
        assert!(cells.is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn malformed_rect_is_rejected() {
        let gw = LoopbackGateway::new();
        let rect = Rect {
            start_row: 3,
            stop_row: 0,
            start_col: 0,
            stop_col: 1,
        };
        let err = gw.fetch_range(rect, None).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn tables_are_isolated() {
        let gw = LoopbackGateway::new();
        let write = [CellWrite::new(CellRef::new(0, 0), "42")];

        let stored = gw.insert_cells(&write, Some("budget")).await.unwrap();
        assert_eq!(stored, vec![Cell::new(CellRef::new(0, 0), "42", "42")]);
        assert_eq!(gw.table_len(Some("budget")), 1);
        assert_eq!(gw.table_len(None), 0);

        let rect = Rect::new(0, 1, 0, 1).unwrap();
        assert!(gw.fetch_range(rect, None).await.unwrap().is_empty());
        assert_eq!(gw.fetch_range(rect, Some("budget")).await.unwrap().len(), 1);
    }
}
