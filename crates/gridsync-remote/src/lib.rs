//! gridsync-remote - gateways to the spreadsheet service.

pub mod http;
pub mod loopback;
pub mod wire;

use std::time::Duration;

use gridsync_core::{Cell, CellWrite, Gateway, GatewayError, Rect};

pub use http::HttpGateway;
pub use loopback::LoopbackGateway;

/// The gateway a client was configured with.
pub enum RemoteGateway {
    Http(HttpGateway),
    Loopback(LoopbackGateway),
}

impl RemoteGateway {
    /// HTTP gateway for `endpoint`, or an in-process loopback when none is set.
    pub fn connect(endpoint: Option<&str>, timeout: Duration) -> Result<Self, GatewayError> {
        match endpoint {
            Some(endpoint) => Ok(RemoteGateway::Http(HttpGateway::new(endpoint, timeout)?)),
            None => Ok(RemoteGateway::Loopback(LoopbackGateway::new())),
        }
    }

    /// Short human-readable description for status lines and logs.
    pub fn describe(&self) -> String {
        match self {
            RemoteGateway::Http(gw) => gw.endpoint().to_string(),
            RemoteGateway::Loopback(_) => "loopback (offline)".to_string(),
        }
    }
}

impl Gateway for RemoteGateway {
    async fn fetch_range(
        &self,
        rect: Rect,
        table_id: Option<&str>,
    ) -> Result<Vec<Cell>, GatewayError> {
        match self {
            RemoteGateway::Http(gw) => gw.fetch_range(rect, table_id).await,
            RemoteGateway::Loopback(gw) => gw.fetch_range(rect, table_id).await,
        }
    }

    async fn insert_cells(
        &self,
        cells: &[CellWrite],
        table_id: Option<&str>,
    ) -> Result<Vec<Cell>, GatewayError> {
        match self {
            RemoteGateway::Http(gw) => gw.insert_cells(cells, table_id).await,
            RemoteGateway::Loopback(gw) => gw.insert_cells(cells, table_id).await,
        }
    }
}
