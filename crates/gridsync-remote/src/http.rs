//! HTTP/JSON gateway to a remote spreadsheet service.
//!
//! Covers the two service calls: `POST /v1/cells:get` and
//! `POST /v1/cells:insert`. No retries happen here.

use std::time::Duration;

use gridsync_core::{Cell, CellWrite, Gateway, GatewayError, Rect};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::wire::{
    ErrorBody, GetCellsRequest, GetCellsResponse, InsertCellsRequest, InsertCellsResponse,
};

const GET_CELLS_PATH: &str = "/v1/cells:get";
const INSERT_CELLS_PATH: &str = "/v1/cells:insert";

/// Async HTTP client for one service endpoint.
#[derive(Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpGateway {
    /// Create a client for `endpoint` (e.g. `http://localhost:8080`).
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .user_agent(format!("gridsync/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self::with_client(endpoint, http))
    }

    /// Use a preconfigured client (proxy settings, TLS roots, ...).
    pub fn with_client(endpoint: &str, http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, GatewayError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.endpoint, path);
        debug!(%url, "posting request");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| GatewayError::Transport(format!("undecodable reply: {e}")))
    }
}

impl Gateway for HttpGateway {
    async fn fetch_range(
        &self,
        rect: Rect,
        table_id: Option<&str>,
    ) -> Result<Vec<Cell>, GatewayError> {
        let req = GetCellsRequest {
            rect,
            table_id: table_id.map(str::to_owned),
        };
        let resp: GetCellsResponse = self.post_json(GET_CELLS_PATH, &req).await?;
        Ok(resp.cells)
    }

    async fn insert_cells(
        &self,
        cells: &[CellWrite],
        table_id: Option<&str>,
    ) -> Result<Vec<Cell>, GatewayError> {
        let req = InsertCellsRequest {
            cells: cells.to_vec(),
            table_id: table_id.map(str::to_owned),
        };
        let resp: InsertCellsResponse = self.post_json(INSERT_CELLS_PATH, &req).await?;
        Ok(resp.cells)
    }
}

/// Map a non-success status to a gateway error.
///
/// Proxy and availability statuses mean the service was never reached, so
/// they count as transport failures; everything else is the service's answer.
pub fn classify_failure(status: u16, body: &str) -> GatewayError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        502..=504 => GatewayError::Transport(format!("HTTP {status}: {message}")),
        _ => GatewayError::Rejected(format!("HTTP {status}: {message}")),
    }
}
