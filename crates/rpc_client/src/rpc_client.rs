//! HTTP client for the validator daemon REST API.

use crate::models::{
    AccountInformation, BlockHeader, BlockHeaderResponse, CatchupMessage, CatchupStart,
    GenerateKeyParams, NodeStatus, NodeVersion, ParticipationKey,
};
use crate::{NodeApi, RpcError, RpcResult};
use async_trait::async_trait;
use nodewatch_config::API_TOKEN_HEADER;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};

/// Client for the daemon REST API
#[derive(Debug, Clone)]
pub struct RpcClient {
    base_address: Url,
    http_client: Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl RpcClient {
    /// Creates a new client sending `token` with every request
    pub fn new(url: Url, token: Option<&str>) -> RpcResult<Self> {
        let mut builder = Client::builder();

        if let Some(token) = token {
            let mut headers = HeaderMap::new();
            let value = HeaderValue::from_str(token)
                .map_err(|e| RpcError::InvalidEndpoint(format!("invalid API token: {e}")))?;
            headers.insert(API_TOKEN_HEADER, value);
            builder = builder.default_headers(headers);
        }

        Ok(Self::with_client(builder.build()?, url))
    }

    /// Creates a client over an existing HTTP client
    pub fn with_client(client: Client, url: Url) -> Self {
        Self {
            base_address: with_trailing_slash(url),
            http_client: client,
        }
    }

    /// Base address requests are resolved against
    pub fn base_address(&self) -> &Url {
        &self.base_address
    }

    fn endpoint(&self, path: &str) -> RpcResult<Url> {
        Ok(self.base_address.join(path)?)
    }

    /// Catchpoints are `<round>#<checksum>`; the `#` must not start a fragment
    fn catchup_endpoint(&self, catchpoint: &str) -> RpcResult<Url> {
        self.endpoint(&format!("v2/catchup/{}", catchpoint.replace('#', "%23")))
    }

    /// Sends a request and fails on any non-success status
    async fn send(&self, request: RequestBuilder) -> RpcResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        trace!(url = %response.url(), %status, "daemon response");
        if status.is_success() {
            return Ok(response);
        }
        Err(Self::as_status_error(status, response).await)
    }

    async fn as_status_error(status: StatusCode, response: Response) -> RpcError {
        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .map(|body| body.message);
        RpcError::status(status.as_u16(), message)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> RpcResult<T> {
        let url = self.endpoint(path)?;
        let response = self.send(self.http_client.get(url)).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl NodeApi for RpcClient {
    async fn status(&self) -> RpcResult<NodeStatus> {
        self.get_json("v2/status").await
    }

    async fn wait_for_block_after(&self, round: u64) -> RpcResult<NodeStatus> {
        self.get_json(&format!("v2/status/wait-for-block-after/{round}"))
            .await
    }

    async fn version(&self) -> RpcResult<NodeVersion> {
        self.get_json("versions").await
    }

    async fn metrics_text(&self) -> RpcResult<String> {
        let url = self.endpoint("metrics")?;
        let response = self.send(self.http_client.get(url)).await?;
        Ok(response.text().await?)
    }

    async fn block_header(&self, round: u64) -> RpcResult<BlockHeader> {
        let url = self.endpoint(&format!("v2/blocks/{round}"))?;
        let request = self
            .http_client
            .get(url)
            .query(&[("header-only", "true"), ("format", "json")]);
        let response: BlockHeaderResponse = self.send(request).await?.json().await?;
        Ok(response.block)
    }

    async fn participation_keys(&self) -> RpcResult<Vec<ParticipationKey>> {
        let url = self.endpoint("v2/participation")?;
        let response = self.send(self.http_client.get(url)).await?;
        // An empty body is returned when the node holds no keys
        let body = response.text().await?;
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn participation_key(&self, id: &str) -> RpcResult<ParticipationKey> {
        self.get_json(&format!("v2/participation/{id}")).await
    }

    async fn generate_participation_keys(
        &self,
        address: &str,
        params: &GenerateKeyParams,
    ) -> RpcResult<()> {
        let url = self.endpoint(&format!("v2/participation/generate/{address}"))?;
        let mut query = vec![
            ("first", params.first.to_string()),
            ("last", params.last.to_string()),
        ];
        if let Some(dilution) = params.dilution {
            query.push(("dilution", dilution.to_string()));
        }
        self.send(self.http_client.post(url).query(&query)).await?;
        debug!(%address, first = params.first, last = params.last, "key generation requested");
        Ok(())
    }

    async fn delete_participation_key(&self, id: &str) -> RpcResult<()> {
        let url = self.endpoint(&format!("v2/participation/{id}"))?;
        self.send(self.http_client.delete(url)).await?;
        Ok(())
    }

    async fn account_information(&self, address: &str) -> RpcResult<AccountInformation> {
        let url = self.endpoint(&format!("v2/accounts/{address}"))?;
        let request = self.http_client.get(url).query(&[("exclude", "all")]);
        Ok(self.send(request).await?.json().await?)
    }

    async fn start_catchup(
        &self,
        catchpoint: &str,
        min_rounds: Option<u64>,
    ) -> RpcResult<CatchupStart> {
        let url = self.catchup_endpoint(catchpoint)?;
        let mut request = self.http_client.post(url);
        if let Some(min) = min_rounds {
            request = request.query(&[("min", min.to_string())]);
        }
        let response = self.send(request).await?;
        let newly_started = response.status() == StatusCode::CREATED;
        let body: CatchupMessage = response.json().await?;
        Ok(CatchupStart {
            message: body.catchup_message,
            newly_started,
        })
    }

    async fn abort_catchup(&self, catchpoint: &str) -> RpcResult<String> {
        let url = self.catchup_endpoint(catchpoint)?;
        let response = self.send(self.http_client.delete(url)).await?;
        let body: CatchupMessage = response.json().await?;
        Ok(body.catchup_message)
    }
}

/// `Url::join` replaces the last path segment unless the base ends with `/`
pub(crate) fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
