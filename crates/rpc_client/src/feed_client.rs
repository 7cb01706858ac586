//! Client for the public catchpoint and release feeds.

use crate::rpc_client::with_trailing_slash;
use crate::{PublicFeed, RpcError, RpcResult};
use async_trait::async_trait;
use nodewatch_config::WatchSettings;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

const USER_AGENT: &str = concat!("nodewatch/", env!("CARGO_PKG_VERSION"));

/// Public feed client
#[derive(Debug, Clone)]
pub struct FeedClient {
    catchpoint_base: Url,
    release_url: Url,
    http_client: Client,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatchpointBody {
    Plain(String),
    Object {
        #[serde(rename = "last-catchpoint")]
        last_catchpoint: String,
    },
}

#[derive(Deserialize)]
struct Release {
    tag_name: String,
}

impl FeedClient {
    /// Creates a client for the given feed locations
    pub fn new(catchpoint_base: Url, release_url: Url) -> RpcResult<Self> {
        let http_client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            catchpoint_base: with_trailing_slash(catchpoint_base),
            release_url,
            http_client,
        })
    }

    /// Creates a client from the configured feed URLs
    pub fn from_settings(settings: &WatchSettings) -> RpcResult<Self> {
        Self::new(
            Url::parse(&settings.catchpoint_feed_url)?,
            Url::parse(&settings.release_feed_url)?,
        )
    }
}

#[async_trait]
impl PublicFeed for FeedClient {
    async fn latest_catchpoint(&self, network: &str) -> RpcResult<String> {
        let url = self.catchpoint_base.join(network)?;
        let response = self.http_client.get(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(RpcError::UnsupportedNetwork(network.to_string())),
            status if status.is_success() => {
                let body: CatchpointBody = response.json().await?;
                let catchpoint = match body {
                    CatchpointBody::Plain(catchpoint) => catchpoint,
                    CatchpointBody::Object { last_catchpoint } => last_catchpoint,
                };
                debug!(%network, %catchpoint, "latest catchpoint");
                Ok(catchpoint)
            }
            status => Err(RpcError::status(status.as_u16(), None)),
        }
    }

    async fn latest_release(&self, channel: &str) -> RpcResult<String> {
        let response = self.http_client.get(self.release_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::status(status.as_u16(), None));
        }
        let releases: Vec<Release> = response.json().await?;
        releases
            .into_iter()
            .map(|release| release.tag_name)
            .find(|tag| tag.contains(channel))
            .ok_or_else(|| RpcError::ChannelNotFound(channel.to_string()))
    }
}
