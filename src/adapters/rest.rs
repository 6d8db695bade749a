use crate::domain::ports::KvStore;
use crate::utils::error::{LeaderboardError, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

/// Redis-over-HTTP store speaking the Upstash / Vercel KV REST dialect:
///
/// - `GET  {url}/get/{key}` -> `{"result": "<value>" | null}`
/// - `POST {url}/set/{key}` with the raw value as body
/// - `POST {url}/del/{key}`
#[derive(Debug, Clone)]
pub struct RestKv {
    base_url: Url,
    token: Option<String>,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl RestKv {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| LeaderboardError::InvalidConfigValueError {
            field: "store.url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
            client,
        })
    }

    fn command_url(&self, command: &str, key: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LeaderboardError::ConfigError {
                message: format!("store.url '{}' cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .push(command)
            .push(key);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder, command: &str) -> Result<RestReply> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("KV {} responded with {}", command, status);

        let body = response.text().await?;
        let reply: Option<RestReply> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let detail = reply
                .and_then(|r| r.error)
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(LeaderboardError::store(
                "rest",
                format!("{} failed with status {}: {}", command, status, detail),
            ));
        }

        match reply {
            Some(RestReply {
                error: Some(error), ..
            }) => Err(LeaderboardError::store("rest", error)),
            Some(reply) => Ok(reply),
            None => Err(LeaderboardError::store(
                "rest",
                format!("{} returned a non-JSON body", command),
            )),
        }
    }
}

#[async_trait]
impl KvStore for RestKv {
    fn backend(&self) -> &'static str {
        "rest"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let url = self.command_url("get", key)?;
        let reply = self.send(self.client.get(url), "get").await?;

        Ok(match reply.result {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(value)) => Some(value),
            // some proxies hand back already-decoded JSON
            Some(other) => Some(other.to_string()),
        })
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let url = self.command_url("set", key)?;
        self.send(self.client.post(url).body(value.to_string()), "set")
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let url = self.command_url("del", key)?;
        self.send(self.client.post(url), "del").await?;
        Ok(())
    }
}
