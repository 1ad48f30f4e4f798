use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use self::model::{QueryDatabaseResp, RetrieveDatabaseResp};

pub mod model;
pub mod props;

const NOTION_API_BASE: &str = "https://api.notion.com/";
pub const NOTION_VERSION: &str = "2022-06-28";

/// All remote calls share one fixed timeout; there is no retry or backoff.
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("notion error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to reach Notion: {0}")]
    Transport(String),
    #[error("invalid Notion response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Raw response text for display to the user; transport and decode
    /// failures fall back to their message.
    pub fn display_text(&self) -> String {
        match self {
            ApiError::Status { body, .. } if !body.is_empty() => body.clone(),
            other => other.to_string(),
        }
    }
}

/// The four endpoints this crate touches, behind a trait so the gateway can
/// run against a recording mock in tests.
#[async_trait]
pub trait NotionApi: Send + Sync {
    async fn query_database(
        &self,
        database_id: &str,
        body: Value,
    ) -> Result<QueryDatabaseResp, ApiError>;

    async fn retrieve_database(&self, database_id: &str) -> Result<RetrieveDatabaseResp, ApiError>;

    /// Create a page; returns the new page id.
    async fn create_page(&self, body: Value) -> Result<String, ApiError>;

    /// Patch a page's properties.
    async fn update_page(&self, page_id: &str, properties: Value) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    base_url: Url,
    token: String,
    version: String,
}

impl fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl NotionClient {
    pub fn new(token: String, version: String) -> Self {
        let base_url = Url::parse(NOTION_API_BASE).expect("valid default Notion URL");
        Self::with_base_url(token, version, base_url)
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.token.clone().unwrap_or_default(), cfg.version.clone())
    }

    pub fn with_base_url(token: String, version: String, base_url: Url) -> Self {
        let http = Client::builder()
            .user_agent("readtrack/0.1")
            .timeout(HTTP_TIMEOUT)
            .no_proxy()
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            token,
            version,
        }
    }

    pub fn build_page_request(&self, body: &Value) -> Result<reqwest::Request, ApiError> {
        let endpoint = self.endpoint("v1/pages")?;
        self.authorize(self.http.post(endpoint))
            .header("Content-Type", "application/json")
            .json(body)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Transport(format!("invalid Notion URL: {e}")))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", &self.version)
    }

    async fn read_success(res: reqwest::Response) -> Result<String, ApiError> {
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!("rate limited by Notion: {}", body);
            } else {
                warn!(%status, "notion request failed: {}", body);
            }
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        res.text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl NotionApi for NotionClient {
    async fn query_database(
        &self,
        database_id: &str,
        body: Value,
    ) -> Result<QueryDatabaseResp, ApiError> {
        let url = self.endpoint(&format!("v1/databases/{database_id}/query"))?;
        debug!(%url, payload = %body, "querying notion database");
        let res = self
            .authorize(self.http.post(url))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let text = Self::read_success(res).await?;
        decode(&text)
    }

    async fn retrieve_database(&self, database_id: &str) -> Result<RetrieveDatabaseResp, ApiError> {
        let url = self.endpoint(&format!("v1/databases/{database_id}"))?;
        debug!(%url, "retrieving notion database schema");
        let res = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let text = Self::read_success(res).await?;
        decode(&text)
    }

    async fn create_page(&self, body: Value) -> Result<String, ApiError> {
        let request = self.build_page_request(&body)?;
        debug!(url = %request.url(), payload = %body, "creating notion page");
        let res = self
            .http
            .execute(request)
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let text = Self::read_success(res).await?;
        let payload: CreatePageResponse = decode(&text)?;
        Ok(payload.id)
    }

    async fn update_page(&self, page_id: &str, properties: Value) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("v1/pages/{page_id}"))?;
        let body = json!({ "properties": properties });
        debug!(%url, payload = %body, "updating notion page");
        let res = self
            .authorize(self.http.patch(url))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Self::read_success(res).await?;
        Ok(())
    }
}

#[derive(serde::Deserialize)]
struct CreatePageResponse {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn build_page_request_sets_headers() {
        let client = NotionClient::new("token".into(), NOTION_VERSION.into());
        let body = json!({ "sample": true });
        let request = client.build_page_request(&body).unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().path(), "/v1/pages");
        let headers = request.headers();
        assert_eq!(
            headers
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "Bearer token"
        );
        assert_eq!(
            headers
                .get("Notion-Version")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            NOTION_VERSION
        );
        assert_eq!(
            headers
                .get("Content-Type")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "application/json"
        );
    }

    #[test]
    fn display_text_surfaces_raw_response_body() {
        let err = ApiError::Status {
            status: 400,
            body: "validation_error: Name is not a property".into(),
        };
        assert_eq!(err.display_text(), "validation_error: Name is not a property");

        let empty = ApiError::Status {
            status: 502,
            body: String::new(),
        };
        assert_eq!(empty.display_text(), "notion error 502: ");

        let transport = ApiError::Transport("connection refused".into());
        assert_eq!(
            transport.display_text(),
            "failed to reach Notion: connection refused"
        );
    }
}
