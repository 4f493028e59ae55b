use crate::error::{DctxError, Result};
use crate::figma::{
    parse_payload, FigmaFileResponse, FigmaImageFillsResponse, FigmaNodesResponse,
};
use reqwest::{header::RETRY_AFTER, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.figma.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub enum FigmaAuth {
    PersonalAccessToken(String),
    OAuthToken(String),
}

impl FigmaAuth {
    pub fn from_env() -> Option<Self> {
        if let Ok(token) = std::env::var("FIGMA_TOKEN") {
            if !token.is_empty() {
                return Some(Self::PersonalAccessToken(token));
            }
        }

        if let Ok(token) = std::env::var("FIGMA_OAUTH_TOKEN") {
            if !token.is_empty() {
                return Some(Self::OAuthToken(token));
            }
        }

        None
    }

    fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            FigmaAuth::PersonalAccessToken(token) => builder.header("X-FIGMA-TOKEN", token),
            FigmaAuth::OAuthToken(token) => builder.bearer_auth(token),
        }
    }
}

/// Thin client for the read endpoints the simplifier needs. No retries.
#[derive(Debug, Clone)]
pub struct FigmaClient {
    http: Client,
    auth: FigmaAuth,
    base_url: Url,
}

impl FigmaClient {
    pub fn new(auth: FigmaAuth) -> Result<Self> {
        Self::with_base_url_and_timeout(auth, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_base_url_and_timeout(
        auth: FigmaAuth,
        base_url: impl AsRef<str>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DctxError::Network)?;

        Ok(Self {
            http,
            auth,
            base_url,
        })
    }

    /// `GET /v1/files/:key`, optionally limited to `depth` levels.
    pub async fn fetch_file(&self, file_key: &str, depth: Option<u32>) -> Result<FigmaFileResponse> {
        let mut url = self.endpoint(&format!("/v1/files/{file_key}"))?;
        if let Some(depth) = depth {
            url.query_pairs_mut()
                .append_pair("depth", &depth.to_string());
        }
        tracing::debug!(%url, "fetching Figma file");
        let req = self.authed(self.http.get(url));
        self.send_json(req).await
    }

    /// `GET /v1/files/:key/nodes?ids=...`.
    pub async fn fetch_nodes(
        &self,
        file_key: &str,
        node_ids: &[String],
        depth: Option<u32>,
    ) -> Result<FigmaNodesResponse> {
        validate_node_ids(node_ids, "fetching nodes from Figma")?;

        let mut url = self.endpoint(&format!("/v1/files/{file_key}/nodes"))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ids", &node_ids.join(","));
            if let Some(depth) = depth {
                query.append_pair("depth", &depth.to_string());
            }
        }
        tracing::debug!(%url, "fetching Figma nodes");
        let req = self.authed(self.http.get(url));
        self.send_json(req).await
    }

    /// `GET /v1/files/:key/images`: download URLs of every image fill by `imageRef`.
    pub async fn image_fills(&self, file_key: &str) -> Result<FigmaImageFillsResponse> {
        let url = self.endpoint(&format!("/v1/files/{file_key}/images"))?;
        let req = self.authed(self.http.get(url));
        let response: FigmaImageFillsResponse = self.send_json(req).await?;
        if response.error {
            return Err(DctxError::figma_api(
                response.status.and_then(|s| StatusCode::from_u16(s).ok()),
                "image fill lookup returned an error",
            ));
        }
        Ok(response)
    }

    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().await.map_err(DctxError::Network)?;

        let status = response.status();

        if status.is_success() {
            return response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(DctxError::Network);
        }

        let body = response.text().await.unwrap_or_default();
        Err(DctxError::figma_api(
            Some(status),
            format!(
                "failed to download image (status {}): {}",
                status.as_u16(),
                body
            ),
        ))
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        self.auth.apply(builder)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(DctxError::InvalidUrl)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(DctxError::Network)?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            return parse_payload(&body).map_err(DctxError::Serialization);
        }

        Err(DctxError::figma_api(
            Some(status),
            error_message(status, &body, retry_after.as_deref()),
        ))
    }
}

fn validate_node_ids(node_ids: &[String], context: &str) -> Result<()> {
    if node_ids.is_empty() {
        return Err(DctxError::Config(format!(
            "node_ids cannot be empty when {context}"
        )));
    }
    Ok(())
}

fn error_message(status: StatusCode, body: &str, retry_after: Option<&str>) -> String {
    let fallback = format!("Figma API returned status {}", status.as_u16());
    let parsed = serde_json::from_str::<Value>(body).ok();
    let from_body = parsed
        .as_ref()
        .and_then(|value| value.get("err").or_else(|| value.get("error")))
        .and_then(Value::as_str)
        .map(str::to_owned);

    match (status, retry_after, from_body) {
        (StatusCode::TOO_MANY_REQUESTS, Some(retry), Some(msg)) => {
            format!("{msg} (rate limited, retry after {retry}s)")
        }
        (StatusCode::TOO_MANY_REQUESTS, Some(retry), None) => {
            format!("rate limited by Figma API, retry after {retry}s")
        }
        (_, _, Some(msg)) => msg,
        _ => fallback,
    }
}
