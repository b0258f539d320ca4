//! REST API client for the gestoría backend.
//!
//! One shared `ApiClient` wraps reqwest with bearer auth and JSON helpers.
//! Each resource module adds typed wrappers on top of it:
//! - clientes: clients, departments, notification schedules
//! - documental: categories, documents, uploaded files
//! - metadatos: document tags
//! - personas: people and admin roles
//! - procesos: client processes, milestones, fulfillments
//!
//! Timeouts and retries are left at reqwest's defaults.

pub mod clientes;
pub mod documental;
pub mod metadatos;
pub mod personas;
pub mod procesos;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::ApiError;
use crate::types::{Config, ListParams, Page};

/// A downloaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    /// Filename from `Content-Disposition`, when the server sends one
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>")).finish()
    }
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: normalize_base_url(&config.api_base_url)?,
            token: config.token.clone(),
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path (with or without leading slash) against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match self.token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        log::debug!("API error {}: {}", status, body);
        Err(ApiError::from_status(status, body))
    }

    async fn json_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        log::debug!("GET {}", url);
        let resp = self.send(self.request(reqwest::Method::GET, url).query(query)).await?;
        Self::json_body(resp).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        log::debug!("POST {}", url);
        let resp = self.send(self.request(reqwest::Method::POST, url).json(body)).await?;
        Self::json_body(resp).await
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        log::debug!("PUT {}", url);
        let resp = self.send(self.request(reqwest::Method::PUT, url).json(body)).await?;
        Self::json_body(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        log::debug!("DELETE {}", url);
        self.send(self.request(reqwest::Method::DELETE, url)).await?;
        Ok(())
    }

    /// GET a list endpoint. A 404 is an empty result, not an error.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ListParams,
        extra: &[(&str, String)],
    ) -> Result<Page<T>, ApiError> {
        let mut query: Vec<(&str, String)> = params.to_query();
        query.extend(extra.iter().cloned());
        match self.get_json::<Page<T>>(path, &query).await {
            Ok(page) => Ok(page),
            Err(ApiError::NotFound(_)) => {
                log::debug!("{} returned 404, treating as empty list", path);
                Ok(Page::empty())
            }
            Err(e) => Err(e),
        }
    }

    /// POST a `multipart/form-data` body.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        log::debug!("POST (multipart) {}", url);
        let resp = self.send(self.request(reqwest::Method::POST, url).multipart(form)).await?;
        Self::json_body(resp).await
    }

    /// GET a binary payload.
    pub async fn download(&self, path: &str) -> Result<Blob, ApiError> {
        let url = self.endpoint(path)?;
        log::debug!("GET (download) {}", url);
        let resp = self.send(self.request(reqwest::Method::GET, url)).await?;
        let headers = resp.headers();
        let filename = headers
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok()).and_then(filename_from_disposition);
        let content_type = headers
            .get(reqwest::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(str::to_string);
        let bytes = resp.bytes().await?.to_vec();
        Ok(Blob {
            bytes,
            filename,
            content_type,
        })
    }
}

/// Parse the base URL, making sure it ends in `/` so joins append instead of replace.
fn normalize_base_url(raw: &str) -> Result<Url, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Config("apiBaseUrl is empty".to_string()));
    }
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Ok(Url::parse(&with_slash)?)
}

/// Extract `filename` from a `Content-Disposition` header value.
fn filename_from_disposition(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|part| {
        let (key, raw) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let name = raw.trim().trim_matches('"');
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    })
}

/// Build a multipart part from raw bytes, setting the MIME type when known.
pub(crate) fn file_part(
    bytes: Vec<u8>,
    filename: &str,
    mime_type: Option<&str>,
) -> Result<reqwest::multipart::Part, ApiError> {
    let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
    match mime_type {
        Some(mime) => Ok(part.mime_str(mime)?),
        None => Ok(part),
    }
}
