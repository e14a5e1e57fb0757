// src/onboard/transport.rs

//! HTTP transport for the upload server

use super::{OnboardError, UploadState, UploadTransport};
use crate::config::OnboardConfig;
use reqwest::blocking::{Client, RequestBuilder, Response, multipart};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default timeout for a single HTTP request
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct UploadReply {
    transaction_id: String,
}

/// Upload server reached over HTTP(S) with `reqwest`
pub struct HttpTransport {
    client: Client,
    base: Url,
    credentials: Option<(String, Option<String>)>,
}

impl HttpTransport {
    /// Create a transport for `base` (for example `http://127.0.0.1:4567/`)
    pub fn new(base: Url, accept_invalid_certs: bool) -> Result<Self, OnboardError> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| OnboardError::Http(format!("Failed to create HTTP client: {e}")))?;

        // Url::join replaces the last segment unless the path ends in '/'
        let mut base = base;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            client,
            base,
            credentials: None,
        })
    }

    /// Build a transport from the `[onboard]` configuration section
    pub fn from_config(config: &OnboardConfig) -> Result<Self, OnboardError> {
        let base = config
            .base_url()
            .map_err(|e| OnboardError::Http(e.to_string()))?;
        let transport = Self::new(base, config.accept_invalid_certs)?;
        Ok(match &config.username {
            Some(user) => transport.with_basic_auth(user, config.password.clone()),
            None => transport,
        })
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.credentials = Some((username.into(), password));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, OnboardError> {
        self.base
            .join(path)
            .map_err(|e| OnboardError::Http(format!("Invalid endpoint {}: {}", path, e)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, password.as_deref()),
            None => request,
        }
    }

    fn check(response: Response, url: &Url) -> Result<Response, OnboardError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(OnboardError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

impl UploadTransport for HttpTransport {
    fn post_upload(&self, file: &Path, update: bool) -> Result<String, OnboardError> {
        let url = self.endpoint(if update { "api/update" } else { "api/upload" })?;
        let form = multipart::Form::new()
            .file("package", file)
            .map_err(|e| OnboardError::Io(format!("Failed to read {}: {}", file.display(), e)))?;

        info!("Uploading {} to {}", file.display(), url);
        let response = self
            .authorize(self.client.post(url.clone()))
            .multipart(form)
            .send()
            .map_err(|e| OnboardError::Http(format!("POST {} failed: {}", url, e)))?;
        let reply: UploadReply = Self::check(response, &url)?
            .json()
            .map_err(|e| OnboardError::Protocol(format!("Unexpected reply from {}: {}", url, e)))?;

        debug!("Upload accepted as transaction {}", reply.transaction_id);
        Ok(reply.transaction_id)
    }

    fn upload_state(&self, transaction_id: &str) -> Result<UploadState, OnboardError> {
        let url = self.endpoint(&format!("api/upload/{}/state", transaction_id))?;
        let response = self
            .authorize(self.client.get(url.clone()))
            .send()
            .map_err(|e| OnboardError::Http(format!("GET {} failed: {}", url, e)))?;
        Self::check(response, &url)?
            .json()
            .map_err(|e| OnboardError::Protocol(format!("Unexpected reply from {}: {}", url, e)))
    }
}
