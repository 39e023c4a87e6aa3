//! Yandex.Disk REST API client
//!
//! Only the three calls the bot needs:
//! - `GET  /resources?path=...` to check existence
//! - `PUT  /resources?path=...` to create a directory
//! - `GET  /resources/upload?path=...&overwrite=false`, then `PUT` the file
//!   body to the returned `href`

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{DiskApi, DiskError};
use crate::core::config::YaDiskConfig;

/// Upload target returned by `/resources/upload`
#[derive(Debug, Deserialize)]
struct UploadLink {
    href: String,
}

/// Error body of the Yandex.Disk API
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    description: String,
}

pub struct YandexDisk {
    client: Client,
    api_url: String,
    token: SecretString,
}

impl YandexDisk {
    pub fn new(config: &YaDiskConfig) -> Result<Self, DiskError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::with_client(
            client,
            &config.api_url,
            SecretString::from(config.token.expose_secret().to_owned()),
        ))
    }

    pub fn with_client(client: Client, api_url: &str, token: SecretString) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn auth_header(&self) -> String {
        format!("OAuth {}", self.token.expose_secret())
    }

    fn resources_url(&self) -> String {
        format!("{}/resources", self.api_url)
    }
}

#[async_trait]
impl DiskApi for YandexDisk {
    async fn exists(&self, path: &str) -> Result<bool, DiskError> {
        let resp = self
            .client
            .get(self.resources_url())
            .query(&[("path", path), ("fields", "path")])
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await?;

        match resp.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(api_error(resp).await),
        }
    }

    async fn mkdir(&self, path: &str) -> Result<(), DiskError> {
        let resp = self
            .client
            .put(self.resources_url())
            .query(&[("path", path)])
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await?;

        match resp.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(conflict_error(resp, path).await),
            _ => Err(api_error(resp).await),
        }
    }

    async fn upload(&self, local_path: &Path, path: &str) -> Result<(), DiskError> {
        let resp = self
            .client
            .get(format!("{}/upload", self.resources_url()))
            .query(&[("path", path), ("overwrite", "false")])
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await?;

        let link: UploadLink = match resp.status() {
            status if status.is_success() => resp.json().await?,
            StatusCode::CONFLICT => return Err(conflict_error(resp, path).await),
            _ => return Err(api_error(resp).await),
        };

        let body = fs_err::tokio::read(local_path).await?;
        log::debug!("Uploading {} bytes to {}", body.len(), path);

        // The upload href is pre-signed, it must not carry the OAuth header
        let resp = self.client.put(&link.href).body(body).send().await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        Ok(())
    }
}

/// 409 codes meaning the target path is already taken. Other conflicts, such
/// as `DiskPathDoesntExistsError` for a missing parent, stay API errors.
const PATH_TAKEN_CODES: &[&str] = &["DiskResourceAlreadyExistsError", "DiskPathPointsToExistentDirectoryError"];

async fn conflict_error(resp: Response, path: &str) -> DiskError {
    match api_error(resp).await {
        DiskError::Api { code, .. } if PATH_TAKEN_CODES.contains(&code.as_str()) => {
            DiskError::PathExists(path.to_string())
        }
        other => other,
    }
}

async fn api_error(resp: Response) -> DiskError {
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let description = if body.description.is_empty() { text } else { body.description };

    log::warn!("Yandex.Disk API error {} {}: {}", status, body.error, description);
    DiskError::Api {
        status,
        code: body.error,
        description,
    }
}
