//! `VfsApi` over HTTP.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_TYPE, LAST_MODIFIED};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use vfstree_kernel::{ApiError, ApiResult, VfsApi};
use vfstree_types::{DeleteResponse, DirectoryListing, UploadResponse, VolumeListing};

use crate::config::{ClientConfig, ClientError};
use crate::routes::{self, Target};

/// Statuses a server uses to say it has no directory support.
const UNSUPPORTED: [StatusCode; 2] = [StatusCode::METHOD_NOT_ALLOWED, StatusCode::NOT_IMPLEMENTED];

/// HTTP-date, as sent in `Last-Modified`.
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Talks to one device.
#[derive(Debug, Clone)]
pub struct HttpVfsApi {
    client: Client,
    base: Url,
}

impl HttpVfsApi {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base: config.url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    async fn send(&self, method: Method, url: Url, request: RequestBuilder) -> ApiResult<Response> {
        tracing::debug!("{} {}", method, url);

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let is_text = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/plain"));
        let text = if is_text {
            response.text().await.ok().map(|t| t.trim_end().to_string())
        } else {
            None
        };

        Err(ApiError::Status {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            text,
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let response = self
            .send(Method::GET, url.clone(), self.client.get(url))
            .await?;
        decode(response).await
    }

    async fn delete(&self, url: Url) -> ApiResult<DeleteResponse> {
        let response = self
            .send(Method::DELETE, url.clone(), self.client.delete(url))
            .await?;
        decode_or_default(response).await
    }
}

async fn body(response: Response) -> ApiResult<Vec<u8>> {
    response
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| ApiError::Transport(e.to_string()))
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = body(response).await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Like [`decode`], but an empty body is the default value.
async fn decode_or_default<T: DeserializeOwned + Default>(response: Response) -> ApiResult<T> {
    let bytes = body(response).await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

fn http_date(mtime: DateTime<Utc>) -> String {
    mtime.format(HTTP_DATE).to_string()
}

#[async_trait]
impl VfsApi for HttpVfsApi {
    async fn list_volumes(&self) -> ApiResult<Vec<VolumeListing>> {
        let volumes: Vec<VolumeListing> = self.get(routes::volumes(&self.base)?).await?;
        tracing::info!("listed {} volumes", volumes.len());
        Ok(volumes)
    }

    async fn get_volume_root(&self, volume: &str) -> ApiResult<VolumeListing> {
        self.get(routes::entry(&self.base, volume, "", Target::Directory)?)
            .await
    }

    async fn list_directory(&self, volume: &str, dir: &str) -> ApiResult<DirectoryListing> {
        self.get(routes::entry(&self.base, volume, dir, Target::Directory)?)
            .await
    }

    async fn create_directory(&self, volume: &str, dir: &str) -> ApiResult<DirectoryListing> {
        let url = routes::entry(&self.base, volume, dir, Target::Directory)?;
        let result = self
            .send(Method::PUT, url.clone(), self.client.put(url))
            .await;

        match result {
            Ok(response) => decode(response).await,
            Err(ApiError::Status { status, .. })
                if UNSUPPORTED.iter().any(|s| s.as_u16() == status) =>
            {
                Err(ApiError::unsupported(format!("mkdir {volume}:{dir}")))
            }
            Err(e) => Err(e),
        }
    }

    async fn upload_file(
        &self,
        volume: &str,
        path: &str,
        content: Vec<u8>,
        mtime: Option<DateTime<Utc>>,
    ) -> ApiResult<UploadResponse> {
        let url = routes::entry(&self.base, volume, path, Target::File)?;
        let mut request = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content);
        if let Some(mtime) = mtime {
            request = request.header(LAST_MODIFIED, http_date(mtime));
        }

        let response = self.send(Method::PUT, url, request).await?;
        decode(response).await
    }

    async fn delete_entry(&self, volume: &str, path: &str) -> ApiResult<DeleteResponse> {
        self.delete(routes::entry(&self.base, volume, path, Target::File)?)
            .await
    }

    async fn delete_directory(&self, volume: &str, path: &str) -> ApiResult<DeleteResponse> {
        self.delete(routes::entry(&self.base, volume, path, Target::Directory)?)
            .await
    }
}
