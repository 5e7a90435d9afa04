use anyhow::anyhow;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::StorageConfig;

/// Object storage that player pictures are uploaded to.
///
/// We only ever talk to Supabase Storage, but anything that can store a blob under a path and
/// hand back a public link can implement this.
#[allow(async_fn_in_trait)]
pub trait ObjectStorage {
    /// Uploads `bytes` under `path` and returns the path the object was stored at.
    async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<String>;

    /// Removes a previously uploaded object.
    async fn remove_object(&self, path: &str) -> anyhow::Result<()>;

    /// The publicly reachable URL of a stored object.
    fn public_url(&self, path: &str) -> String;
}

/// The storage API endpoint to send requests to.
#[derive(Debug, Clone)]
pub struct Endpoint {
    url: String,
}

impl Endpoint {
    fn new(url: String) -> Self {
        Self { url }
    }

    /// Append a path to the endpoint, e.g. `object/images/public/players/1-me.png`.
    fn append_path(&self, path: &str) -> String {
        let mut full_url = self.url.clone();

        full_url.push_str(path);

        full_url
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
}

/// The key reported for a successful upload, if the body carries one.
fn uploaded_key(body: &str) -> Option<String> {
    serde_json::from_str::<UploadResponse>(body)
        .ok()
        .and_then(|uploaded| uploaded.key)
}

/// The JSON body the storage API answers failed requests with.
#[derive(Debug, Deserialize)]
struct StorageErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Pulls the human readable part out of an error response, falling back to the raw body.
fn error_details(body: &str) -> String {
    match serde_json::from_str::<StorageErrorBody>(body) {
        Ok(StorageErrorBody {
            message: Some(message),
            error,
        }) => match error {
            Some(error) => format!("{}: {}", error, message),
            None => message,
        },
        _ => body.to_string(),
    }
}

/// Supabase Storage, accessed over its REST API.
#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    /// Service key used for both the `Authorization` and `apikey` headers.
    key: String,
    bucket: String,
    /// The reqwest client used to make HTTP requests to the storage API.
    client: Client,
    /// `{base}/storage/v1/`
    endpoint: Endpoint,
}

impl SupabaseStorage {
    /// Create a new storage client from the configuration.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            key: config.service_key.clone(),
            bucket: config.bucket.clone(),
            client: Client::new(),
            endpoint: Endpoint::new(format!("{}/storage/v1/", config.public_base_url)),
        }
    }

    fn object_url(&self, path: &str) -> String {
        self.endpoint
            .append_path(&format!("object/{}/{}", self.bucket, encode_path(path)))
    }

    async fn check(response: Response, action: &str, path: &str) -> anyhow::Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(anyhow!(
            "Failed to {} object {} with status code {}\n\nResponse details: {}",
            action,
            path,
            status,
            error_details(&body)
        ))
    }
}

impl ObjectStorage for SupabaseStorage {
    async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<String> {
        let response = self
            .client
            .post(self.object_url(path))
            .bearer_auth(&self.key)
            .header("apikey", &self.key)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        let response = Self::check(response, "upload", path).await?;
        // The object is stored at this point, whatever the body says.
        let body = response.text().await.unwrap_or_default();
        match uploaded_key(&body) {
            Some(key) => debug!("Uploaded object {}", key),
            None => warn!("Uploaded object {} with an unexpected response: {}", path, body),
        }

        Ok(path.to_string())
    }

    async fn remove_object(&self, path: &str) -> anyhow::Result<()> {
        let response = self
            .client
            .delete(self.object_url(path))
            .bearer_auth(&self.key)
            .header("apikey", &self.key)
            .send()
            .await?;

        Self::check(response, "remove", path).await?;

        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        self.endpoint
            .append_path(&format!("object/public/{}/{}", self.bucket, encode_path(path)))
    }
}

/// Percent-encodes every segment of an object path, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
