//! HTTP client wrapper over `reqwest`.
//!
//! One GET per operation, no internal retries. A failed request abandons the
//! current sync cycle; the next externally-triggered cycle is the retry.

use reqwest::{Client, Response};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::{Result, SyncError};

const DEFAULT_USER_AGENT: &str = concat!("vellum-sync/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            user_agent: config.user_agent,
        })
    }

    /// Perform a plain GET. The response is returned whatever its status;
    /// callers inspect the status code themselves.
    pub async fn get(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;
        Ok(response)
    }

    /// GET with a single extra request header.
    pub async fn get_with_header(&self, url: &str, name: &str, value: &str) -> Result<Response> {
        let response = self.client.get(url).header(name, value).send().await?;
        Ok(response)
    }

    /// Download a file to `dest`, streaming the body to disk.
    ///
    /// The destination file is only created for a successful status, and is
    /// removed again if the transfer fails partway, so a failed download
    /// never leaves a partial file behind.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self.get(url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if let Err(e) = write_body(response, dest).await {
            let _ = tokio::fs::remove_file(dest).await;
            return Err(e);
        }

        Ok(())
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

async fn write_body(response: Response, dest: &Path) -> Result<()> {
    use futures_util::StreamExt;

    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;

    Ok(())
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}
