use crate::model::LoadError;
use crate::source::PriceSource;

use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Reads the price list from a local file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl PriceSource for FileSource {
    async fn fetch(&self) -> Result<String, LoadError> {
        debug!("Reading price list from {}", self.path.display());
        let bytes = tokio::fs::read(&self.path).await?;
        String::from_utf8(bytes).map_err(|_| LoadError::Encoding)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Downloads the price list over HTTP(S).
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LoadError> {
        let client = Client::builder()
            .user_agent(concat!("crop-barter/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait::async_trait]
impl PriceSource for HttpSource {
    async fn fetch(&self) -> Result<String, LoadError> {
        debug!("Downloading price list from {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|_| LoadError::Encoding)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Picks the source kind from the configured location.
pub fn source_for(location: &str, timeout: Duration) -> Result<Box<dyn PriceSource>, LoadError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}
