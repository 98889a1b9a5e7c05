mod http;
mod local;

pub use http::HttpSource;
pub use local::LocalFileSource;

use anyhow::Result;
use async_trait::async_trait;

/// Where a backup archive (or a bare database) comes from.
#[async_trait]
pub trait BackupSource: Send + Sync {
    /// Fetch the complete file.
    async fn fetch(&self) -> Result<Vec<u8>>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Pick a source for `location`: HTTP(S) URLs are downloaded, anything
/// else is read from disk.
pub fn source_for(location: &str) -> Result<Box<dyn BackupSource>> {
    if is_http_url(location) {
        Ok(Box::new(HttpSource::new(location.to_string())?))
    } else {
        Ok(Box::new(LocalFileSource::new(location)))
    }
}

pub fn is_http_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}
