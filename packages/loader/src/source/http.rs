//! HTTP data source.

use std::time::Duration;

use async_trait::async_trait;

use super::DataSource;
use crate::{LoaderError, retry};

/// Fetches files relative to a base URL.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl HttpSource {
    /// Builds a source with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: String, timeout: Duration, max_retries: u32) -> Result<Self, LoaderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            max_retries,
        })
    }

    /// Absolute URL of `path`. Paths that already are URLs pass through.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch_text(&self, path: &str) -> Result<String, LoaderError> {
        let url = self.url_for(path);
        retry::send_text(path, || self.client.get(&url), self.max_retries).await
    }

    fn describe(&self, path: &str) -> String {
        self.url_for(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{Reply, TestServer};

    const KAB: &str = "/data/kab_51.geojson";

    #[test]
    fn joins_base_and_path() {
        let source =
            HttpSource::new("https://peta.example/".to_string(), Duration::from_secs(1), 0).unwrap();
        assert_eq!(
            source.url_for("/data/id51_bali/id5103_badung/id5103020_kuta.geojson"),
            "https://peta.example/data/id51_bali/id5103_badung/id5103020_kuta.geojson"
        );
        assert_eq!(
            source.url_for("https://cdn.example/kab.geojson"),
            "https://cdn.example/kab.geojson"
        );
    }

    #[tokio::test]
    async fn server_error_is_retried_until_success() {
        let server =
            TestServer::start([(KAB.to_string(), vec![Reply::Status(503), Reply::Body("{}".into())])])
                .await;
        let source = HttpSource::new(server.base_url.clone(), Duration::from_secs(5), 2).unwrap();

        assert_eq!(source.fetch_text(KAB).await.unwrap(), "{}");
        assert_eq!(server.hits(KAB), 2);
    }

    #[tokio::test]
    async fn rate_limit_exhausts_retries() {
        let server = TestServer::start([(KAB.to_string(), vec![Reply::Status(429)])]).await;
        let source = HttpSource::new(server.base_url.clone(), Duration::from_secs(5), 1).unwrap();

        let err = source.fetch_text(KAB).await.unwrap_err();
        assert!(matches!(err, LoaderError::Status { status: 429, .. }), "{err}");
        assert_eq!(server.hits(KAB), 2);
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let server = TestServer::start(Vec::<(String, Vec<Reply>)>::new()).await;
        let source = HttpSource::new(server.base_url.clone(), Duration::from_secs(5), 2).unwrap();

        let err = source.fetch_text(KAB).await.unwrap_err();
        assert!(matches!(err, LoaderError::Status { status: 404, .. }), "{err}");
        assert_eq!(server.hits(KAB), 1);
    }
}
