use gloo_net::http::Request;
use scene::{FeatureSource, FetchError};

/// Fetches feature data with the browser's `fetch`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpSource;

impl FeatureSource for HttpSource {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let resp = Request::get(url)
            .send()
            .await
            .map_err(|e| FetchError::new(e.to_string()))?;
        if !resp.ok() {
            return Err(FetchError::new(format!(
                "HTTP {} {}",
                resp.status(),
                resp.status_text()
            )));
        }
        resp.text().await.map_err(|e| FetchError::new(e.to_string()))
    }
}
