//! Fetching of county boundary polygons.

mod basic;
mod boundary;
mod client;

pub use basic::BasicClient;
pub use boundary::{
    BoundarySource, CachedBoundaries, FileBoundarySource, HttpBoundarySource, fetch_or_degrade,
    parse_boundaries,
};
pub use client::HttpClient;

use tracing::debug;

use crate::error::{FoodAccessError, Result};

/// True when `source` is an absolute `http` or `https` URL rather than a path.
pub fn is_remote(source: &str) -> bool {
    reqwest::Url::parse(source).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Issues a GET for `url` and returns the body, failing on a non-success status.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let parsed = url
        .parse::<reqwest::Url>()
        .map_err(|e| FoodAccessError::InvalidParameter(format!("bad URL {url:?}: {e}")))?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FoodAccessError::BoundaryStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = resp.bytes().await?;
    debug!(url, bytes = bytes.len(), "Response body received");
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::{Request, Response};

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "25025", "properties": {}, "geometry": null},
            {"type": "Feature", "id": "25019", "properties": {}, "geometry": null}
        ]
    }"#;

    /// Answers every request with the same status and body.
    struct StaticClient {
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl HttpClient for StaticClient {
        async fn execute(&self, _req: Request) -> reqwest::Result<Response> {
            let resp = http::Response::builder()
                .status(self.status)
                .body(self.body)
                .unwrap();
            Ok(Response::from(resp))
        }
    }

    #[tokio::test]
    async fn test_fetch_bytes_error_status() {
        let client = StaticClient {
            status: 503,
            body: "unavailable",
        };
        let err = fetch_bytes(&client, "https://example.com/counties.json")
            .await
            .unwrap_err();

        match err {
            FoodAccessError::BoundaryStatus { url, status } => {
                assert_eq!(status, 503);
                assert_eq!(url, "https://example.com/counties.json");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_bytes_bad_url() {
        let client = StaticClient {
            status: 200,
            body: SAMPLE,
        };
        let err = fetch_bytes(&client, "not a url").await.unwrap_err();
        assert!(matches!(err, FoodAccessError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_fetch_bytes_returns_body() {
        let client = StaticClient {
            status: 200,
            body: "hello",
        };
        let bytes = fetch_bytes(&client, "http://localhost/x").await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn test_http_source_parses_collection() {
        let source = HttpBoundarySource {
            client: StaticClient {
                status: 200,
                body: SAMPLE,
            },
            url: "https://example.com/counties.json".to_string(),
        };

        let collection = source.fetch().await.unwrap();
        assert_eq!(collection.features.len(), 2);
    }

    #[tokio::test]
    async fn test_http_source_error_status() {
        let source = HttpBoundarySource {
            client: StaticClient {
                status: 503,
                body: "",
            },
            url: "https://example.com/counties.json".to_string(),
        };

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, FoodAccessError::BoundaryStatus { status: 503, .. }));
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/geojson-counties-fips.json"));
        assert!(is_remote("http://localhost:8080/counties.json"));
        assert!(!is_remote("http_boundaries.geojson"));
        assert!(!is_remote("httpdata/counties.geojson"));
        assert!(!is_remote("/tmp/counties.geojson"));
        assert!(!is_remote("file:///tmp/counties.geojson"));
    }
}
