//! REST client for the object storage backend.
//!
//! One retrieval strategy: an authorized GET (or HEAD) of
//! `{base}/storage/v1/object/{bucket}/{key}`. Byte-range requests pass the
//! client's `Range` header through untouched. Non-success statuses are NOT
//! errors here; the gateway passes them through to its own client, so only
//! network-level failures surface as `Err`.

use reqwest::header::RANGE;
use reqwest::{Client, Response};
use studygate_core::{Error, Result};

const SERVICE: &str = "storage";

/// Client for the object storage backend.
#[derive(Clone)]
pub struct ObjectStoreClient {
    http: Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl ObjectStoreClient {
    #[must_use]
    pub fn new(
        http: Client,
        base_url: &str,
        service_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            bucket: bucket.into(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, key
        )
    }

    /// Stream an object, forwarding an optional byte-range header.
    pub async fn fetch(&self, key: &str, range: Option<&str>) -> Result<Response> {
        let url = self.object_url(key);
        let mut request = self.http.get(&url).bearer_auth(&self.service_key);
        if let Some(range) = range {
            request = request.header(RANGE, range);
        }
        request
            .send()
            .await
            .map_err(|e| Error::upstream(SERVICE, url, e.to_string()))
    }

    /// Fetch object metadata without the body.
    pub async fn head(&self, key: &str) -> Result<Response> {
        let url = self.object_url(key);
        self.http
            .head(&url)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| Error::upstream(SERVICE, url, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_forwards_the_range_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/object/resources/sem1/limits.pdf"))
            .and(header("range", "bytes=0-99"))
            .and(header("authorization", "Bearer svc-key"))
            .respond_with(
                ResponseTemplate::new(206)
                    .insert_header("content-range", "bytes 0-99/1000")
                    .set_body_bytes(vec![0u8; 100]),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ObjectStoreClient::new(Client::new(), &server.uri(), "svc-key", "resources");
        let response = client
            .fetch("sem1/limits.pdf", Some("bytes=0-99"))
            .await
            .expect("fetch should succeed");

        assert_eq!(response.status().as_u16(), 206);
        assert_eq!(response.bytes().await.expect("body").len(), 100);
    }

    #[tokio::test]
    async fn non_success_status_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/object/resources/missing.pdf"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Object not found"))
            .mount(&server)
            .await;

        let client = ObjectStoreClient::new(Client::new(), &server.uri(), "svc-key", "resources");
        let response = client
            .fetch("missing.pdf", None)
            .await
            .expect("transport level must succeed");
        assert_eq!(response.status().as_u16(), 404);
    }

    #[tokio::test]
    async fn head_carries_auth_but_no_range() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/storage/v1/object/resources/sem1/limits.pdf"))
            .and(header("authorization", "Bearer svc-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .insert_header("content-length", "1000"),
            )
            .mount(&server)
            .await;

        let client = ObjectStoreClient::new(Client::new(), &server.uri(), "svc-key", "resources");
        let response = client.head("sem1/limits.pdf").await.expect("head");
        assert_eq!(response.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_upstream_error() {
        let client =
            ObjectStoreClient::new(Client::new(), "http://127.0.0.1:1", "svc-key", "resources");
        let err = client.fetch("any.pdf", None).await.expect_err("must fail");
        assert!(matches!(err, Error::Upstream { .. }));
    }
}
