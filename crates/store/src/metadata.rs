//! REST client for the resource metadata store.
//!
//! The store speaks a PostgREST-style API: one `resources` table queried
//! with `column=eq.value` filters, a `select` projection, and
//! `order`/`limit`/`offset` paging. Authentication is a service key sent
//! both as `apikey` and bearer token.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use studygate_core::{Error, Result};

const SERVICE: &str = "metadata";
const SELECT_COLUMNS: &str =
    "id,filename,title,storage_key,content_type,course,semester,subject,unit,type,updated_at";

/// One row of the `resources` table. Nullable columns are explicit options;
/// nothing here is duck-typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub storage_key: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Semantic addressing of a resource by its four path columns.
#[derive(Debug, Clone)]
pub struct ResourcePath {
    pub semester: String,
    pub subject: String,
    pub unit: String,
    pub filename: String,
}

/// Equality filters plus paging for a listing query.
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    pub course: Option<String>,
    pub semester: Option<String>,
    pub subject: Option<String>,
    pub kind: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ResourceFilter {
    fn default() -> Self {
        Self {
            course: None,
            semester: None,
            subject: None,
            kind: None,
            limit: studygate_core::constants::LIST_LIMIT_DEFAULT,
            offset: 0,
        }
    }
}

/// Client for the metadata store.
#[derive(Clone)]
pub struct MetadataClient {
    http: Client,
    resources_url: String,
    api_key: String,
}

impl MetadataClient {
    #[must_use]
    pub fn new(http: Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            http,
            resources_url: format!("{}/rest/v1/resources", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
        }
    }

    /// Fetch a single resource row by id.
    pub async fn fetch_by_id(&self, id: &str) -> Result<Option<ResourceRecord>> {
        self.fetch_one(vec![("id".to_string(), format!("eq.{id}"))])
            .await
    }

    /// Fetch a single resource row by its semantic path.
    pub async fn fetch_by_path(&self, path: &ResourcePath) -> Result<Option<ResourceRecord>> {
        self.fetch_one(vec![
            ("semester".to_string(), format!("eq.{}", path.semester)),
            ("subject".to_string(), format!("eq.{}", path.subject)),
            ("unit".to_string(), format!("eq.{}", path.unit)),
            ("filename".to_string(), format!("eq.{}", path.filename)),
        ])
        .await
    }

    /// List resource rows matching `filter`, ordered by filename.
    pub async fn list(&self, filter: &ResourceFilter) -> Result<Vec<ResourceRecord>> {
        let mut params = vec![("select".to_string(), SELECT_COLUMNS.to_string())];
        for (column, value) in [
            ("course", &filter.course),
            ("semester", &filter.semester),
            ("subject", &filter.subject),
            ("type", &filter.kind),
        ] {
            if let Some(value) = value {
                params.push((column.to_string(), format!("eq.{value}")));
            }
        }
        params.push(("order".to_string(), "filename.asc".to_string()));
        params.push(("limit".to_string(), filter.limit.to_string()));
        params.push(("offset".to_string(), filter.offset.to_string()));

        self.query(params).await
    }

    async fn fetch_one(
        &self,
        mut params: Vec<(String, String)>,
    ) -> Result<Option<ResourceRecord>> {
        params.insert(0, ("select".to_string(), SELECT_COLUMNS.to_string()));
        params.push(("limit".to_string(), "1".to_string()));

        let rows = self.query(params).await?;
        Ok(rows.into_iter().next())
    }

    async fn query(&self, params: Vec<(String, String)>) -> Result<Vec<ResourceRecord>> {
        let response = self
            .http
            .get(&self.resources_url)
            .query(&params)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| Error::upstream(SERVICE, &self.resources_url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream_status(SERVICE, status.as_u16(), body));
        }

        response
            .json::<Vec<ResourceRecord>>()
            .await
            .map_err(|e| Error::upstream(SERVICE, &self.resources_url, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record_json() -> serde_json::Value {
        json!({
            "id": "res-1",
            "filename": "limits.pdf",
            "title": "Limits and Continuity",
            "storage_key": "sem1/math/unit2/limits.pdf",
            "content_type": "application/pdf",
            "course": "bsc-cs",
            "semester": "sem1",
            "subject": "math",
            "unit": "unit2",
            "type": "notes",
            "updated_at": "2024-05-01T10:00:00Z"
        })
    }

    #[tokio::test]
    async fn fetch_by_id_builds_equality_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/resources"))
            .and(query_param("id", "eq.res-1"))
            .and(query_param("limit", "1"))
            .and(header("apikey", "svc-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([record_json()])))
            .expect(1)
            .mount(&server)
            .await;

        let client = MetadataClient::new(Client::new(), &server.uri(), "svc-key");
        let record = client
            .fetch_by_id("res-1")
            .await
            .expect("query should succeed")
            .expect("row should be present");

        assert_eq!(record.id, "res-1");
        assert_eq!(record.kind.as_deref(), Some("notes"));
        assert_eq!(
            record.storage_key.as_deref(),
            Some("sem1/math/unit2/limits.pdf")
        );
    }

    #[tokio::test]
    async fn fetch_by_path_filters_all_four_columns() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/resources"))
            .and(query_param("semester", "eq.sem1"))
            .and(query_param("subject", "eq.math"))
            .and(query_param("unit", "eq.unit2"))
            .and(query_param("filename", "eq.limits.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([record_json()])))
            .mount(&server)
            .await;

        let client = MetadataClient::new(Client::new(), &server.uri(), "svc-key");
        let record = client
            .fetch_by_path(&ResourcePath {
                semester: "sem1".into(),
                subject: "math".into(),
                unit: "unit2".into(),
                filename: "limits.pdf".into(),
            })
            .await
            .expect("query should succeed");

        assert!(record.is_some());
    }

    #[tokio::test]
    async fn absent_row_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/resources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = MetadataClient::new(Client::new(), &server.uri(), "svc-key");
        let record = client.fetch_by_id("ghost").await.expect("query should succeed");
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn list_forwards_filters_and_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/resources"))
            .and(query_param("course", "eq.bsc-cs"))
            .and(query_param("type", "eq.notes"))
            .and(query_param("order", "filename.asc"))
            .and(query_param("limit", "25"))
            .and(query_param("offset", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([record_json()])))
            .expect(1)
            .mount(&server)
            .await;

        let client = MetadataClient::new(Client::new(), &server.uri(), "svc-key");
        let rows = client
            .list(&ResourceFilter {
                course: Some("bsc-cs".into()),
                kind: Some("notes".into()),
                limit: 25,
                offset: 50,
                ..ResourceFilter::default()
            })
            .await
            .expect("query should succeed");

        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn non_success_status_is_an_upstream_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/resources"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = MetadataClient::new(Client::new(), &server.uri(), "svc-key");
        let err = client.fetch_by_id("res-1").await.expect_err("must fail");
        match err {
            Error::UpstreamStatus { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
