//! The resource listing endpoint with delta sync.
//!
//! Every response carries a weak collection ETag and a snapshot of the
//! per-resource fingerprints is cached under that tag's digest. A client
//! revalidating with `If-None-Match` gets one of three answers: 304 when
//! the tag still matches, a delta naming only changed and deleted members
//! when the prior snapshot is cached, or the plain full listing. Snapshot
//! store trouble only ever widens the response back to a full listing.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, ETAG, IF_NONE_MATCH, VARY};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use studygate_auth::{session_credential, verify_session, SessionClaims};
use studygate_core::constants::{
    LIST_CACHE_MAX_AGE_SECS, LIST_LIMIT_CEIL, LIST_LIMIT_DEFAULT, SNAPSHOT_TTL_SECS,
};
use studygate_store::{snapshot_key, ResourceFilter, ResourceRecord};

use crate::error::{ApiError, ApiResult};
use crate::fingerprint::{collection_etag, etag_digest, resource_fingerprint};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub course: Option<String>,
    pub semester: Option<String>,
    pub subject: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Fingerprints of one served listing, cached under the ETag digest.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ListSnapshot {
    #[serde(default)]
    resources: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    delta: Option<bool>,
    resources: Vec<ResourceRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<Vec<String>>,
    total_count: usize,
}

/// `GET /resources`
pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(params) = params.map_err(|_| ApiError::BadRequest)?;

    let session = session_credential(&headers)
        .and_then(|jwt| verify_session(jwt, &state.config.signing_secret))
        .filter(SessionClaims::is_access)
        .ok_or(ApiError::Unauthorized)?;
    tracing::debug!(subject = %session.sub, "listing resources");

    let filter = ResourceFilter {
        course: params.course,
        semester: params.semester,
        subject: params.subject,
        kind: params.kind,
        limit: params
            .limit
            .unwrap_or(LIST_LIMIT_DEFAULT)
            .clamp(1, LIST_LIMIT_CEIL),
        offset: params.offset.unwrap_or(0),
    };
    let records = state.metadata.list(&filter).await?;

    let fingerprints: Vec<String> = records.iter().map(resource_fingerprint).collect();
    let etag = collection_etag(&fingerprints);
    let if_none_match = headers
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(str::trim);

    let current: BTreeMap<String, String> = records
        .iter()
        .map(|record| (record.id.clone(), resource_fingerprint(record)))
        .collect();
    // Cached on every answer, 304s included; revalidation refreshes the
    // snapshot TTL through a quiet stretch.
    save_snapshot(&state, &etag, &current).await;

    if if_none_match == Some(etag.as_str()) {
        return Ok((StatusCode::NOT_MODIFIED, list_headers(&etag)).into_response());
    }

    // A cached snapshot for the tag the client last saw lets us answer with
    // just the difference.
    if let Some(prior) = load_prior(&state, if_none_match).await {
        let changed: Vec<ResourceRecord> = records
            .iter()
            .filter(|record| prior.resources.get(&record.id) != current.get(&record.id))
            .cloned()
            .collect();
        let deleted: Vec<String> = prior
            .resources
            .keys()
            .filter(|id| !current.contains_key(*id))
            .cloned()
            .collect();

        // A delta only pays off when something actually changed and the
        // changes are smaller than the listing itself.
        let worthwhile = (!changed.is_empty() || !deleted.is_empty())
            && changed.len() < records.len();
        if worthwhile {
            let body = ListResponse {
                delta: Some(true),
                total_count: records.len(),
                resources: changed,
                deleted: Some(deleted),
            };
            return Ok((StatusCode::OK, list_headers(&etag), Json(body)).into_response());
        }
    }

    let body = ListResponse {
        delta: None,
        total_count: records.len(),
        resources: records,
        deleted: None,
    };
    Ok((StatusCode::OK, list_headers(&etag), Json(body)).into_response())
}

fn list_headers(etag: &str) -> [(HeaderName, String); 3] {
    [
        (ETAG, etag.to_string()),
        (
            CACHE_CONTROL,
            format!("private, max-age={LIST_CACHE_MAX_AGE_SECS}"),
        ),
        (VARY, "If-None-Match".to_string()),
    ]
}

async fn save_snapshot(state: &AppState, etag: &str, current: &BTreeMap<String, String>) {
    let Some(digest) = etag_digest(etag) else {
        return;
    };
    let snapshot = ListSnapshot {
        resources: current.clone(),
    };
    let Ok(raw) = serde_json::to_string(&snapshot) else {
        return;
    };
    let ttl = Some(Duration::from_secs(SNAPSHOT_TTL_SECS));
    if let Err(error) = state.kv.put(&snapshot_key(digest), &raw, ttl).await {
        tracing::warn!(%error, "failed to cache listing snapshot");
    }
}

async fn load_prior(state: &AppState, if_none_match: Option<&str>) -> Option<ListSnapshot> {
    let digest = if_none_match.and_then(etag_digest)?;
    match state.kv.get(&snapshot_key(digest)).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                tracing::warn!(%error, "discarding corrupt listing snapshot");
                None
            }
        },
        Ok(None) => None,
        Err(error) => {
            tracing::warn!(%error, "snapshot read failed, serving full listing");
            None
        }
    }
}
