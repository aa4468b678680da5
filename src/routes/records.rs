use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::models::{PlayerProfile, RawRecord};
use crate::response::json_error;
use crate::services::ingest;
use crate::state::AppState;

/// Bookmarklet upload payload: the scraped record list plus an optional
/// profile block.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngestRequest {
    #[serde(default)]
    user_profile: Option<PlayerProfile>,
    #[serde(default)]
    records: Vec<RawRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IngestResponse {
    success: bool,
    count: usize,
    skipped_titles: usize,
    skipped_charts: usize,
}

pub async fn ingest(State(state): State<AppState>, req: Request<Body>) -> Response {
    let (parts, body_bytes) = match split_body(req).await {
        Ok(value) => value,
        Err(res) => return res,
    };

    let token = crate::auth::extract_token(&parts.headers);
    let Some(token) = token else {
        return json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "login required")
            .into_response();
    };

    let payload: IngestRequest = match serde_json::from_slice(&body_bytes) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(error = %err, "ingest payload rejected");
            return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "malformed payload")
                .into_response();
        }
    };

    let Some(proxy) = state.db_proxy() else {
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "service unavailable",
        )
        .into_response();
    };

    let auth_user = match crate::auth::verify_request_token(proxy.as_ref(), &token).await {
        Ok(user) => user,
        // a failed sessions query is store trouble, not bad credentials
        Err(err) if err.is_store_failure() => {
            tracing::warn!(error = %err, "session lookup failed");
            return json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "service unavailable",
            )
            .into_response();
        }
        Err(_) => {
            return json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "login required")
                .into_response();
        }
    };

    let store = crate::store::PgStore::new(proxy.pool().clone());
    let summary = ingest::ingest_batch(
        &store,
        &auth_user.id,
        payload.user_profile.as_ref(),
        &payload.records,
    )
    .await;

    Json(IngestResponse {
        success: true,
        count: summary.records_written,
        skipped_titles: summary.skipped_titles,
        skipped_charts: summary.skipped_charts,
    })
    .into_response()
}

async fn split_body(req: Request<Body>) -> Result<(axum::http::request::Parts, Bytes), Response> {
    let (parts, body) = req.into_parts();
    // scraped batches run a few hundred KB at most
    let body_bytes = match axum::body::to_bytes(body, 4 * 1024 * 1024).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return Err(
                json_error(StatusCode::BAD_REQUEST, "BODY_TOO_LARGE", "request body too large")
                    .into_response(),
            )
        }
    };
    Ok((parts, body_bytes))
}
