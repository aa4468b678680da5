use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::response::json_error;
use crate::services::rating;
use crate::state::AppState;
use crate::store::ScoreStore;

pub async fn report(State(state): State<AppState>, req: Request<Body>) -> Response {
    let token = crate::auth::extract_token(req.headers());
    let Some(token) = token else {
        return json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "login required")
            .into_response();
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
    match store.select_rated_records(&auth_user.id).await {
        Ok(sources) => Json(rating::compute_best_rating(&sources)).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "rating query failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal server error",
            )
            .into_response()
        }
    }
}
