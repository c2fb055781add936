// src/server.rs

use serde::Serialize;
use std::{convert::Infallible, sync::Arc, time::Instant};
use tracing::{error, info, warn};
use warp::{
    http::StatusCode,
    reject::{MethodNotAllowed, Rejection},
    reply::{Reply, Response},
    Filter,
};

use crate::error::PipelineError;
use crate::fetch::{Clock, StatsSource};
use crate::{pipeline, store, store::BlobStore};

/// Collaborators shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn StatsSource>,
    pub store: Arc<dyn BlobStore>,
    pub clock: Arc<dyn Clock>,
    pub fetch_concurrency: usize,
}

#[derive(Debug, Serialize)]
pub struct RenewResponse {
    pub status: &'static str,
    pub message: String,
}

impl RenewResponse {
    fn success(message: String) -> (StatusCode, Self) {
        (
            StatusCode::OK,
            Self {
                status: "success",
                message,
            },
        )
    }

    fn error(code: StatusCode, message: String) -> (StatusCode, Self) {
        (
            code,
            Self {
                status: "error",
                message,
            },
        )
    }
}

fn json_reply(code: StatusCode, body: &RenewResponse) -> Response {
    warp::reply::with_status(warp::reply::json(body), code).into_response()
}

/// Run the pipeline and upload its result.
pub async fn renew(state: &AppState) -> (StatusCode, RenewResponse) {
    let start = Instant::now();
    let today = state.clock.today();

    let result = match pipeline::run(state.source.as_ref(), today, state.fetch_concurrency).await {
        Ok(r) => r,
        Err(PipelineError::NoData) => {
            error!("no population data retrieved");
            return RenewResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to retrieve data from e-Stat.".to_string(),
            );
        }
        Err(e) => {
            error!(error = %e, "pipeline failed");
            return RenewResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to process e-Stat data: {}", e),
            );
        }
    };

    match store::save(state.store.as_ref(), &result).await {
        Ok(location) => {
            info!(%location, elapsed = ?start.elapsed(), "renewed population data");
            RenewResponse::success(format!(
                "Data successfully renewed and saved to {}",
                location
            ))
        }
        Err(e) => {
            error!(error = ?e, "upload failed");
            RenewResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An error occurred while uploading to GCS: {:#}", e),
            )
        }
    }
}

async fn renew_handler(state: AppState) -> Result<Response, Rejection> {
    info!("API endpoint /api/v1/renew was hit");
    let (code, body) = renew(&state).await;
    Ok(json_reply(code, &body))
}

async fn health_check() -> Result<Response, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "population-renewer"
    }))
    .into_response())
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found")
    } else if err.find::<MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    } else {
        warn!(?err, "unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    };
    let (code, body) = RenewResponse::error(code, message.to_string());
    Ok(json_reply(code, &body))
}

/// `GET /health` and `POST /api/v1/renew`, with JSON errors for everything else.
pub fn routes(state: AppState) -> impl Filter<Extract = (Response,), Error = Infallible> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(health_check);

    let renew = warp::path!("api" / "v1" / "renew")
        .and(warp::post())
        .and(warp::any().map(move || state.clone()))
        .and_then(renew_handler);

    health.or(renew).unify().recover(handle_rejection).unify()
}
