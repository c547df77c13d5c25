use axum::{
    Router,
    extract::{Json, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::AssumptionOverrides;
use crate::core::{
    AssumptionSet, FinancialProfile, LifeEvent, ProjectionError, ProjectionSummary,
    YearProjection, project,
};

/// Request document shared by `POST /api/projection` and `project --input`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionPayload {
    pub profile: FinancialProfile,
    pub assumptions: AssumptionOverrides,
    pub life_events: Vec<LifeEvent>,
    /// Start date of the run; today when omitted.
    pub as_of: Option<NaiveDate>,
}

impl ProjectionPayload {
    /// Default assumptions with this request's overrides applied.
    pub fn resolved_assumptions(&self) -> AssumptionSet {
        self.assumptions.apply(AssumptionSet::default())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    pub rows: Vec<YearProjection>,
    pub summary: ProjectionSummary,
    pub assumptions: AssumptionSet,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Runs one projection for `payload` under `assumptions`, starting on `as_of`.
pub fn run_projection(
    payload: &ProjectionPayload,
    assumptions: AssumptionSet,
    as_of: NaiveDate,
) -> Result<ProjectionResponse, ProjectionError> {
    let report = project(&payload.profile, &assumptions, &payload.life_events, as_of)?;
    let summary = report.summary();

    Ok(ProjectionResponse {
        rows: report.into_rows(),
        summary,
        assumptions,
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    info!("projection HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/api/assumptions");

    axum::serve(listener, app).await
}

fn router() -> Router {
    Router::new()
        .route("/api/assumptions", get(assumptions_handler))
        .route("/api/projection", post(projection_handler))
        .fallback(not_found_handler)
}

async fn assumptions_handler() -> Response {
    json_response(StatusCode::OK, AssumptionSet::default())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn projection_handler(payload: Result<Json<ProjectionPayload>, JsonRejection>) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            let msg = format!("Invalid API JSON payload: {}", rejection.body_text());
            warn!("{msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let assumptions = payload.resolved_assumptions();
    let as_of = payload.as_of.unwrap_or_else(|| Local::now().date_naive());

    match run_projection(&payload, assumptions, as_of) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => {
            warn!(%err, "rejected projection request");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
