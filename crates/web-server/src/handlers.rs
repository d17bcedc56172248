use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use chrono::NaiveDate;
use database::ValidationError;
use core_types::{AboutInfo, NewRun, NewWeighIn, Run, WeighIn};
use serde::Serialize;
use std::sync::Arc;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Records can describe today at the latest, judged by the server's local calendar.
fn reject_future_date(date: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
    if date > today {
        return Err(AppError::Invalid(ValidationError {
            field: Some("date"),
            message: "Date cannot be in the future".to_string(),
        }));
    }
    Ok(())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// # POST /weight
/// Stores a weigh-in. Range checks are enforced by the store and come back as 400s.
pub async fn create_weigh_in(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(weigh_in), _): WithRejection<Json<NewWeighIn>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    reject_future_date(weigh_in.date, today())?;
    let created = state.store.insert_weigh_in(&weigh_in).await?;
    tracing::info!(id = created.id, date = %created.date, "Weigh-in logged");
    let location = format!("/weight/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

/// # GET /weight/last/:count
/// Newest first; fewer than `count` items when the table is smaller.
pub async fn recent_weigh_ins(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(count), _): WithRejection<Path<u32>, AppError>,
) -> Result<Json<Vec<WeighIn>>, AppError> {
    let weigh_ins = state.store.recent_weigh_ins(count).await?;
    Ok(Json(weigh_ins))
}

/// # POST /run
pub async fn create_run(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(run), _): WithRejection<Json<NewRun>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    reject_future_date(run.date, today())?;
    let created = state.store.insert_run(&run).await?;
    tracing::info!(id = created.id, date = %created.date, "Run logged");
    let location = format!("/run/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

/// # GET /run/last/:count
pub async fn recent_runs(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(count), _): WithRejection<Path<u32>, AppError>,
) -> Result<Json<Vec<Run>>, AppError> {
    let runs = state.store.recent_runs(count).await?;
    Ok(Json(runs))
}

/// # GET /health
/// 200 when the store answers a trivial query, 503 otherwise.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    if state.health.is_healthy().await {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "Healthy",
                message: "Database connection is healthy",
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "Unhealthy",
                message: "Database connection failed",
            }),
        )
    }
}

/// # GET /about
/// Always 200; fields the store could not supply are zero-valued.
pub async fn about(State(state): State<Arc<AppState>>) -> Json<AboutInfo> {
    Json(state.health.get_about_info().await)
}
