use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::debug;

use super::error::ApiError;
use super::state::{GuardedJobStore, ServerState};
use crate::search_jobs::{Job, JobId, JobProcessor, JobStatus, SearchCriteria, SubmitError};

#[derive(Serialize, Debug)]
struct SubmitJobResponse {
    job_id: JobId,
    status: JobStatus,
}

async fn submit_search_job(
    State(processor): State<JobProcessor>,
    body: Result<Json<SearchCriteria>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitJobResponse>), ApiError> {
    let Json(criteria) = body?;

    let job = processor.submit(criteria).map_err(|err| match err {
        SubmitError::ShuttingDown => ApiError::Unavailable("Server is shutting down"),
        SubmitError::Store(err) => ApiError::Internal(err.to_string()),
    })?;
    debug!("Accepted search job {}", job.job_id);

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitJobResponse {
            job_id: job.job_id,
            status: job.status,
        }),
    ))
}

async fn get_job_status(
    State(job_store): State<GuardedJobStore>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    job_store
        .read(&job_id)
        .map(Json)
        .ok_or(ApiError::NotFound("Job not found"))
}

pub fn make_jobs_routes(state: ServerState) -> Router {
    Router::new()
        .route("/jobs/search", post(submit_search_job))
        .route("/jobs/{job_id}", get(get_job_status))
        .with_state(state)
}
