use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::catalog::JobCatalog;
use super::coordinator::{RankingCoordinator, RankingOutcome};
use super::criteria::{JobCriteria, RawJobCriteria};
use super::domain::RawCandidate;
use super::source::validate_pool;
use crate::error::AppError;

/// Shared state behind the ranking endpoints.
#[derive(Debug)]
pub struct RankingService {
    catalog: JobCatalog,
    shortlist_size: usize,
    reference_year: i32,
}

impl RankingService {
    pub fn new(catalog: JobCatalog, shortlist_size: usize, reference_year: i32) -> Self {
        Self {
            catalog,
            shortlist_size,
            reference_year,
        }
    }

    pub fn catalog(&self) -> &JobCatalog {
        &self.catalog
    }

    pub fn rank(
        &self,
        job: JobCriteria,
        candidates: &[RawCandidate],
        shortlist_size: Option<usize>,
    ) -> Result<RankingOutcome, AppError> {
        validate_pool(candidates)?;
        let coordinator = RankingCoordinator::new(job, self.reference_year)?;
        let outcome =
            coordinator.evaluate(candidates, shortlist_size.unwrap_or(self.shortlist_size))?;
        Ok(outcome)
    }
}

/// Router builder exposing ad-hoc and catalog ranking endpoints.
pub fn ranking_router(service: Arc<RankingService>) -> Router {
    Router::new()
        .route("/api/v1/rankings", post(rank_handler))
        .route("/api/v1/jobs", get(jobs_handler))
        .route("/api/v1/jobs/:job/rankings", post(catalog_rank_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct RankingRequest {
    #[serde(default)]
    pub job_name: Option<String>,
    pub job: RawJobCriteria,
    pub candidates: Vec<RawCandidate>,
    #[serde(default)]
    pub shortlist_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogRankingRequest {
    pub candidates: Vec<RawCandidate>,
    #[serde(default)]
    pub shortlist_size: Option<usize>,
}

#[derive(Debug, Serialize)]
struct JobListing<'a> {
    key: &'a str,
    title: &'a str,
    query: &'a str,
    hard_criteria: usize,
    weighted_categories: Vec<&'a str>,
}

pub(crate) async fn rank_handler(
    State(service): State<Arc<RankingService>>,
    Json(request): Json<RankingRequest>,
) -> Result<Json<RankingOutcome>, AppError> {
    let key = request
        .job_name
        .clone()
        .or_else(|| request.job.name.clone())
        .unwrap_or_else(|| "adhoc".to_string());
    let job = JobCriteria::from_raw(&key, request.job)?;
    let outcome = service.rank(job, &request.candidates, request.shortlist_size)?;
    Ok(Json(outcome))
}

pub(crate) async fn catalog_rank_handler(
    State(service): State<Arc<RankingService>>,
    Path(job): Path<String>,
    Json(request): Json<CatalogRankingRequest>,
) -> Result<Json<RankingOutcome>, AppError> {
    let criteria = service.catalog().get(&job)?.clone();
    let outcome = service.rank(criteria, &request.candidates, request.shortlist_size)?;
    Ok(Json(outcome))
}

pub(crate) async fn jobs_handler(State(service): State<Arc<RankingService>>) -> Response {
    let catalog = service.catalog();
    let jobs: Vec<JobListing<'_>> = catalog
        .jobs()
        .map(|job| JobListing {
            key: &job.key,
            title: &job.title,
            query: &job.query,
            hard_criteria: job.hard_criteria.len(),
            weighted_categories: job
                .soft_criteria
                .factors
                .iter()
                .map(|factor| factor.category.as_str())
                .collect(),
        })
        .collect();
    let invalid: Vec<_> = catalog
        .invalid()
        .iter()
        .map(|(key, err)| json!({ "key": key, "error": err.to_string() }))
        .collect();

    let payload = json!({ "jobs": jobs, "invalid": invalid });
    (StatusCode::OK, Json(payload)).into_response()
}
