//! Axum route handlers for the Recommendation API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::posting::Posting;
use crate::models::profile::StudentProfile;
use crate::recommendation::engine::{rank_with_writer, RankingConfig};
use crate::recommendation::ranker::ScoredPosting;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    pub min_relevance_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub student_profile: StudentProfile,
    #[serde(alias = "internships")]
    pub postings: Vec<Posting>,
    #[serde(default)]
    pub config: Option<RequestConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub threshold: f64,
    pub candidate_count: usize,
    pub reason_backend: &'static str,
    pub recommendations: Vec<ScoredPosting>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/recommendations
///
/// Ranks the supplied postings for the supplied student profile.
/// An empty result means "no recommendations found", not an error.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let max_postings = state.config.max_postings_per_request;
    if request.postings.len() > max_postings {
        return Err(AppError::Validation(format!(
            "at most {max_postings} postings per request, got {}",
            request.postings.len()
        )));
    }

    let config = effective_config(&state.config.ranking, request.config.as_ref());
    let request_id = Uuid::new_v4();
    let span = info_span!(
        "recommend",
        %request_id,
        student_id = %request.student_profile.student_id
    );

    let recommendations = rank_with_writer(
        &request.student_profile,
        &request.postings,
        &config,
        state.reason_writer.as_ref(),
    )
    .instrument(span)
    .await?;

    info!(
        "Request {request_id}: {} recommendations from {} postings",
        recommendations.len(),
        request.postings.len()
    );

    Ok(Json(RecommendationResponse {
        request_id,
        generated_at: Utc::now(),
        threshold: config.min_relevance_threshold,
        candidate_count: request.postings.len(),
        reason_backend: state.reason_writer.backend(),
        recommendations,
    }))
}

/// Server defaults with any per-request override applied.
fn effective_config(defaults: &RankingConfig, overrides: Option<&RequestConfig>) -> RankingConfig {
    let mut config = *defaults;
    if let Some(threshold) = overrides.and_then(|o| o.min_relevance_threshold) {
        config.min_relevance_threshold = threshold;
    }
    config
}
