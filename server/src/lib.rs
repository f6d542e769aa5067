use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use parking_lot::RwLock;
use scorer::dataset::Dataset;
use scorer::{Interaction, Readiness, Recommendation, RecommendationMethod, Recommender, RecommenderConfig, UserProfile};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct LimitParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Deserialize)]
pub struct RecommendParams {
    pub method: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Deserialize)]
pub struct ExplainParams {
    pub method: Option<String>,
}

fn default_limit() -> usize { 10 }

fn clamp_limit(limit: usize) -> usize { limit.clamp(1, MAX_LIMIT) }

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub user_id: String,
    pub method: RecommendationMethod,
    pub took_s: f64,
    pub total: usize,
    pub results: Vec<Recommendation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationResponse {
    pub user_id: String,
    pub job_id: String,
    pub method: String,
    pub explanation: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
}

pub struct AppOptions {
    pub data_dir: PathBuf,
    pub config: RecommenderConfig,
    pub admin_token: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    pub recommender: Arc<Recommender>,
    pub catalog: Arc<RwLock<Dataset>>,
    pub readiness: Readiness,
    pub admin_token: Option<String>,
}

pub fn build_app(options: AppOptions) -> Result<Router> {
    // Load the catalog and warm profiles at startup
    let dataset = Dataset::load(&options.data_dir)?;
    let mut recommender = Recommender::new(options.config);
    let readiness = recommender.initialize();
    let warmed = warm_profiles(&recommender, &dataset);
    tracing::info!(profiles = warmed, ready = readiness.is_ready(), "recommender warmed");

    let app_state = AppState {
        data_dir: options.data_dir,
        recommender: Arc::new(recommender),
        catalog: Arc::new(RwLock::new(dataset)),
        readiness,
        admin_token: options.admin_token,
    };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/jobs/popular", get(popular_handler))
        .route("/users/:user_id/interactions", put(interactions_handler))
        .route("/users/:user_id/profile", get(profile_handler))
        .route("/users/:user_id/recommendations", get(recommendations_handler))
        .route("/users/:user_id/recommendations/:job_id/explanation", get(explanation_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    Ok(app)
}

/// Rebuild a profile for every user with interactions in the dataset.
fn warm_profiles(recommender: &Recommender, dataset: &Dataset) -> usize {
    let grouped = dataset.interactions_by_user();
    let count = grouped.len();
    for (user_id, mut interactions) in grouped {
        dataset.populate_jobs(&mut interactions);
        recommender.update_user_profile(user_id, &interactions);
    }
    count
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let degraded_reason = match &state.readiness {
        Readiness::Ready => None,
        Readiness::Degraded { reason } => Some(reason.clone()),
    };
    Json(HealthResponse { status: "ok", ready: state.readiness.is_ready(), degraded_reason })
}

pub async fn popular_handler(State(state): State<AppState>, Query(params): Query<LimitParams>) -> Json<Vec<Recommendation>> {
    let catalog = state.catalog.read();
    Json(state.recommender.get_popular_jobs(&catalog.jobs, clamp_limit(params.limit)))
}

pub async fn interactions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(mut interactions): Json<Vec<Interaction>>,
) -> Json<UserProfile> {
    state.catalog.read().populate_jobs(&mut interactions);
    let profile = state.recommender.update_user_profile(&user_id, &interactions);
    Json(profile.as_ref().clone())
}

pub async fn profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, (StatusCode, String)> {
    match state.recommender.profile(&user_id) {
        Some(profile) => Ok(Json(profile.as_ref().clone())),
        None => Err((StatusCode::NOT_FOUND, format!("no profile for user '{user_id}'"))),
    }
}

pub async fn recommendations_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<RecommendationsResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let method = match params.method.as_deref() {
        Some(m) => m.parse::<RecommendationMethod>().map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?,
        None => RecommendationMethod::Hybrid,
    };
    let results = {
        let catalog = state.catalog.read();
        state.recommender.recommend(&user_id, method, &catalog.jobs, &catalog.applications, clamp_limit(params.limit))
    };
    Ok(Json(RecommendationsResponse {
        user_id,
        method,
        took_s: start.elapsed().as_secs_f64(),
        total: results.len(),
        results,
    }))
}

pub async fn explanation_handler(
    State(state): State<AppState>,
    Path((user_id, job_id)): Path<(String, String)>,
    Query(params): Query<ExplainParams>,
) -> Json<ExplanationResponse> {
    let method = params.method.unwrap_or_else(|| RecommendationMethod::Hybrid.as_str().to_string());
    let explanation = state.recommender.get_recommendation_explanation(&user_id, &job_id, &method);
    Json(ExplanationResponse { user_id, job_id, method, explanation })
}

// --- Admin endpoints ---
async fn reload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let dataset = Dataset::load(&state.data_dir).map_err(|e| {
        tracing::error!(error = %format!("{e:#}"), "dataset reload failed");
        (StatusCode::INTERNAL_SERVER_ERROR, format!("reload failed: {e:#}"))
    })?;
    let profiles = warm_profiles(&state.recommender, &dataset);
    let jobs = dataset.jobs.len();
    let applications = dataset.applications.len();
    *state.catalog.write() = dataset;
    tracing::info!(jobs, applications, profiles, "catalog reloaded");
    Ok(Json(serde_json::json!({ "jobs": jobs, "applications": applications, "profiles": profiles })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
