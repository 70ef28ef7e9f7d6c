//! API Request Handlers

use axum::{
    extract::{Form, Json, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::middleware::{session_cookie, set_session_cookie};
use super::types::*;
use crate::core::form::FormSession;
use crate::core::registry::ModelRegistry;
use crate::models::errors::AppError;
use crate::models::types::{Disease, FeatureVector, PredictionResult};
use crate::utils::render::{escape_html, render_page};
use crate::utils::session::SessionStore;

/// Shared application state
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub sessions: SessionStore,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(registry: Arc<ModelRegistry>, sessions: SessionStore) -> Self {
        Self {
            registry,
            sessions,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Session id for this request, issuing a new one when needed
    fn session_id(&self, headers: &HeaderMap) -> String {
        let (id, fresh) = self.sessions.resolve(session_cookie(headers).as_deref());
        if fresh {
            debug!("🆔 New session {}", id);
        }
        id
    }
}

type ApiFailure = (StatusCode, Json<ApiResponse<()>>);

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn api_failure(err: &AppError, start: Instant) -> ApiFailure {
    let status = StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))),
    )
}

// ============================================
// Page
// ============================================

/// GET / - the form for the session's current selection
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let id = state.session_id(&headers);
    let html = state.sessions.with_session(&id, |form| {
        form.ensure_selected(&state.registry);
        render_page(form, &state.registry)
    });

    let mut response = Html(html).into_response();
    set_session_cookie(&mut response, &id);
    response
}

/// POST /select - change the selected disease, then show the page
pub async fn select_disease(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let id = state.session_id(&headers);

    let disease = match parse_disease_param(&params) {
        Ok(disease) => disease,
        Err(e) => return bad_form(&e),
    };
    state
        .sessions
        .with_session(&id, |form| form.select(disease, &state.registry));

    let mut response = Redirect::to("/").into_response();
    set_session_cookie(&mut response, &id);
    response
}

/// POST /predict - take the submitted values, predict and show the result
pub async fn predict_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let id = state.session_id(&headers);

    let disease = match params.get("disease") {
        Some(_) => match parse_disease_param(&params) {
            Ok(disease) => Some(disease),
            Err(e) => return bad_form(&e),
        },
        None => None,
    };

    let html = state.sessions.with_session(&id, |form| {
        match disease {
            Some(disease) => form.select(disease, &state.registry),
            None => {
                form.ensure_selected(&state.registry);
            }
        }
        form.apply_inputs(&params);
        // Failures are already logged and shown as a banner.
        let _ = form.predict(&state.registry);
        render_page(form, &state.registry)
    });

    let mut response = Html(html).into_response();
    set_session_cookie(&mut response, &id);
    response
}

fn parse_disease_param(params: &HashMap<String, String>) -> Result<Disease, AppError> {
    params
        .get("disease")
        .ok_or_else(|| AppError::bad_request("Missing disease"))?
        .parse()
}

fn bad_form(err: &AppError) -> Response {
    let body = format!(
        "<!DOCTYPE html><html><body><p>{}</p><p><a href=\"/\">Back</a></p></body></html>",
        escape_html(&err.message)
    );
    (StatusCode::BAD_REQUEST, Html(body)).into_response()
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();
    let models_available = state.registry.available_count();

    let data = HealthData {
        status: if models_available == Disease::ALL.len() {
            "healthy"
        } else {
            "degraded"
        }
        .to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        models_available,
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Disease catalogue
// ============================================

pub async fn list_diseases(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<DiseaseInfo>>> {
    let start = Instant::now();
    let registry = &state.registry;

    let data = Disease::ALL
        .into_iter()
        .map(|disease| {
            let spec = registry.spec_for(disease);
            let model = registry.get(disease).ok();
            DiseaseInfo {
                slug: disease.slug().to_string(),
                name: disease.name().to_string(),
                label: disease.label().to_string(),
                available: model.is_some(),
                layout: spec.name.to_string(),
                model_type: model.map(|m| m.classifier().model_type().to_string()),
                unavailable_reason: registry.load_error(disease).map(|e| e.to_string()),
                fields: spec.fields.to_vec(),
            }
        })
        .collect();

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Prediction
// ============================================

pub async fn predict_api(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<ApiResponse<PredictionData>>, ApiFailure> {
    let start = Instant::now();
    let registry = &state.registry;

    let disease: Disease = req.disease.parse().map_err(|e| api_failure(&e, start))?;

    let (result, vector) = match (req.features, req.values) {
        (Some(_), Some(_)) => {
            return Err(api_failure(
                &AppError::bad_request("Send either features or values, not both"),
                start,
            ))
        }
        (None, Some(values)) => {
            // Raw vectors go to the classifier untouched
            let vector = FeatureVector::new(values);
            let label = registry
                .get(disease)
                .and_then(|model| model.predict(&vector))
                .map_err(|e| api_failure(&e, start))?;
            (PredictionResult::new(disease, label), vector)
        }
        (features, None) => {
            let mut form = FormSession::new();
            form.select(disease, registry);
            for (key, value) in features.unwrap_or_default() {
                if !form.set_value(&key, value) {
                    return Err(api_failure(
                        &AppError::bad_request(format!(
                            "Unknown feature {:?} for {}",
                            key,
                            disease.name()
                        )),
                        start,
                    ));
                }
            }
            let vector = form.feature_vector();
            let result = form.predict(registry).map_err(|e| api_failure(&e, start))?;
            (result, vector)
        }
    };

    let model_type = registry
        .get(disease)
        .map(|m| m.classifier().model_type())
        .unwrap_or("unknown");
    info!(
        disease = disease.slug(),
        result = result.label.as_str(),
        features = vector.len(),
        "🔮 API prediction"
    );

    Ok(Json(ApiResponse::success(
        PredictionData::new(result, model_type, vector.into_inner()),
        elapsed_ms(start),
    )))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let sessions = state.sessions.stats();

    let data = StatsData {
        active_sessions: sessions.active,
        sessions_created: sessions.created,
        sessions_expired: sessions.expired,
        session_ttl_secs: sessions.ttl_secs,
        models_available: state.registry.available_count(),
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
