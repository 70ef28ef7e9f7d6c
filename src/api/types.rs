//! API Request/Response Types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::errors::AppError;
use crate::models::types::{FeatureField, PredictionResult};

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
        }
    }
}

// ============================================
// Prediction
// ============================================

/// Either named `features` (missing keys are 0.0) or raw ordered `values`
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub disease: String,
    #[serde(default)]
    pub features: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub values: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
pub struct PredictionData {
    pub disease: String,
    pub disease_label: String,
    pub result: String,
    pub class: u8,
    pub message: String,
    pub model_type: String,
    /// The vector handed to the classifier, in layout order
    pub features: Vec<f64>,
}

impl PredictionData {
    pub fn new(result: PredictionResult, model_type: &str, features: Vec<f64>) -> Self {
        Self {
            disease: result.disease.slug().to_string(),
            disease_label: result.disease.label().to_string(),
            result: result.label.as_str().to_string(),
            class: result.label.as_u8(),
            message: result.message(),
            model_type: model_type.to_string(),
            features,
        }
    }
}

// ============================================
// Disease catalogue
// ============================================

#[derive(Debug, Serialize)]
pub struct DiseaseInfo {
    pub slug: String,
    pub name: String,
    pub label: String,
    pub available: bool,
    pub layout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<String>,
    pub fields: Vec<FeatureField>,
}

// ============================================
// Stats
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    pub active_sessions: usize,
    pub sessions_created: u64,
    pub sessions_expired: u64,
    pub session_ttl_secs: u64,
    pub models_available: usize,
    pub uptime_seconds: u64,
    pub api_version: String,
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub models_available: usize,
}
