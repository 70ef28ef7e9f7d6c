//! Disease Predictor Library
//!
//! Selection-driven prediction form over five pre-trained binary
//! classifiers:
//! - Diabetes, Heart Disease, Parkinsons, Lung Cancer, Hypo-Thyroid
//! - One fixed, ordered input layout per model
//! - Positive/Negative result per predict action

pub mod api;
pub mod core;
pub mod models;
pub mod utils;

pub use crate::core::{Classifier, FormPhase, FormSession, ModelArtifact, ModelRegistry, RegisteredModel};
pub use models::{
    AppConfig, AppError, AppResult, BinaryLabel, Disease, ErrorCode, FeatureField, FeatureSpec,
    FeatureVector, LoadPolicy, PredictionResult,
};
pub use utils::SessionStore;
