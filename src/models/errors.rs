//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so it can be grepped in logs
//! and mapped to an HTTP status in one place.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - MODEL_xxx: model artifact loading (LoadError)
//! - PREDICT_xxx: prediction-time failures (PredictionError)
//! - API_xxx: API errors
//! - CFG_xxx: Configuration errors

use std::fmt;

use super::types::Disease;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// True for the LoadError family
    pub fn is_load_error(&self) -> bool {
        self.code.is_load_error()
    }

    /// True for the PredictionError family
    pub fn is_prediction_error(&self) -> bool {
        self.code.is_prediction_error()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Load Errors (1xx)
    // ============================================
    /// Artifact file does not exist or cannot be opened
    ModelNotFound,
    /// Artifact is not a valid model document
    ModelMalformed,
    /// Artifact width/names match none of the disease's field layouts
    ModelLayoutMismatch,
    /// Disease has no usable classifier (its load failed earlier)
    ModelUnavailable,

    // ============================================
    // Prediction Errors (2xx)
    // ============================================
    /// Feature vector length differs from the classifier's input width
    PredictShapeMismatch,
    /// Classifier object cannot evaluate (broken tree, bad coefficients)
    PredictInvalidModel,

    // ============================================
    // API Errors (3xx)
    // ============================================
    /// Invalid request format
    ApiBadRequest,

    // ============================================
    // Configuration Errors (4xx)
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors (9xx)
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            // Load Errors
            Self::ModelNotFound => "MODEL_NOT_FOUND",
            Self::ModelMalformed => "MODEL_MALFORMED",
            Self::ModelLayoutMismatch => "MODEL_LAYOUT_MISMATCH",
            Self::ModelUnavailable => "MODEL_UNAVAILABLE",

            // Prediction Errors
            Self::PredictShapeMismatch => "PREDICT_SHAPE_MISMATCH",
            Self::PredictInvalidModel => "PREDICT_INVALID_MODEL",

            // API Errors
            Self::ApiBadRequest => "API_BAD_REQUEST",

            // Configuration Errors
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            // Generic
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest | Self::ConfigInvalidValue => 400,
            Self::PredictShapeMismatch | Self::PredictInvalidModel => 422,
            Self::ModelUnavailable => 503,
            _ => 500,
        }
    }

    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::ModelNotFound
                | Self::ModelMalformed
                | Self::ModelLayoutMismatch
                | Self::ModelUnavailable
        )
    }

    pub fn is_prediction_error(&self) -> bool {
        matches!(self, Self::PredictShapeMismatch | Self::PredictInvalidModel)
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Artifact missing for a disease
    pub fn model_not_found(disease: Disease, detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ModelNotFound,
            format!("{} model artifact not found: {}", disease.name(), detail),
        )
    }

    /// Artifact present but unreadable as a model
    pub fn model_malformed(disease: Disease, detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ModelMalformed,
            format!("{} model artifact is malformed: {}", disease.name(), detail),
        )
    }

    /// Artifact does not fit any field layout of the disease
    pub fn layout_mismatch(disease: Disease, detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ModelLayoutMismatch,
            format!("{} model does not match its input fields: {}", disease.name(), detail),
        )
    }

    /// Disease model could not be served
    pub fn model_unavailable(disease: Disease, detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ModelUnavailable,
            format!("{} model is unavailable: {}", disease.name(), detail),
        )
    }

    /// Vector length differs from classifier width
    pub fn shape_mismatch(expected: usize, actual: usize) -> Self {
        Self::new(
            ErrorCode::PredictShapeMismatch,
            format!("expected {} features, got {}", expected, actual),
        )
    }

    /// Classifier cannot evaluate
    pub fn invalid_model(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::PredictInvalidModel, msg)
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// Bad configuration value
    pub fn invalid_config(key: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: {:?}", key, value),
        )
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ApiBadRequest, "JSON parse error", err)
    }
}
