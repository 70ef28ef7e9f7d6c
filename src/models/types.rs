//! Type definitions for the disease prediction pipeline
//! Diseases, their input layouts, feature vectors and prediction results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::AppError;
use crate::core::features;

/// The five diseases a model is shipped for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disease {
    Diabetes,
    HeartDisease,
    Parkinsons,
    LungCancer,
    #[serde(rename = "hypothyroid")]
    HypoThyroid,
}

impl Disease {
    /// Dropdown order; the first entry is the default selection
    pub const ALL: [Disease; 5] = [
        Disease::Diabetes,
        Disease::HeartDisease,
        Disease::Parkinsons,
        Disease::LungCancer,
        Disease::HypoThyroid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Disease::Diabetes => "Diabetes",
            Disease::HeartDisease => "Heart Disease",
            Disease::Parkinsons => "Parkinsons",
            Disease::LungCancer => "Lung Cancer",
            Disease::HypoThyroid => "Hypo-Thyroid",
        }
    }

    /// Display label, e.g. "🩺 Diabetes"
    pub fn label(&self) -> &'static str {
        match self {
            Disease::Diabetes => "🩺 Diabetes",
            Disease::HeartDisease => "❤️ Heart Disease",
            Disease::Parkinsons => "🧠 Parkinsons",
            Disease::LungCancer => "🫁 Lung Cancer",
            Disease::HypoThyroid => "🔬 Hypo-Thyroid",
        }
    }

    /// Stable identifier used in URLs, forms and JSON
    pub fn slug(&self) -> &'static str {
        match self {
            Disease::Diabetes => "diabetes",
            Disease::HeartDisease => "heart_disease",
            Disease::Parkinsons => "parkinsons",
            Disease::LungCancer => "lung_cancer",
            Disease::HypoThyroid => "hypothyroid",
        }
    }

    /// File stem of the model artifact inside the models directory
    pub fn artifact_stem(&self) -> &'static str {
        match self {
            Disease::Diabetes => "diabetes_model",
            Disease::HeartDisease => "heart_disease_model",
            Disease::Parkinsons => "parkinsons_model",
            Disease::LungCancer => "lungs_disease_model",
            Disease::HypoThyroid => "Thyroid_model",
        }
    }

    /// Accepted field layouts, default first
    pub fn layouts(&self) -> &'static [FeatureSpec] {
        features::layouts_for(*self)
    }

    /// Layout used before a model has told us otherwise
    pub fn default_layout(&self) -> &'static FeatureSpec {
        &self.layouts()[0]
    }

    /// Resolve a slug or display label
    pub fn from_slug(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.slug().eq_ignore_ascii_case(value) || d.label() == value || d.name() == value)
    }
}

impl Default for Disease {
    fn default() -> Self {
        Disease::ALL[0]
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Disease {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slug(s).ok_or_else(|| AppError::bad_request(format!("Unknown disease: {:?}", s)))
    }
}

/// One numeric input: what the user sees and the key it is submitted under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureField {
    pub label: &'static str,
    pub key: &'static str,
}

/// Ordered input layout of a disease model.
///
/// The order of `fields` is the order the classifier was trained on and is
/// never rearranged. `split` is how many fields go into the left column.
#[derive(Debug, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub fields: &'static [FeatureField],
    pub split: usize,
}

impl FeatureSpec {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.key)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.key == key)
    }

    /// Left and right column of the two-column layout
    pub fn columns(&self) -> (&'static [FeatureField], &'static [FeatureField]) {
        self.fields.split_at(self.split.min(self.fields.len()))
    }
}

/// Ordered feature values handed to a classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn zeroed(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Binary class returned by every classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryLabel {
    Negative,
    Positive,
}

impl BinaryLabel {
    /// Class 1 is positive; anything else is negative
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            BinaryLabel::Positive
        } else {
            BinaryLabel::Negative
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            BinaryLabel::Negative => 0,
            BinaryLabel::Positive => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryLabel::Negative => "Negative",
            BinaryLabel::Positive => "Positive",
        }
    }
}

impl fmt::Display for BinaryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one predict action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionResult {
    pub disease: Disease,
    pub label: BinaryLabel,
}

impl PredictionResult {
    pub fn new(disease: Disease, label: BinaryLabel) -> Self {
        Self { disease, label }
    }

    /// Banner text, e.g. "The person is Negative for 🩺 Diabetes"
    pub fn message(&self) -> String {
        format!("The person is {} for {}", self.label, self.disease.label())
    }
}
