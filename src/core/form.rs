//! Form Pipeline
//!
//! Per-session state machine behind the prediction page:
//!
//! ```text
//! AwaitingSelection --select--> CollectingInputs --predict--> PredictionReady
//!                                      ^                            |
//!                                      +----------------------------+
//! ```
//!
//! `PredictionReady` is transient: `predict` assembles the vector, runs the
//! classifier and stores the banner, then control is back in
//! `CollectingInputs`. The banner stays until the next selection or edit.

use std::collections::HashMap;
use tracing::{debug, warn};

use super::registry::ModelRegistry;
use crate::models::errors::AppResult;
use crate::models::types::{Disease, FeatureField, FeatureSpec, FeatureVector, PredictionResult};

/// Increment of the numeric inputs
pub const FIELD_STEP: f64 = 1.0;
/// Value of every field until the user edits it
pub const FIELD_DEFAULT: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    AwaitingSelection,
    CollectingInputs,
    PredictionReady,
}

/// What the result banner shows after a predict action
#[derive(Debug, Clone, PartialEq)]
pub enum Displayed {
    Result(PredictionResult),
    /// Generic failure; details go to the log only
    Failed { disease: Disease },
}

impl Displayed {
    pub fn message(&self) -> String {
        match self {
            Displayed::Result(result) => result.message(),
            Displayed::Failed { disease } => {
                format!("Prediction failed for {}. Please try again.", disease.label())
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Displayed::Failed { .. })
    }
}

#[derive(Debug, Clone)]
struct Inputs {
    disease: Disease,
    spec: &'static FeatureSpec,
    values: Vec<f64>,
    displayed: Option<Displayed>,
}

impl Inputs {
    fn fresh(disease: Disease, spec: &'static FeatureSpec) -> Self {
        Self {
            disease,
            spec,
            values: vec![FIELD_DEFAULT; spec.len()],
            displayed: None,
        }
    }
}

/// Form state of one user session
#[derive(Debug, Clone, Default)]
pub struct FormSession {
    inputs: Option<Inputs>,
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> FormPhase {
        match self.inputs {
            None => FormPhase::AwaitingSelection,
            Some(_) => FormPhase::CollectingInputs,
        }
    }

    pub fn disease(&self) -> Option<Disease> {
        self.inputs.as_ref().map(|i| i.disease)
    }

    /// Select a disease. A different disease starts from zeroed fields;
    /// re-selecting the current one keeps what was typed.
    pub fn select(&mut self, disease: Disease, registry: &ModelRegistry) {
        if self.disease() == Some(disease) {
            return;
        }
        debug!(disease = disease.slug(), "Disease selected");
        self.inputs = Some(Inputs::fresh(disease, registry.spec_for(disease)));
    }

    /// Leave `AwaitingSelection` with the default disease
    pub fn ensure_selected(&mut self, registry: &ModelRegistry) -> Disease {
        match self.disease() {
            Some(disease) => disease,
            None => {
                let disease = Disease::default();
                self.select(disease, registry);
                disease
            }
        }
    }

    /// Input fields of the current selection, in vector order
    pub fn fields(&self) -> &'static [FeatureField] {
        self.inputs.as_ref().map(|i| i.spec.fields).unwrap_or(&[])
    }

    pub fn spec(&self) -> Option<&'static FeatureSpec> {
        self.inputs.as_ref().map(|i| i.spec)
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        let inputs = self.inputs.as_ref()?;
        inputs.spec.position(key).map(|i| inputs.values[i])
    }

    /// Current values in field order
    pub fn values(&self) -> &[f64] {
        self.inputs.as_ref().map(|i| i.values.as_slice()).unwrap_or(&[])
    }

    /// Set one field. Returns false if the current layout has no such key.
    pub fn set_value(&mut self, key: &str, value: f64) -> bool {
        let Some(inputs) = self.inputs.as_mut() else {
            return false;
        };
        match inputs.spec.position(key) {
            Some(index) => {
                inputs.values[index] = sanitize(value);
                inputs.displayed = None;
                true
            }
            None => false,
        }
    }

    /// Apply raw form text for every field of the layout. Missing, blank or
    /// non-numeric entries become 0.0; keys outside the layout are ignored.
    pub fn apply_inputs(&mut self, raw: &HashMap<String, String>) {
        let Some(inputs) = self.inputs.as_mut() else {
            return;
        };
        for (index, field) in inputs.spec.fields.iter().enumerate() {
            inputs.values[index] = raw.get(field.key).map(|v| parse_number(v)).unwrap_or(FIELD_DEFAULT);
        }
        inputs.displayed = None;
    }

    /// Values in layout order; empty before a selection
    pub fn feature_vector(&self) -> FeatureVector {
        FeatureVector::new(self.values().to_vec())
    }

    /// Run the selected disease's classifier on the current values.
    ///
    /// Selects the default disease first if nothing is selected. A failure
    /// affects this interaction only and is shown as a generic banner.
    pub fn predict(&mut self, registry: &ModelRegistry) -> AppResult<PredictionResult> {
        let disease = self.ensure_selected(registry);
        let vector = self.feature_vector();
        debug!(disease = disease.slug(), phase = ?FormPhase::PredictionReady, features = vector.len(), "Predicting");

        let outcome = registry
            .get(disease)
            .and_then(|model| model.predict(&vector))
            .map(|label| PredictionResult::new(disease, label));

        let displayed = match &outcome {
            Ok(result) => {
                debug!(disease = disease.slug(), label = result.label.as_str(), "Prediction complete");
                Displayed::Result(*result)
            }
            Err(e) => {
                warn!(disease = disease.slug(), code = e.code_str(), "Prediction failed: {}", e.message);
                Displayed::Failed { disease }
            }
        };
        if let Some(inputs) = self.inputs.as_mut() {
            inputs.displayed = Some(displayed);
        }

        outcome
    }

    /// Banner of the last predict action, until the next edit or selection
    pub fn displayed(&self) -> Option<&Displayed> {
        self.inputs.as_ref().and_then(|i| i.displayed.as_ref())
    }
}

/// Numeric text to a field value; anything unusable is 0.0
pub fn parse_number(raw: &str) -> f64 {
    raw.trim().parse::<f64>().map(sanitize).unwrap_or(FIELD_DEFAULT)
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        FIELD_DEFAULT
    }
}
