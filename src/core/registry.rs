//! Model Registry
//!
//! Write-once mapping from [`Disease`] to its classifier. Built explicitly at
//! startup and shared read-only (behind an `Arc`) by every request; there is
//! no global instance and no mutation after construction, so no locking.
//!
//! Each artifact is matched against the disease's field layouts when it is
//! loaded: the layout whose width equals the model's input width is chosen,
//! and declared `feature_names` must equal that layout's keys in order.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::classifier::{Classifier, ModelArtifact};
use super::features::layout_with_width;
use crate::models::config::{artifact_path, LoadPolicy};
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{BinaryLabel, Disease, FeatureSpec, FeatureVector};

/// A loaded classifier and the input layout it was matched to
pub struct RegisteredModel {
    pub disease: Disease,
    pub spec: &'static FeatureSpec,
    pub source: Option<PathBuf>,
    classifier: Box<dyn Classifier>,
}

impl RegisteredModel {
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn predict(&self, features: &FeatureVector) -> AppResult<BinaryLabel> {
        self.classifier.predict(features)
    }
}

impl fmt::Debug for RegisteredModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredModel")
            .field("disease", &self.disease)
            .field("layout", &self.spec.name)
            .field("model_type", &self.classifier.model_type())
            .field("source", &self.source)
            .finish()
    }
}

/// Why a disease has no classifier
#[derive(Debug, Clone)]
struct LoadFailure {
    code: ErrorCode,
    message: String,
}

impl From<&AppError> for LoadFailure {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
        }
    }
}

type Slot = Result<RegisteredModel, LoadFailure>;

/// One slot per disease; `slot` matches exhaustively over [`Disease`]
#[derive(Debug)]
pub struct ModelRegistry {
    diabetes: Slot,
    heart_disease: Slot,
    parkinsons: Slot,
    lung_cancer: Slot,
    hypothyroid: Slot,
}

impl ModelRegistry {
    fn assemble(mut load: impl FnMut(Disease) -> Slot) -> Self {
        Self {
            diabetes: load(Disease::Diabetes),
            heart_disease: load(Disease::HeartDisease),
            parkinsons: load(Disease::Parkinsons),
            lung_cancer: load(Disease::LungCancer),
            hypothyroid: load(Disease::HypoThyroid),
        }
    }

    fn slot(&self, disease: Disease) -> &Slot {
        match disease {
            Disease::Diabetes => &self.diabetes,
            Disease::HeartDisease => &self.heart_disease,
            Disease::Parkinsons => &self.parkinsons,
            Disease::LungCancer => &self.lung_cancer,
            Disease::HypoThyroid => &self.hypothyroid,
        }
    }

    /// Load with the configured policy
    pub fn load(models_dir: &Path, policy: LoadPolicy) -> AppResult<Self> {
        match policy {
            LoadPolicy::Strict => Self::load_strict(models_dir),
            LoadPolicy::Isolated => Ok(Self::load_isolated(models_dir)),
        }
    }

    /// All five artifacts must load; the first failure aborts
    pub fn load_strict(models_dir: &Path) -> AppResult<Self> {
        let mut loaded = Vec::with_capacity(Disease::ALL.len());
        for disease in Disease::ALL {
            let path = artifact_path(models_dir, disease);
            match load_model(disease, &path) {
                Ok(model) => loaded.push(model),
                Err(e) => {
                    error!(disease = disease.slug(), code = e.code_str(), "Startup aborted: {}", e.message);
                    return Err(e);
                }
            }
        }

        let mut loaded = loaded.into_iter();
        let registry = Self::assemble(|disease| {
            loaded.next().filter(|m| m.disease == disease).ok_or(LoadFailure {
                code: ErrorCode::ModelUnavailable,
                message: format!("{} model missing after load", disease.name()),
            })
        });
        info!("📦 Model registry ready: {}/5 models", registry.available_count());
        Ok(registry)
    }

    /// Each artifact loads on its own; failures disable only that disease
    pub fn load_isolated(models_dir: &Path) -> Self {
        let registry = Self::assemble(|disease| {
            let path = artifact_path(models_dir, disease);
            load_model(disease, &path).map_err(|e| {
                warn!(disease = disease.slug(), code = e.code_str(), "Model disabled: {}", e.message);
                LoadFailure::from(&e)
            })
        });
        info!("📦 Model registry ready: {}/5 models", registry.available_count());
        registry
    }

    /// In-memory registration, mostly for tests and embedding
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Classifier and layout for `disease`
    pub fn get(&self, disease: Disease) -> AppResult<&RegisteredModel> {
        self.slot(disease)
            .as_ref()
            .map_err(|failure| AppError::model_unavailable(disease, &failure.message))
    }

    /// The original load error of a disabled disease
    pub fn load_error(&self, disease: Disease) -> Option<AppError> {
        self.slot(disease)
            .as_ref()
            .err()
            .map(|failure| AppError::new(failure.code, failure.message.clone()))
    }

    /// Layout the form shows; falls back to the default for disabled diseases
    pub fn spec_for(&self, disease: Disease) -> &'static FeatureSpec {
        match self.slot(disease) {
            Ok(model) => model.spec,
            Err(_) => disease.default_layout(),
        }
    }

    pub fn is_available(&self, disease: Disease) -> bool {
        self.slot(disease).is_ok()
    }

    pub fn available_count(&self) -> usize {
        Disease::ALL.iter().filter(|d| self.is_available(**d)).count()
    }
}

/// Assembles a registry from classifiers already in memory
#[derive(Default)]
pub struct RegistryBuilder {
    models: Vec<RegisteredModel>,
}

impl RegistryBuilder {
    /// Register `classifier` for `disease`; its width selects the layout
    pub fn register(mut self, disease: Disease, classifier: Box<dyn Classifier>) -> AppResult<Self> {
        let spec = resolve_layout(disease, classifier.n_features(), None)?;
        self.models.retain(|m| m.disease != disease);
        self.models.push(RegisteredModel {
            disease,
            spec,
            source: None,
            classifier,
        });
        Ok(self)
    }

    /// Unregistered diseases are reported as unavailable
    pub fn build(mut self) -> ModelRegistry {
        ModelRegistry::assemble(|disease| {
            match self.models.iter().position(|m| m.disease == disease) {
                Some(index) => Ok(self.models.swap_remove(index)),
                None => Err(LoadFailure {
                    code: ErrorCode::ModelUnavailable,
                    message: format!("no {} model registered", disease.name()),
                }),
            }
        })
    }
}

/// Read, parse and validate one artifact
pub fn load_model(disease: Disease, path: &Path) -> AppResult<RegisteredModel> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::model_not_found(disease, format!("{} ({})", path.display(), e)))?;

    let artifact = ModelArtifact::from_slice(&bytes)
        .map_err(|e| AppError::model_malformed(disease, format!("{}: {}", path.display(), e)))?;
    let feature_names = artifact.feature_names.clone();

    let classifier = artifact
        .into_classifier()
        .map_err(|e| AppError::model_malformed(disease, format!("{}: {}", path.display(), e)))?;

    let spec = resolve_layout(disease, classifier.n_features(), feature_names.as_deref())?;

    info!(
        disease = disease.slug(),
        model_type = classifier.model_type(),
        features = classifier.n_features(),
        layout = spec.name,
        "✅ Loaded {} model",
        disease.label()
    );

    Ok(RegisteredModel {
        disease,
        spec,
        source: Some(path.to_path_buf()),
        classifier,
    })
}

/// Pick the layout a model of `width` inputs was trained on
pub fn resolve_layout(
    disease: Disease,
    width: usize,
    feature_names: Option<&[String]>,
) -> AppResult<&'static FeatureSpec> {
    let spec = layout_with_width(disease, width).ok_or_else(|| {
        let accepted: Vec<String> = disease.layouts().iter().map(|s| s.len().to_string()).collect();
        AppError::layout_mismatch(
            disease,
            format!("model takes {} inputs, form accepts {}", width, accepted.join(" or ")),
        )
    })?;

    if let Some(names) = feature_names {
        let expected: Vec<&str> = spec.keys().collect();
        if names.iter().map(String::as_str).ne(expected.iter().copied()) {
            return Err(AppError::layout_mismatch(
                disease,
                format!("feature names {:?} differ from form order {:?}", names, expected),
            ));
        }
    }

    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn linear_artifact(width: usize) -> String {
        let coefficients = vec!["0.1"; width].join(",");
        format!(
            r#"{{"model":{{"type":"linear_svc","coefficients":[{}],"intercept":-1.0}}}}"#,
            coefficients
        )
    }

    fn write_all(dir: &Path) {
        for disease in Disease::ALL {
            let width = disease.default_layout().len();
            fs::write(artifact_path(dir, disease), linear_artifact(width)).unwrap();
        }
    }

    #[test]
    fn test_strict_load_all() {
        let dir = TempDir::new().unwrap();
        write_all(dir.path());

        let registry = ModelRegistry::load_strict(dir.path()).unwrap();
        assert_eq!(registry.available_count(), 5);
        for disease in Disease::ALL {
            let model = registry.get(disease).unwrap();
            assert_eq!(model.disease, disease);
            assert_eq!(model.spec.len(), model.classifier().n_features());
        }
    }

    #[test]
    fn test_missing_artifact_strict_names_disease() {
        let dir = TempDir::new().unwrap();
        write_all(dir.path());
        fs::remove_file(dir.path().join("lungs_disease_model.json")).unwrap();

        let err = ModelRegistry::load_strict(dir.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ModelNotFound);
        assert!(err.message.contains("Lung Cancer"));
    }

    #[test]
    fn test_missing_artifact_isolated_keeps_others() {
        let dir = TempDir::new().unwrap();
        write_all(dir.path());
        fs::remove_file(dir.path().join("lungs_disease_model.json")).unwrap();

        let registry = ModelRegistry::load(dir.path(), LoadPolicy::Isolated).unwrap();
        assert_eq!(registry.available_count(), 4);
        assert!(registry.get(Disease::Diabetes).is_ok());

        let err = registry.get(Disease::LungCancer).unwrap_err();
        assert!(err.is_load_error());
        assert!(err.message.contains("Lung Cancer"));
        assert_eq!(registry.load_error(Disease::LungCancer).unwrap().code, ErrorCode::ModelNotFound);
        assert_eq!(registry.spec_for(Disease::LungCancer).len(), 15);
    }

    #[test]
    fn test_malformed_artifact() {
        let dir = TempDir::new().unwrap();
        write_all(dir.path());
        fs::write(dir.path().join("Thyroid_model.json"), b"\x80\x03cnot json").unwrap();

        let err = ModelRegistry::load_strict(dir.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ModelMalformed);
        assert!(err.message.contains("Hypo-Thyroid"));
    }

    #[test]
    fn test_compact_heart_layout_selected_by_width() {
        let dir = TempDir::new().unwrap();
        write_all(dir.path());
        fs::write(dir.path().join("heart_disease_model.json"), linear_artifact(9)).unwrap();

        let registry = ModelRegistry::load_strict(dir.path()).unwrap();
        let spec = registry.spec_for(Disease::HeartDisease);
        assert_eq!(spec.name, "compact");
        assert_eq!(spec.len(), 9);
    }

    #[test]
    fn test_width_without_layout_is_rejected() {
        let dir = TempDir::new().unwrap();
        write_all(dir.path());
        fs::write(dir.path().join("parkinsons_model.json"), linear_artifact(10)).unwrap();

        let err = ModelRegistry::load_strict(dir.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ModelLayoutMismatch);
        assert!(err.message.contains("22 or 6"));
    }

    #[test]
    fn test_feature_names_must_follow_form_order() {
        let names: Vec<String> = ["Age", "Sex", "TSH", "T3", "TT4", "FTI", "T4U"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let err = resolve_layout(Disease::HypoThyroid, 7, Some(&names)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ModelLayoutMismatch);

        let names: Vec<String> = Disease::HypoThyroid.default_layout().keys().map(String::from).collect();
        assert!(resolve_layout(Disease::HypoThyroid, 7, Some(&names)).is_ok());
    }
}
