//! Bundled model artifacts under models/

use disease_predictor::core::FormSession;
use disease_predictor::{BinaryLabel, Disease, FeatureVector, LoadPolicy, ModelRegistry};
use std::collections::HashMap;
use std::path::PathBuf;

fn models_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models")
}

#[test]
fn test_bundled_models_load_strictly() {
    let registry = ModelRegistry::load(&models_dir(), LoadPolicy::Strict).unwrap();
    assert_eq!(registry.available_count(), 5);

    for disease in Disease::ALL {
        let model = registry.get(disease).unwrap();
        assert_eq!(model.classifier().n_features(), disease.default_layout().len());
        assert_eq!(registry.spec_for(disease).name, disease.default_layout().name);
    }
}

#[test]
fn test_bundled_models_answer_zeroed_forms() {
    let registry = ModelRegistry::load_isolated(&models_dir());
    for disease in Disease::ALL {
        let zeros = FeatureVector::zeroed(registry.spec_for(disease).len());
        assert!(registry.get(disease).unwrap().predict(&zeros).is_ok(), "{}", disease);
    }
}

#[test]
fn test_diabetes_form_scenario() {
    let registry = ModelRegistry::load_strict(&models_dir()).unwrap();
    let mut form = FormSession::new();
    form.select(Disease::Diabetes, &registry);

    let raw: HashMap<String, String> = [
        ("Pregnancies", "2"),
        ("Glucose", "120"),
        ("BloodPressure", "70"),
        ("SkinThickness", "30"),
        ("Insulin", "80"),
        ("BMI", "25.0"),
        ("DiabetesPedigreeFunction", "0.5"),
        ("Age", "33"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    form.apply_inputs(&raw);

    assert_eq!(form.values(), &[2.0, 120.0, 70.0, 30.0, 80.0, 25.0, 0.5, 33.0]);
    let result = form.predict(&registry).unwrap();
    assert_eq!(result.label, BinaryLabel::Negative);
    assert_eq!(result.message(), "The person is Negative for 🩺 Diabetes");
}
