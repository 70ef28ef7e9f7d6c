//! Input layouts per disease
//!
//! Field order is the column order each classifier was trained on. Treat
//! every table here as an external contract: reordering a field silently
//! breaks predictions.

use crate::models::types::{Disease, FeatureField, FeatureSpec};

const fn field(label: &'static str, key: &'static str) -> FeatureField {
    FeatureField { label, key }
}

// ============================================
// Diabetes
// ============================================

const DIABETES_FIELDS: &[FeatureField] = &[
    field("Number of Pregnancies", "Pregnancies"),
    field("Glucose Level", "Glucose"),
    field("Blood Pressure", "BloodPressure"),
    field("Skin Thickness", "SkinThickness"),
    field("Insulin Level", "Insulin"),
    field("BMI Value", "BMI"),
    field("Diabetes Pedigree Function", "DiabetesPedigreeFunction"),
    field("Age", "Age"),
];

// ============================================
// Heart Disease
// ============================================

const HEART_FIELDS: &[FeatureField] = &[
    field("Age", "Age"),
    field("Sex (1=Male, 0=Female)", "Sex"),
    field("Chest Pain Type", "CP"),
    field("Resting Blood Pressure", "Trestbps"),
    field("Cholesterol Level", "Chol"),
    field("Fasting Blood Sugar > 120 mg/dl (1=True, 0=False)", "FBS"),
    field("Resting ECG Results", "RestECG"),
    field("Max Heart Rate", "Thalach"),
    field("Exercise Induced Angina (1=Yes, 0=No)", "Exang"),
    field("ST Depression Induced by Exercise", "Oldpeak"),
    field("Slope of Peak Exercise ST Segment (0, 1, 2)", "Slope"),
    field("Major Vessels Colored by Fluoroscopy (0-3)", "CA"),
    field("Thal (0=Normal, 1=Fixed Defect, 2=Reversible Defect)", "Thal"),
];

// ============================================
// Parkinsons
// ============================================

const PARKINSONS_FIELDS: &[FeatureField] = &[
    field("MDVP:Fo(Hz)", "Fo"),
    field("MDVP:Fhi(Hz)", "Fhi"),
    field("MDVP:Flo(Hz)", "Flo"),
    field("MDVP:Jitter(%)", "Jitter_percent"),
    field("MDVP:Jitter(Abs)", "Jitter_Abs"),
    field("MDVP:RAP", "RAP"),
    field("MDVP:PPQ", "PPQ"),
    field("Jitter:DDP", "DDP"),
    field("MDVP:Shimmer", "Shimmer"),
    field("MDVP:Shimmer(dB)", "Shimmer_dB"),
    field("Shimmer:APQ3", "APQ3"),
    field("Shimmer:APQ5", "APQ5"),
    field("MDVP:APQ", "APQ"),
    field("Shimmer:DDA", "DDA"),
    field("NHR", "NHR"),
    field("HNR", "HNR"),
    field("RPDE", "RPDE"),
    field("DFA", "DFA"),
    field("Spread1", "Spread1"),
    field("Spread2", "Spread2"),
    field("D2", "D2"),
    field("PPE", "PPE"),
];

// ============================================
// Lung Cancer
// ============================================

const LUNG_FIELDS: &[FeatureField] = &[
    field("Gender (1 = Male; 0 = Female)", "GENDER"),
    field("Age", "AGE"),
    field("Smoking (1 = Yes; 0 = No)", "SMOKING"),
    field("Yellow Fingers (1 = Yes; 0 = No)", "YELLOW_FINGERS"),
    field("Anxiety (1 = Yes; 0 = No)", "ANXIETY"),
    field("Peer Pressure (1 = Yes; 0 = No)", "PEER_PRESSURE"),
    field("Chronic Disease (1 = Yes; 0 = No)", "CHRONIC_DISEASE"),
    field("Fatigue (1 = Yes; 0 = No)", "FATIGUE"),
    field("Allergy (1 = Yes; 0 = No)", "ALLERGY"),
    field("Wheezing (1 = Yes; 0 = No)", "WHEEZING"),
    field("Alcohol Consuming (1 = Yes; 0 = No)", "ALCOHOL_CONSUMING"),
    field("Coughing (1 = Yes; 0 = No)", "COUGHING"),
    field("Shortness Of Breath (1 = Yes; 0 = No)", "SHORTNESS_OF_BREATH"),
    field("Swallowing Difficulty (1 = Yes; 0 = No)", "SWALLOWING_DIFFICULTY"),
    field("Chest Pain (1 = Yes; 0 = No)", "CHEST_PAIN"),
];

// ============================================
// Hypo-Thyroid
// ============================================

const THYROID_FIELDS: &[FeatureField] = &[
    field("Age", "Age"),
    field("Sex", "Sex"),
    field("TSH Level", "TSH"),
    field("T3 Level", "T3"),
    field("TT4 Level", "TT4"),
    field("T4U Level", "T4U"),
    field("FTI Level", "FTI"),
];

// The compact variants are prefixes of the full field lists.
const HEART_COMPACT_FIELDS: &[FeatureField] = HEART_FIELDS.split_at(9).0;
const PARKINSONS_COMPACT_FIELDS: &[FeatureField] = PARKINSONS_FIELDS.split_at(6).0;

// ============================================
// Layout tables (default layout first)
// ============================================

static DIABETES_LAYOUTS: [FeatureSpec; 1] = [FeatureSpec {
    name: "standard",
    fields: DIABETES_FIELDS,
    split: 4,
}];

static HEART_LAYOUTS: [FeatureSpec; 2] = [
    FeatureSpec {
        name: "full",
        fields: HEART_FIELDS,
        split: 7,
    },
    FeatureSpec {
        name: "compact",
        fields: HEART_COMPACT_FIELDS,
        split: 5,
    },
];

static PARKINSONS_LAYOUTS: [FeatureSpec; 2] = [
    FeatureSpec {
        name: "full",
        fields: PARKINSONS_FIELDS,
        split: 11,
    },
    FeatureSpec {
        name: "compact",
        fields: PARKINSONS_COMPACT_FIELDS,
        split: 3,
    },
];

static LUNG_LAYOUTS: [FeatureSpec; 1] = [FeatureSpec {
    name: "standard",
    fields: LUNG_FIELDS,
    split: 8,
}];

static THYROID_LAYOUTS: [FeatureSpec; 1] = [FeatureSpec {
    name: "standard",
    fields: THYROID_FIELDS,
    split: 4,
}];

/// Every layout a model artifact for `disease` may be trained on
pub fn layouts_for(disease: Disease) -> &'static [FeatureSpec] {
    match disease {
        Disease::Diabetes => &DIABETES_LAYOUTS,
        Disease::HeartDisease => &HEART_LAYOUTS,
        Disease::Parkinsons => &PARKINSONS_LAYOUTS,
        Disease::LungCancer => &LUNG_LAYOUTS,
        Disease::HypoThyroid => &THYROID_LAYOUTS,
    }
}

/// Layout with exactly `width` fields, if the disease has one
pub fn layout_with_width(disease: Disease, width: usize) -> Option<&'static FeatureSpec> {
    layouts_for(disease).iter().find(|spec| spec.len() == width)
}
