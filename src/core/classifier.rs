//! Classifier Module
//!
//! Every disease model is hidden behind the [`Classifier`] trait. Concrete
//! classifiers are built from JSON model artifacts:
//!
//! ```json
//! { "feature_names": ["Pregnancies", "..."],
//!   "model": { "type": "logistic_regression", "coefficients": [..], "intercept": -3.1 } }
//! ```
//!
//! Supported model types:
//! 1. `logistic_regression` - sigmoid(w·x + b) >= threshold
//! 2. `linear_svc` - w·x + b > 0
//! 3. `decision_tree` - binary split nodes, `x[feature] <= threshold` goes left
//! 4. `random_forest` - majority vote over trees, ties are positive

use serde::Deserialize;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{BinaryLabel, FeatureVector};

/// A read-only binary classifier shared by all requests
pub trait Classifier: Send + Sync {
    /// Number of inputs the model was trained on
    fn n_features(&self) -> usize;

    /// Predict the class of one feature vector
    fn predict(&self, features: &FeatureVector) -> AppResult<BinaryLabel>;

    /// Short model family name for logs and the API
    fn model_type(&self) -> &'static str;
}

fn ensure_width(expected: usize, features: &FeatureVector) -> AppResult<()> {
    if features.len() != expected {
        return Err(AppError::shape_mismatch(expected, features.len()));
    }
    Ok(())
}

// ============================================
// ARTIFACT FORMAT
// ============================================

/// On-disk model document
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    /// Training column names, in order. Checked against the form layout.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub model: ModelSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    LogisticRegression {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
        #[serde(default)]
        scaler: Option<Scaler>,
    },
    LinearSvc {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default)]
        scaler: Option<Scaler>,
    },
    DecisionTree {
        n_features: usize,
        nodes: Vec<TreeNode>,
    },
    RandomForest {
        n_features: usize,
        trees: Vec<Vec<TreeNode>>,
    },
}

fn default_threshold() -> f64 {
    0.5
}

/// Standardization applied before a linear model: (x - mean) / scale
#[derive(Debug, Clone, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Node of a decision tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Leaf {
        leaf: u8,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

impl ModelArtifact {
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Validate the document and build the classifier it describes
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, String> {
        let classifier: Box<dyn Classifier> = match self.model {
            ModelSpec::LogisticRegression {
                coefficients,
                intercept,
                threshold,
                scaler,
            } => {
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(format!("threshold {} outside [0, 1]", threshold));
                }
                Box::new(LinearModel::new(
                    coefficients,
                    intercept,
                    scaler,
                    Decision::Logistic { threshold },
                )?)
            }
            ModelSpec::LinearSvc {
                coefficients,
                intercept,
                scaler,
            } => Box::new(LinearModel::new(coefficients, intercept, scaler, Decision::Margin)?),
            ModelSpec::DecisionTree { n_features, nodes } => {
                Box::new(TreeModel::new(n_features, nodes)?)
            }
            ModelSpec::RandomForest { n_features, trees } => {
                if trees.is_empty() {
                    return Err("random forest has no trees".to_string());
                }
                let trees = trees
                    .into_iter()
                    .enumerate()
                    .map(|(i, nodes)| {
                        TreeModel::new(n_features, nodes).map_err(|e| format!("tree {}: {}", i, e))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Box::new(ForestModel { n_features, trees })
            }
        };

        if let Some(names) = &self.feature_names {
            if names.len() != classifier.n_features() {
                return Err(format!(
                    "{} feature names for a model with {} inputs",
                    names.len(),
                    classifier.n_features()
                ));
            }
        }

        Ok(classifier)
    }
}

// ============================================
// LINEAR MODELS
// ============================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Decision {
    Logistic { threshold: f64 },
    Margin,
}

/// Logistic regression or linear SVM
#[derive(Debug, Clone)]
pub struct LinearModel {
    coefficients: Vec<f64>,
    intercept: f64,
    scaler: Option<Scaler>,
    decision: Decision,
}

impl LinearModel {
    fn new(
        coefficients: Vec<f64>,
        intercept: f64,
        scaler: Option<Scaler>,
        decision: Decision,
    ) -> Result<Self, String> {
        if coefficients.is_empty() {
            return Err("model has no coefficients".to_string());
        }
        if coefficients.iter().any(|c| !c.is_finite()) || !intercept.is_finite() {
            return Err("coefficients must be finite".to_string());
        }
        if let Some(scaler) = &scaler {
            if scaler.mean.len() != coefficients.len() || scaler.scale.len() != coefficients.len() {
                return Err(format!(
                    "scaler has {}/{} entries for {} coefficients",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    coefficients.len()
                ));
            }
            if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err("scaler scale must be finite and non-zero".to_string());
            }
        }
        Ok(Self {
            coefficients,
            intercept,
            scaler,
            decision,
        })
    }

    /// w·x + b, after optional standardization
    pub fn decision_function(&self, features: &FeatureVector) -> AppResult<f64> {
        ensure_width(self.coefficients.len(), features)?;
        let x = features.as_slice();
        let dot: f64 = match &self.scaler {
            Some(scaler) => self
                .coefficients
                .iter()
                .zip(x)
                .zip(scaler.mean.iter().zip(&scaler.scale))
                .map(|((w, v), (m, s))| w * (v - m) / s)
                .sum(),
            None => self.coefficients.iter().zip(x).map(|(w, v)| w * v).sum(),
        };
        Ok(dot + self.intercept)
    }
}

impl Classifier for LinearModel {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &FeatureVector) -> AppResult<BinaryLabel> {
        let margin = self.decision_function(features)?;
        let positive = match self.decision {
            Decision::Logistic { threshold } => sigmoid(margin) >= threshold,
            Decision::Margin => margin > 0.0,
        };
        Ok(if positive {
            BinaryLabel::Positive
        } else {
            BinaryLabel::Negative
        })
    }

    fn model_type(&self) -> &'static str {
        match self.decision {
            Decision::Logistic { .. } => "logistic_regression",
            Decision::Margin => "linear_svc",
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

// ============================================
// TREE MODELS
// ============================================

/// Single decision tree
#[derive(Debug, Clone)]
pub struct TreeModel {
    n_features: usize,
    nodes: Vec<TreeNode>,
}

impl TreeModel {
    fn new(n_features: usize, nodes: Vec<TreeNode>) -> Result<Self, String> {
        if n_features == 0 {
            return Err("n_features must be positive".to_string());
        }
        if nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { leaf } if *leaf > 1 => {
                    return Err(format!("node {}: leaf class {} is not binary", index, leaf));
                }
                TreeNode::Leaf { .. } => {}
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {}: feature {} out of range", index, feature));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {}: threshold is NaN", index));
                    }
                    // Children always come after their parent, so walks terminate.
                    for child in [*left, *right] {
                        if child <= index || child >= nodes.len() {
                            return Err(format!("node {}: invalid child index {}", index, child));
                        }
                    }
                }
            }
        }
        Ok(Self { n_features, nodes })
    }

    fn leaf_for(&self, x: &[f64]) -> AppResult<u8> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { leaf }) => return Ok(*leaf),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    index = if x[*feature] <= *threshold { *left } else { *right };
                }
                None => return Err(AppError::invalid_model(format!("tree node {} missing", index))),
            }
        }
    }
}

impl Classifier for TreeModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &FeatureVector) -> AppResult<BinaryLabel> {
        ensure_width(self.n_features, features)?;
        self.leaf_for(features.as_slice()).map(BinaryLabel::from_class)
    }

    fn model_type(&self) -> &'static str {
        "decision_tree"
    }
}

/// Majority vote over decision trees
#[derive(Debug, Clone)]
pub struct ForestModel {
    n_features: usize,
    trees: Vec<TreeModel>,
}

impl Classifier for ForestModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &FeatureVector) -> AppResult<BinaryLabel> {
        ensure_width(self.n_features, features)?;
        let x = features.as_slice();
        let mut positive = 0usize;
        for tree in &self.trees {
            if tree.leaf_for(x)? == 1 {
                positive += 1;
            }
        }
        Ok(if positive * 2 >= self.trees.len() {
            BinaryLabel::Positive
        } else {
            BinaryLabel::Negative
        })
    }

    fn model_type(&self) -> &'static str {
        "random_forest"
    }
}
