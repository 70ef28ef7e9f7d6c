//! Core Module - Prediction Pipeline
//!
//! Field layouts, classifiers, the model registry and the per-session form
//! state machine. Nothing in here knows about HTTP.

pub mod classifier;
pub mod features;
pub mod form;
pub mod registry;

pub use classifier::*;
pub use features::*;
pub use form::*;
pub use registry::*;
