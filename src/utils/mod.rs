//! Utils Module - Helper Functions & Shared Utilities
//!
//! Session storage and page rendering used by the API layer.

pub mod render;
pub mod session;

pub use render::*;
pub use session::*;
