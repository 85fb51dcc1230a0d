//! Preference-weighted app comparison: scoring, explainability, and market
//! insight derivations behind a small HTTP surface.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
