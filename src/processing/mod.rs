//! Normalization rules and batch processing

pub mod batch;
pub mod normalizer;
pub mod progress;
pub mod rules;
