//! Pretty parser library
//!
//! Extracts text from PDF and plain-text files (or takes in-memory strings)
//! and cleans extraction artifacts with an ordered set of regex rules.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{PrettyParserError, Result};
pub use input::file_detector::SourceMode;
pub use input::pdf::{PageExtractor, PdfPage};
pub use output::report::{ItemFailure, RunOutput, RunReport};
pub use processing::batch::{BatchRunner, BatchRunnerBuilder};
pub use processing::normalizer::{Normalizer, NormalizerConfig};
pub use processing::rules::{Rule, RuleSpec};
