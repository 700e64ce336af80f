//! Run results

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// An item that produced no output, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub id: String,
    pub message: String,
}

/// Either the cleaned texts keyed by source id or the files written. Never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutput {
    Collected(BTreeMap<String, String>),
    Written(Vec<PathBuf>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub workers: usize,
    pub elapsed_secs: f64,
    /// Mean processing time of a single item.
    pub average_secs: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub output: RunOutput,
    pub failures: Vec<ItemFailure>,
    pub stats: RunStats,
}

impl RunReport {
    pub fn collected(&self) -> Option<&BTreeMap<String, String>> {
        match &self.output {
            RunOutput::Collected(texts) => Some(texts),
            RunOutput::Written(_) => None,
        }
    }

    pub fn written(&self) -> Option<&[PathBuf]> {
        match &self.output {
            RunOutput::Written(paths) => Some(paths),
            RunOutput::Collected(_) => None,
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
