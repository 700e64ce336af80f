//! Parallel batch runner
//!
//! Enumerates the configured inputs, extracts and normalizes every item on a
//! bounded worker pool and either collects the cleaned texts or writes them
//! under the output root. A failing item is logged and recorded, never
//! propagated to its siblings.

use crate::error::{PrettyParserError, Result};
use crate::input::file_detector::SourceMode;
use crate::input::pdf::{page_strategy, PageExtractor, DEFAULT_PAGE_STRATEGY};
use crate::input::source::{Inputs, SourceItem};
use crate::input::text_extractor::{self, TextExtractor};
use crate::output::report::{ItemFailure, RunOutput, RunReport, RunStats};
use crate::output::writer::{output_path, write_output};
use crate::processing::normalizer::{Normalizer, NormalizerConfig};
use crate::processing::progress::ProgressTracker;
use crate::processing::rules::RuleSpec;
use log::{error, info, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::any::Any;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Cores left free when the job count is derived from the host.
pub const RESERVED_CORES: usize = 2;

/// Default worker count for a host with `available` cores.
pub fn default_jobs(available: usize) -> usize {
    available.saturating_sub(RESERVED_CORES).max(1)
}

/// Workers actually started: never more than there are items, never zero.
pub fn effective_workers(jobs: usize, items: usize) -> usize {
    jobs.min(items).max(1)
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

enum Produced {
    Text(String),
    File(PathBuf),
}

pub struct BatchRunnerBuilder {
    mode: SourceMode,
    files: Vec<PathBuf>,
    directories: Vec<PathBuf>,
    texts: Vec<String>,
    output: Option<PathBuf>,
    normalizer: NormalizerConfig,
    page_extractor: Option<Arc<dyn PageExtractor>>,
    page_strategy: Option<String>,
    overwrite: bool,
    jobs: Option<usize>,
    show_progress: bool,
}

impl Default for BatchRunnerBuilder {
    fn default() -> Self {
        Self {
            mode: SourceMode::default(),
            files: Vec::new(),
            directories: Vec::new(),
            texts: Vec::new(),
            output: None,
            normalizer: NormalizerConfig::default(),
            page_extractor: None,
            page_strategy: None,
            overwrite: false,
            jobs: None,
            show_progress: false,
        }
    }
}

impl BatchRunnerBuilder {
    pub fn mode(mut self, mode: SourceMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    pub fn directories<I, P>(mut self, directories: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.directories
            .extend(directories.into_iter().map(Into::into));
        self
    }

    pub fn texts<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.texts.extend(texts.into_iter().map(Into::into));
        self
    }

    pub fn output(mut self, root: impl Into<PathBuf>) -> Self {
        self.output = Some(root.into());
        self
    }

    /// Replace every normalizer option at once.
    pub fn normalizer_config(mut self, config: NormalizerConfig) -> Self {
        self.normalizer = config;
        self
    }

    pub fn rule(mut self, rule: RuleSpec) -> Self {
        self.normalizer.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleSpec>) -> Self {
        self.normalizer.rules.extend(rules);
        self
    }

    pub fn apply_defaults(mut self, enabled: bool) -> Self {
        self.normalizer.apply_defaults = enabled;
        self
    }

    pub fn remove_blank_lines(mut self, enabled: bool) -> Self {
        self.normalizer.remove_blank_lines = enabled;
        self
    }

    pub fn paragraph_spacing(mut self, spacing: usize) -> Self {
        self.normalizer.paragraph_spacing = Some(spacing);
        self
    }

    pub fn page_separator(mut self, separator: impl Into<String>) -> Self {
        self.normalizer.page_separator = separator.into();
        self
    }

    pub fn dehyphenate(mut self, enabled: bool) -> Self {
        self.normalizer.dehyphenate = enabled;
        self
    }

    /// Replace the per-page text extraction.
    pub fn page_extractor(mut self, extractor: Arc<dyn PageExtractor>) -> Self {
        self.page_extractor = Some(extractor);
        self
    }

    /// Select a registered page strategy by name.
    pub fn page_strategy(mut self, name: impl Into<String>) -> Self {
        self.page_strategy = Some(name.into());
        self
    }

    pub fn overwrite(mut self, enabled: bool) -> Self {
        self.overwrite = enabled;
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    fn inputs(&mut self) -> Result<Inputs> {
        let files = std::mem::take(&mut self.files);
        let directories = std::mem::take(&mut self.directories);
        let texts = std::mem::take(&mut self.texts);

        if self.mode == SourceMode::Memory {
            if !files.is_empty() || !directories.is_empty() {
                return Err(PrettyParserError::Configuration(
                    "Files and directories cannot be used in list mode".to_string(),
                ));
            }
            if self.output.is_some() {
                return Err(PrettyParserError::Configuration(
                    "An output directory requires pdf or txt mode".to_string(),
                ));
            }
            if texts.is_empty() {
                return Err(PrettyParserError::Configuration(
                    "No texts provided".to_string(),
                ));
            }
            return Ok(Inputs::Texts(texts));
        }

        if !texts.is_empty() {
            return Err(PrettyParserError::Configuration(format!(
                "In-memory texts cannot be used in {} mode",
                self.mode
            )));
        }

        match (files.is_empty(), directories.is_empty()) {
            (false, false) => Err(PrettyParserError::Configuration(
                "Files and directories are mutually exclusive".to_string(),
            )),
            (true, true) => Err(PrettyParserError::Configuration(
                "Either files or directories must be provided".to_string(),
            )),
            (false, true) => Ok(Inputs::Files(files)),
            (true, false) => Ok(Inputs::Directories(directories)),
        }
    }

    pub fn build(mut self) -> Result<BatchRunner> {
        let inputs = self.inputs()?;

        let jobs = match self.jobs {
            Some(0) => {
                return Err(PrettyParserError::Configuration(
                    "The number of jobs must be at least 1".to_string(),
                ))
            }
            Some(jobs) => jobs,
            None => default_jobs(available_parallelism()),
        };

        let normalizer = Normalizer::new(&self.normalizer)?;

        let page_extractor = match self.page_extractor {
            Some(extractor) => extractor,
            None => page_strategy(
                self.page_strategy
                    .as_deref()
                    .unwrap_or(DEFAULT_PAGE_STRATEGY),
            )?,
        };
        let extractor =
            text_extractor::for_mode(self.mode, page_extractor, &self.normalizer.page_separator);

        Ok(BatchRunner {
            mode: self.mode,
            inputs,
            output: self.output,
            overwrite: self.overwrite,
            jobs,
            normalizer: Arc::new(normalizer),
            extractor,
            show_progress: self.show_progress,
        })
    }
}

pub struct BatchRunner {
    mode: SourceMode,
    inputs: Inputs,
    output: Option<PathBuf>,
    overwrite: bool,
    jobs: usize,
    normalizer: Arc<Normalizer>,
    extractor: Arc<dyn TextExtractor>,
    show_progress: bool,
}

impl BatchRunner {
    pub fn builder() -> BatchRunnerBuilder {
        BatchRunnerBuilder::default()
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Process every item. Fails only when inputs are missing or the pool
    /// cannot start; item failures are reported in the returned report.
    pub fn run(&self) -> Result<RunReport> {
        self.inputs.check_exists()?;
        let items = self.inputs.enumerate(self.mode)?;
        let workers = effective_workers(self.jobs, items.len());

        if items.is_empty() {
            warn!("No {} inputs found", self.mode);
        }
        info!("Processing {} items with {} workers", items.len(), workers);

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| {
                PrettyParserError::Processing(format!("Failed to start worker pool: {}", e))
            })?;

        let tracker = ProgressTracker::new(items.len(), self.show_progress);
        let outcomes: Vec<Result<Produced>> = pool.install(|| {
            items
                .par_iter()
                .map(|item| self.process_isolated(item, &tracker))
                .collect()
        });
        tracker.finish();

        let mut texts = BTreeMap::new();
        let mut written = Vec::new();
        let mut failures = Vec::new();
        for (item, outcome) in items.iter().zip(outcomes) {
            match outcome {
                Ok(Produced::Text(text)) => {
                    texts.insert(item.id.clone(), text);
                }
                Ok(Produced::File(path)) => written.push(path),
                Err(e) => failures.push(ItemFailure {
                    id: item.id.clone(),
                    message: e.to_string(),
                }),
            }
        }

        let stats = RunStats {
            total: items.len(),
            succeeded: items.len() - failures.len(),
            failed: failures.len(),
            workers,
            elapsed_secs: tracker.elapsed().as_secs_f64(),
            average_secs: tracker.average().as_secs_f64(),
        };
        info!(
            "Finished: {}/{} succeeded in {:.2}s",
            stats.succeeded, stats.total, stats.elapsed_secs
        );

        let output = match self.output {
            Some(_) => RunOutput::Written(written),
            None => RunOutput::Collected(texts),
        };

        Ok(RunReport {
            output,
            failures,
            stats,
        })
    }

    fn process_isolated(&self, item: &SourceItem, tracker: &ProgressTracker) -> Result<Produced> {
        let start = Instant::now();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.process(item)))
            .unwrap_or_else(|payload| {
                Err(PrettyParserError::Processing(format!(
                    "Worker panicked: {}",
                    panic_message(&*payload)
                )))
            });

        if let Err(e) = &outcome {
            error!("Failed to process {}: {}", item.id, e);
        }
        tracker.record(&item.id, start.elapsed());
        outcome
    }

    fn process(&self, item: &SourceItem) -> Result<Produced> {
        let raw = self.extractor.extract(item)?;
        let cleaned = self.normalizer.apply(&raw);

        let Some(root) = &self.output else {
            return Ok(Produced::Text(cleaned));
        };

        let relative = item.relative_path().ok_or_else(|| {
            PrettyParserError::InvalidInput(format!("Item {} has no path to mirror", item.id))
        })?;
        let path = output_path(root, relative);
        write_output(&path, &cleaned, self.overwrite)?;
        info!("Written to: {}", path.display());
        Ok(Produced::File(path))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
