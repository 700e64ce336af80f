//! Batch progress tracking

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Completed-item counter shared by all workers. Observational only.
pub struct ProgressTracker {
    total: usize,
    completed: AtomicUsize,
    busy_nanos: AtomicU64,
    started: Instant,
    bar: ProgressBar,
}

impl ProgressTracker {
    pub fn new(total: usize, show_bar: bool) -> Self {
        let bar = if show_bar {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(BAR_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▓▒░  "),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            total,
            completed: AtomicUsize::new(0),
            busy_nanos: AtomicU64::new(0),
            started: Instant::now(),
            bar,
        }
    }

    /// Record one finished item and how long it took.
    pub fn record(&self, id: &str, took: Duration) {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let took_nanos = u64::try_from(took.as_nanos()).unwrap_or(u64::MAX);
        self.busy_nanos.fetch_add(took_nanos, Ordering::SeqCst);

        self.bar.set_message(id.to_string());
        self.bar.inc(1);

        let percent = if self.total == 0 {
            100.0
        } else {
            100.0 * done as f64 / self.total as f64
        };
        info!(
            "Processed {} ({}/{}, {:.1}%), average {:.2}s/item",
            id,
            done,
            self.total,
            percent,
            self.average().as_secs_f64()
        );
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Mean time spent per completed item.
    pub fn average(&self) -> Duration {
        let done = self.completed() as u64;
        if done == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.busy_nanos.load(Ordering::SeqCst) / done)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_average() {
        let tracker = ProgressTracker::new(3, false);
        assert_eq!(tracker.average(), Duration::ZERO);

        tracker.record("a", Duration::from_millis(100));
        tracker.record("b", Duration::from_millis(300));

        assert_eq!(tracker.completed(), 2);
        assert_eq!(tracker.average(), Duration::from_millis(200));
        tracker.finish();
    }
}
