//! Output formatters for run reports

use crate::error::Result;
use crate::output::report::{RunOutput, RunReport};
use colored::{Color, Colorize};

/// Trait for formatting run reports
pub trait OutputFormatter {
    fn format_report(&self, report: &RunReport) -> Result<String>;
}

/// Colored run summary for the terminal
pub struct ConsoleFormatter {
    use_colors: bool,
}

/// JSON formatter for piping results into other tools
pub struct JsonFormatter {
    pretty: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn label(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &RunReport) -> Result<String> {
        let stats = &report.stats;
        let mut output = String::new();

        for failure in &report.failures {
            output.push_str(&format!(
                "{} {} - {}\n",
                self.label("✗", Color::Red),
                failure.id,
                self.colorize(&failure.message, Color::Red)
            ));
        }

        if let RunOutput::Written(paths) = &report.output {
            for path in paths {
                output.push_str(&format!(
                    "{} Written to: {}\n",
                    self.label("✓", Color::Green),
                    path.display()
                ));
            }
        }

        let status = if stats.failed == 0 {
            self.label("Done:", Color::Green)
        } else {
            self.label("Done with errors:", Color::Yellow)
        };
        output.push_str(&format!(
            "{} {}/{} items succeeded, {} failed ({} workers)\n",
            status, stats.succeeded, stats.total, stats.failed, stats.workers
        ));
        output.push_str(&format!(
            "  Time elapsed: {:.2}s, average: {:.2}s/item\n",
            stats.elapsed_secs, stats.average_secs
        ));

        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &RunReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::{ItemFailure, RunStats};
    use std::collections::BTreeMap;

    fn report() -> RunReport {
        let mut texts = BTreeMap::new();
        texts.insert("a.txt".to_string(), "clean".to_string());
        RunReport {
            output: RunOutput::Collected(texts),
            failures: vec![ItemFailure {
                id: "b.txt".to_string(),
                message: "IO error: denied".to_string(),
            }],
            stats: RunStats {
                total: 2,
                succeeded: 1,
                failed: 1,
                workers: 2,
                elapsed_secs: 0.5,
                average_secs: 0.25,
            },
        }
    }

    #[test]
    fn test_console_summary() {
        let text = ConsoleFormatter::new(false).format_report(&report()).unwrap();
        assert!(text.contains("✗ b.txt - IO error: denied"));
        assert!(text.contains("1/2 items succeeded, 1 failed (2 workers)"));
    }

    #[test]
    fn test_json_report() {
        let json = JsonFormatter::new(false).format_report(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["output"]["collected"]["a.txt"], "clean");
        assert_eq!(value["failures"][0]["id"], "b.txt");
        assert_eq!(value["stats"]["total"], 2);
    }
}
