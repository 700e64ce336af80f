//! CLI interface for the pretty parser

use crate::error::{PrettyParserError, Result};
use crate::processing::rules::RuleSpec;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pretty-parser")]
#[command(about = "Parse PDF/TXT files or texts and clean them up with regular expressions")]
#[command(long_about = "Extract text from PDF or plain-text files (or take texts from the command line), join soft line wraps, merge hyphenated words, normalize whitespace and paragraph breaks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse and clean files or texts
    Run(RunArgs),

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// List registered PDF page extraction strategies
    Strategies,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Source mode: pdf, txt or list
    #[arg(short, long, default_value = "pdf")]
    pub mode: String,

    /// Files to parse
    #[arg(short, long, num_args = 1.., conflicts_with = "directories")]
    pub files: Vec<PathBuf>,

    /// Directories to parse recursively
    #[arg(short, long, num_args = 1..)]
    pub directories: Vec<PathBuf>,

    /// Text to clean in list mode (repeatable)
    #[arg(short, long)]
    pub text: Vec<String>,

    /// Output directory; results are printed as JSON when absent
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Extra rule applied before the defaults (repeatable). Use inline
    /// flags such as (?i) in the pattern and $1 or \1 in the replacement
    #[arg(long = "rule", num_args = 2, value_names = ["PATTERN", "REPLACEMENT"])]
    pub rules: Vec<String>,

    /// Skip the built-in cleanup rules
    #[arg(long)]
    pub no_defaults: bool,

    /// Remove blank lines after sentence ends
    #[arg(long)]
    pub remove_blank_lines: bool,

    /// Number of blank lines between paragraphs
    #[arg(long)]
    pub paragraph_spacing: Option<usize>,

    /// String inserted between PDF pages (\n and \t are unescaped)
    #[arg(long)]
    pub page_separator: Option<String>,

    /// Merge words hyphenated across line ends
    #[arg(long)]
    pub dehyphenate: bool,

    /// PDF page extraction strategy (see `strategies`)
    #[arg(long)]
    pub page_strategy: Option<String>,

    /// Overwrite existing output files
    #[arg(long)]
    pub overwrite: bool,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

impl RunArgs {
    /// Pair up `--rule PATTERN REPLACEMENT` values.
    pub fn rule_specs(&self) -> Result<Vec<RuleSpec>> {
        if self.rules.len() % 2 != 0 {
            return Err(PrettyParserError::Configuration(
                "Every --rule needs a pattern and a replacement".to_string(),
            ));
        }
        Ok(self
            .rules
            .chunks_exact(2)
            .map(|pair| RuleSpec::new(pair[0].clone(), pair[1].clone()))
            .collect())
    }
}

/// Turn `\n`, `\t` and `\\` typed on a shell into the characters they name.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"\n\n"), "\n\n");
        assert_eq!(unescape(r"--\t--"), "--\t--");
        assert_eq!(unescape(r"a\\n"), r"a\n");
        assert_eq!(unescape(r"\q\"), r"\q\");
    }

    #[test]
    fn test_run_args_parse() {
        let cli = Cli::try_parse_from([
            "pretty-parser",
            "run",
            "--mode",
            "txt",
            "--directories",
            "docs",
            "--rule",
            r"\[\d+\]",
            "",
            "--rule",
            "(?i)chapter",
            "CH",
            "--paragraph-spacing",
            "1",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.mode, "txt");
        assert_eq!(args.directories, vec![PathBuf::from("docs")]);
        let rules = args.rule_specs().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1], RuleSpec::new("(?i)chapter", "CH"));
        assert_eq!(args.paragraph_spacing, Some(1));
    }

    #[test]
    fn test_files_conflict_with_directories() {
        let result = Cli::try_parse_from([
            "pretty-parser",
            "run",
            "--files",
            "a.pdf",
            "--directories",
            "docs",
        ]);
        assert!(result.is_err());
    }
}
