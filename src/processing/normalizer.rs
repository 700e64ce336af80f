//! Text normalization pipeline
//!
//! User rules run first. The built-in rules then run in the order of
//! [`BUILTIN_RULES`], followed by a trim, repeated until the text no longer
//! changes. Paragraph spacing, when configured, runs last and every newline
//! run becomes a paragraph break.

use crate::error::Result;
use crate::processing::rules::{Rule, RuleSpec};
use log::debug;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const SOFT_WRAP_LOWERCASE: &str = "soft-wrap-lowercase";
pub const SOFT_WRAP_UPPERCASE: &str = "soft-wrap-uppercase";
pub const LIST_MARKER: &str = "list-marker";
pub const HORIZONTAL_WHITESPACE: &str = "horizontal-whitespace";
pub const LINE_LEADING_WHITESPACE: &str = "line-leading-whitespace";
pub const BLANK_LINE: &str = "blank-line";
pub const EOL_HYPHEN: &str = "eol-hyphen";
pub const PARAGRAPH_SPACING: &str = "paragraph-spacing";

/// Option that switches a built-in rule on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Always,
    RemoveBlankLines,
    Dehyphenate,
    ParagraphSpacing,
}

#[derive(Debug)]
pub struct BuiltinRule {
    pub name: &'static str,
    pub pattern: &'static str,
    pub replacement: &'static str,
    pub passes: usize,
    pub toggle: Toggle,
}

/// Built-in rules in application order. Append only.
///
/// The soft-wrap joiners must run before whitespace collapsing, and the
/// hyphen merge and paragraph spacing assume soft wraps are already joined.
/// The uppercase joiner consumes the first word of the following line, so a
/// run of heading lines needs a second pass to close the breaks the first
/// pass stepped over. Every rule except paragraph spacing only removes
/// newlines and horizontal whitespace, so repeating the sequence converges.
pub const BUILTIN_RULES: &[BuiltinRule] = &[
    BuiltinRule {
        name: SOFT_WRAP_LOWERCASE,
        pattern: r#"([\p{Ll}0-9]+[ \t]*[,;:\]*\[0-9]*)([,(\[{;'"—]?[ \t]*)\n(?:[ \t]*\n)*"#,
        replacement: "${1}${2} ",
        passes: 1,
        toggle: Toggle::Always,
    },
    BuiltinRule {
        name: SOFT_WRAP_UPPERCASE,
        pattern: r#"(\p{Lu}+[ \t]*[,;:\-]*[0-9]*)([,(\[{;'"—]?[ \t]*)\n(?:[ \t]*\n)*[ \t]*(\p{Lu}+)\b"#,
        replacement: "${1}${2} ${3}",
        passes: 2,
        toggle: Toggle::Always,
    },
    BuiltinRule {
        name: LIST_MARKER,
        pattern: r"([nN]°|•)(?:[ \t]*\n[ \t]*)+",
        replacement: "${1} ",
        passes: 1,
        toggle: Toggle::Always,
    },
    BuiltinRule {
        name: HORIZONTAL_WHITESPACE,
        pattern: r"[ \t]+",
        replacement: " ",
        passes: 1,
        toggle: Toggle::Always,
    },
    BuiltinRule {
        name: LINE_LEADING_WHITESPACE,
        pattern: r"\n[ \t]+",
        replacement: "\n",
        passes: 1,
        toggle: Toggle::Always,
    },
    BuiltinRule {
        name: BLANK_LINE,
        pattern: r"(\.\n)\s[ \t]*([\w—\-])",
        replacement: "${1}${2}",
        passes: 1,
        toggle: Toggle::RemoveBlankLines,
    },
    BuiltinRule {
        name: EOL_HYPHEN,
        pattern: r"-[ \t]*[0-9]*[ \t]*\n+[ \t]*(?:[0-9]+\s+)?([\p{Ll}\p{Lu}])",
        replacement: "${1}",
        passes: 1,
        toggle: Toggle::Dehyphenate,
    },
    // The paragraph separator is appended to the replacement at construction.
    // Runs once, after the other rules have settled.
    BuiltinRule {
        name: PARAGRAPH_SPACING,
        pattern: r"([.?!\w])[ \t]*\n",
        replacement: "${1}",
        passes: 1,
        toggle: Toggle::ParagraphSpacing,
    },
];

static COMPILED_BUILTINS: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    BUILTIN_RULES
        .iter()
        .map(|b| Rule::new(b.name, b.pattern, b.replacement).expect("Invalid built-in rule"))
        .collect()
});

static NEWLINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n+").expect("Invalid newline regex"));

/// Look up a compiled built-in rule by name.
pub fn builtin_rule(name: &str) -> Option<&'static Rule> {
    COMPILED_BUILTINS.iter().find(|rule| rule.name() == name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub apply_defaults: bool,
    pub remove_blank_lines: bool,
    pub paragraph_spacing: Option<usize>,
    pub page_separator: String,
    pub dehyphenate: bool,
    /// Applied in order, before the built-in rules.
    pub rules: Vec<RuleSpec>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            apply_defaults: true,
            remove_blank_lines: false,
            paragraph_spacing: None,
            page_separator: "\n\n".to_string(),
            dehyphenate: false,
            rules: Vec::new(),
        }
    }
}

impl NormalizerConfig {
    /// `n` blank lines between paragraphs, i.e. `n + 1` newline characters.
    pub fn paragraph_separator(&self) -> Option<String> {
        self.paragraph_spacing
            .filter(|&n| n > 0)
            .map(|n| "\n".repeat(n + 1))
    }

    fn enables(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Always => true,
            Toggle::RemoveBlankLines => self.remove_blank_lines,
            Toggle::Dehyphenate => self.dehyphenate,
            Toggle::ParagraphSpacing => self.paragraph_separator().is_some(),
        }
    }
}

#[derive(Debug, Clone)]
struct Stage {
    rule: Rule,
    passes: usize,
}

/// Compiled, immutable text normalizer.
#[derive(Debug, Clone)]
pub struct Normalizer {
    user_rules: Vec<Rule>,
    stages: Vec<Stage>,
    paragraph_rule: Option<Rule>,
    paragraph_separator: Option<String>,
}

impl Normalizer {
    pub fn new(config: &NormalizerConfig) -> Result<Self> {
        let user_rules = config
            .rules
            .iter()
            .enumerate()
            .map(|(i, spec)| spec.compile(format!("user-{}", i)))
            .collect::<Result<Vec<_>>>()?;

        let paragraph_separator = config.paragraph_separator();

        let mut stages = Vec::new();
        let mut paragraph_rule = None;
        if config.apply_defaults {
            for (builtin, rule) in BUILTIN_RULES.iter().zip(COMPILED_BUILTINS.iter()) {
                if !config.enables(builtin.toggle) {
                    continue;
                }
                match (builtin.toggle, &paragraph_separator) {
                    (Toggle::ParagraphSpacing, Some(separator)) => {
                        paragraph_rule = Some(Rule::new(
                            builtin.name,
                            builtin.pattern,
                            &format!("{}{}", builtin.replacement, separator),
                        )?);
                    }
                    _ => stages.push(Stage {
                        rule: rule.clone(),
                        passes: builtin.passes,
                    }),
                }
            }
        }

        debug!(
            "Normalizer compiled with {} user rules and {} built-in rules",
            user_rules.len(),
            stages.len() + usize::from(paragraph_rule.is_some())
        );

        Ok(Self {
            user_rules,
            stages,
            paragraph_rule,
            paragraph_separator,
        })
    }

    /// Names of the rules that will run, in order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.user_rules
            .iter()
            .map(Rule::name)
            .chain(self.stages.iter().map(|stage| stage.rule.name()))
            .chain(self.paragraph_rule.iter().map(Rule::name))
            .collect()
    }

    pub fn apply(&self, text: &str) -> String {
        let mut cleaned = text.to_string();

        for rule in &self.user_rules {
            cleaned = rule.apply(&cleaned).into_owned();
        }

        loop {
            let next = self.settle_pass(&cleaned);
            if next == cleaned {
                break;
            }
            cleaned = next;
        }

        if let Some(rule) = &self.paragraph_rule {
            cleaned = rule.apply(&cleaned).into_owned();
        }

        if let Some(separator) = &self.paragraph_separator {
            cleaned = NEWLINE_RUN
                .replace_all(&cleaned, NoExpand(separator))
                .into_owned();
        }

        cleaned
    }

    /// One run of the built-in stages followed by a trim.
    fn settle_pass(&self, text: &str) -> String {
        let mut cleaned = text.to_string();
        for stage in &self.stages {
            for _ in 0..stage.passes {
                cleaned = stage.rule.apply(&cleaned).into_owned();
            }
        }
        cleaned.trim().to_string()
    }
}
