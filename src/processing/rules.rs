//! Pattern/replacement rules

use crate::error::{PrettyParserError, Result};
use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use std::sync::LazyLock;

static BACKSLASH_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:(\d+)|g<(\w+)>)").expect("Invalid backreference regex")
});

/// Regex flags for a user rule, written as letters (`"im"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleFlags {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
    pub ignore_whitespace: bool,
    pub swap_greed: bool,
}

impl FromStr for RuleFlags {
    type Err = PrettyParserError;

    fn from_str(s: &str) -> Result<Self> {
        let mut flags = RuleFlags::default();
        for c in s.chars() {
            match c {
                'i' => flags.case_insensitive = true,
                'm' => flags.multi_line = true,
                's' => flags.dot_matches_new_line = true,
                'x' => flags.ignore_whitespace = true,
                'U' => flags.swap_greed = true,
                _ => {
                    return Err(PrettyParserError::Configuration(format!(
                        "Unknown rule flag '{}' in '{}'. Supported: i, m, s, x, U",
                        c, s
                    )))
                }
            }
        }
        Ok(flags)
    }
}

/// Uncompiled rule as written in a config file or on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    pub replacement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
}

impl RuleSpec {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            flags: None,
        }
    }

    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = Some(flags.into());
        self
    }

    pub fn compile(&self, name: impl Into<String>) -> Result<Rule> {
        let flags = match &self.flags {
            Some(letters) => letters.parse()?,
            None => RuleFlags::default(),
        };
        Rule::with_flags(name, &self.pattern, &translate_template(&self.replacement), flags)
    }
}

/// A named global substitution.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    regex: Regex,
    replacement: String,
}

impl Rule {
    pub fn new(name: impl Into<String>, pattern: &str, replacement: &str) -> Result<Self> {
        Self::with_flags(name, pattern, replacement, RuleFlags::default())
    }

    pub fn with_flags(
        name: impl Into<String>,
        pattern: &str,
        replacement: &str,
        flags: RuleFlags,
    ) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_matches_new_line)
            .ignore_whitespace(flags.ignore_whitespace)
            .swap_greed(flags.swap_greed)
            .build()
            .map_err(|source| PrettyParserError::InvalidRule {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            name: name.into(),
            regex,
            replacement: replacement.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Replace every non-overlapping match.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.regex.replace_all(text, self.replacement.as_str())
    }
}

/// Rewrite `\1` and `\g<name>` group references into `${1}` / `${name}`.
pub fn translate_template(template: &str) -> String {
    BACKSLASH_GROUP
        .replace_all(template, |caps: &Captures| {
            let group = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            format!("${{{}}}", group)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let flags: RuleFlags = "is".parse().unwrap();
        assert!(flags.case_insensitive);
        assert!(flags.dot_matches_new_line);
        assert!(!flags.multi_line);

        assert!("q".parse::<RuleFlags>().is_err());
        assert_eq!("".parse::<RuleFlags>().unwrap(), RuleFlags::default());
    }

    #[test]
    fn test_template_translation() {
        assert_eq!(translate_template(r"\1-\2"), "${1}-${2}");
        assert_eq!(translate_template(r"<\g<word>>"), "<${word}>");
        assert_eq!(translate_template("$1 stays"), "$1 stays");
    }

    #[test]
    fn test_rule_with_backreference() {
        let rule = RuleSpec::new(r"(\w+)@(\w+)", r"\2 at \1").compile("swap").unwrap();
        assert_eq!(rule.apply("user@host"), "host at user");
        assert_eq!(rule.name(), "swap");
    }

    #[test]
    fn test_case_insensitive_flag() {
        let plain = RuleSpec::new("chapter", "CH").compile("plain").unwrap();
        assert_eq!(plain.apply("Chapter one"), "Chapter one");

        let folded = RuleSpec::new("chapter", "CH")
            .with_flags("i")
            .compile("folded")
            .unwrap();
        assert_eq!(folded.apply("Chapter one"), "CH one");
    }

    #[test]
    fn test_malformed_pattern() {
        let err = RuleSpec::new("(unclosed", "").compile("bad").unwrap_err();
        assert!(matches!(err, PrettyParserError::InvalidRule { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_rule_spec_from_toml() {
        let spec: RuleSpec = toml::from_str(
            r#"
            pattern = "foo"
            replacement = "bar"
            flags = "i"
            "#,
        )
        .unwrap();
        assert_eq!(spec, RuleSpec::new("foo", "bar").with_flags("i"));
    }
}
