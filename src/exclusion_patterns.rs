//! Search-result-page boilerplate that is stripped from extracted text.
//!
//! The list is declarative: each entry is a named regular expression, and the
//! set compiles them into one alternation so matching behaves like a single
//! leftmost-first scan over the text. Bump [`PATTERNS_VERSION`] whenever the
//! built-in list changes.

use regex::Regex;

use crate::error::{EnrichError, Result};

pub const PATTERNS_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPattern {
    pub name: String,
    pub pattern: String,
}

impl ExclusionPattern {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        ExclusionPattern { name: name.into(), pattern: pattern.into() }
    }
}

pub const BUILTIN_PATTERNS: &[(&str, &str)] = &[
    ("engine_name", r"Google Search"),
    ("search_prompt", r"Search the web"),
    ("press", r"\bPress\b"),
    ("more", r"\bMore\b"),
    ("result_count", r"About [0-9,]+ results"),
    ("timing", r"\(.*?seconds\)"),
    ("feedback", r"\bFeedback\b"),
    ("people_also_ask", r"People also ask"),
    ("people_also_search", r"People also search for"),
    ("apps_menu", r"Google apps"),
    ("url", r"https?://\S+"),
    ("pdf", r"\bPDF\b"),
    ("pagination", r"Page\s?\d+\s?of\s?\d+"),
    ("trailing_number", r"\d+$"),
];

pub fn builtin() -> Vec<ExclusionPattern> {
    BUILTIN_PATTERNS
        .iter()
        .map(|(name, pattern)| ExclusionPattern::new(*name, *pattern))
        .collect()
}

/// Compiled exclusion list.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    patterns: Vec<ExclusionPattern>,
    combined: Option<Regex>,
}

impl ExclusionSet {
    pub fn new(patterns: Vec<ExclusionPattern>) -> Result<Self> {
        // Compile individually first so a bad entry is reported by name.
        for p in &patterns {
            Regex::new(&p.pattern).map_err(|source| EnrichError::Pattern {
                name: p.name.clone(),
                source,
            })?;
        }

        let combined = if patterns.is_empty() {
            None
        } else {
            let alternation = patterns
                .iter()
                .map(|p| format!("(?:{})", p.pattern))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&alternation).map_err(|source| EnrichError::Pattern {
                name: "combined".to_string(),
                source,
            })?)
        };

        Ok(ExclusionSet { patterns, combined })
    }

    pub fn builtin() -> Result<Self> {
        Self::new(builtin())
    }

    /// Appends extra patterns after the existing ones.
    pub fn extended(&self, extra: Vec<ExclusionPattern>) -> Result<Self> {
        let mut patterns = self.patterns.clone();
        patterns.extend(extra);
        Self::new(patterns)
    }

    pub fn patterns(&self) -> &[ExclusionPattern] {
        &self.patterns
    }

    /// Removes every matched span.
    pub fn strip(&self, text: &str) -> String {
        match &self.combined {
            Some(re) => re.replace_all(text, "").into_owned(),
            None => text.to_string(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.combined.as_ref().map_or(false, |re| re.is_match(text))
    }
}
