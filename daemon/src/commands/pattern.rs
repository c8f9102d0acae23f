//! Command shapes and argument extraction.
//!
//! A command is either matched by the whole utterance (`Exact`) or by a
//! leading phrase (`Prefix`). Prefix commands hand the rest of the utterance
//! to an [`Extractor`], which produces the handler argument.

use regex::Regex;
use shared::{CommandSpec, ExtractSpec, MatchKind};

#[derive(Debug, Clone)]
pub enum Extractor {
    /// Everything after the prefix, trimmed.
    Remainder,
    /// The remainder up to the first occurrence of the separator.
    Before(String),
    /// The remainder after the last occurrence of the separator.
    After(String),
    /// The whole remainder; [`Extractor::parts`] splits it at the first
    /// occurrence of the separator.
    Split(String),
    /// First capture group of the regex, or the whole match without groups.
    Pattern(Regex),
}

impl Extractor {
    pub fn from_spec(spec: &ExtractSpec) -> Result<Self, regex::Error> {
        Ok(match spec {
            ExtractSpec::Remainder => Extractor::Remainder,
            ExtractSpec::Before(sep) => Extractor::Before(sep.to_lowercase()),
            ExtractSpec::After(sep) => Extractor::After(sep.to_lowercase()),
            ExtractSpec::Split(sep) => Extractor::Split(sep.to_lowercase()),
            ExtractSpec::Pattern(pattern) => Extractor::Pattern(Regex::new(pattern)?),
        })
    }

    pub fn extract(&self, remainder: &str) -> String {
        match self {
            Extractor::Remainder | Extractor::Split(_) => remainder.trim().to_string(),
            Extractor::Before(sep) => {
                let text = padded(remainder);
                match text.find(sep.as_str()) {
                    Some(pos) => text[..pos].trim().to_string(),
                    None => text.trim().to_string(),
                }
            }
            Extractor::After(sep) => {
                let text = padded(remainder);
                match text.rfind(sep.as_str()) {
                    Some(pos) => text[pos + sep.len()..].trim().to_string(),
                    None => text.trim().to_string(),
                }
            }
            Extractor::Pattern(re) => re
                .captures(remainder.trim())
                .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
                .map_or(String::new(), |m| m.as_str().trim().to_string()),
        }
    }

    /// Positional parts of an extracted argument, substituted as `{1}`, `{2}`.
    ///
    /// `Split` yields the text before and after its separator (the second part
    /// is empty without one); every other extractor yields the argument alone.
    pub fn parts(&self, argument: &str) -> Vec<String> {
        match self {
            Extractor::Split(sep) => {
                let (first, second) = split_parts(argument, sep);
                vec![first, second]
            }
            _ => vec![argument.trim().to_string()],
        }
    }

    pub(crate) fn same_shape(&self, other: &Extractor) -> bool {
        match (self, other) {
            (Extractor::Remainder, Extractor::Remainder) => true,
            (Extractor::Before(a), Extractor::Before(b)) => a == b,
            (Extractor::After(a), Extractor::After(b)) => a == b,
            (Extractor::Split(a), Extractor::Split(b)) => a == b,
            (Extractor::Pattern(a), Extractor::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CommandPattern {
    Exact(String),
    Prefix { prefix: String, extractor: Extractor },
}

impl CommandPattern {
    pub fn exact(key: impl Into<String>) -> Self {
        CommandPattern::Exact(key.into())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::prefix_with(prefix, Extractor::Remainder)
    }

    pub fn prefix_with(prefix: impl Into<String>, extractor: Extractor) -> Self {
        CommandPattern::Prefix {
            prefix: prefix.into(),
            extractor,
        }
    }

    pub fn from_spec(spec: &CommandSpec) -> Result<Self, regex::Error> {
        Ok(match spec.kind {
            MatchKind::Exact => CommandPattern::exact(spec.phrase.clone()),
            MatchKind::Prefix => {
                let extractor = match &spec.extract {
                    Some(extract) => Extractor::from_spec(extract)?,
                    None => Extractor::Remainder,
                };
                CommandPattern::prefix_with(spec.phrase.clone(), extractor)
            }
        })
    }

    pub fn key(&self) -> &str {
        match self {
            CommandPattern::Exact(key) => key,
            CommandPattern::Prefix { prefix, .. } => prefix,
        }
    }

    /// Replaces the key, keeping the command shape.
    pub fn rekey(self, f: impl FnOnce(&str) -> String) -> Self {
        match self {
            CommandPattern::Exact(key) => CommandPattern::Exact(f(&key)),
            CommandPattern::Prefix { prefix, extractor } => CommandPattern::Prefix {
                prefix: f(&prefix),
                extractor,
            },
        }
    }
}

/// Pads `text` with one space on each side so a separator such as " to "
/// also matches at the very start or end of the remainder.
fn padded(text: &str) -> String {
    format!(" {} ", text.trim())
}

/// Text before and after the first `sep`; the whole text and "" without one.
fn split_parts(text: &str, sep: &str) -> (String, String) {
    let text = padded(text);
    match text.find(sep) {
        Some(pos) if !sep.is_empty() => (
            text[..pos].trim().to_string(),
            text[pos + sep.len()..].trim().to_string(),
        ),
        _ => (text.trim().to_string(), String::new()),
    }
}

/// Returns the text following `prefix` when `utterance` starts with it on a
/// word boundary: "search cats" and "search" match "search", "searching" does not.
pub(crate) fn strip_word_prefix<'a>(prefix: &str, utterance: &'a str) -> Option<&'a str> {
    let rest = utterance.strip_prefix(prefix)?;
    if prefix.is_empty() || rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}
