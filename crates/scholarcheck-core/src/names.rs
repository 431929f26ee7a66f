//! Decomposition of free-form author names into structured parts.
//!
//! Academic venues disagree on name layout: "Jane Q. Doe", "Doe, Jane Q.",
//! "J.Q. Doe", "JQ Doe". The parser reconciles these into one shape so the
//! matcher can compare across conventions. Parsing is cheap and stateless;
//! parts are recomputed per comparison and never persisted.

use crate::text::normalize;

/// Structured parts of an author name. All parts are normalized
/// (lowercase, period-free).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    pub first: String,
    pub middles: Vec<String>,
    pub last: String,
    pub first_initial: Option<char>,
    pub middle_initials: Vec<char>,
    /// Full normalized name, for exact-match shortcuts.
    pub full: String,
    /// Full normalized name with periods removed.
    pub full_dotless: String,
}

impl NameParts {
    /// Parse a raw name string. Never fails: a name with fewer than two
    /// tokens yields `first == last == token` and no middles.
    pub fn parse(raw: &str) -> Self {
        let full = normalize(raw);
        let full_dotless = full.replace('.', "");

        let (first, middles, last) = split_parts(raw, &full);

        let first = strip_periods(&first);
        let last = strip_periods(&last);
        let middles: Vec<String> = middles
            .iter()
            .map(|m| strip_periods(m))
            .filter(|m| !m.is_empty())
            .collect();

        let first_initial = first.chars().next();
        let middle_initials = middles.iter().filter_map(|m| m.chars().next()).collect();

        Self {
            first,
            middles,
            last,
            first_initial,
            middle_initials,
            full,
            full_dotless,
        }
    }

    /// Whether the name carries any middle information.
    pub fn has_middle(&self) -> bool {
        !self.middle_initials.is_empty()
    }
}

fn strip_periods(s: &str) -> String {
    s.replace('.', "")
}

/// Split a normalized name into (first, middles, last) raw segments.
/// `raw` is consulted only for the concatenated-initials rule, which
/// depends on pre-normalization casing.
fn split_parts(raw: &str, normalized: &str) -> (String, Vec<String>, String) {
    if normalized.is_empty() {
        return (String::new(), vec![], String::new());
    }

    // "Last, First [Middle...]"
    if let Some((last_seg, rest_seg)) = normalized.split_once(',') {
        let last = last_seg.trim().to_string();
        let rest: Vec<&str> = rest_seg.split_whitespace().collect();
        return match rest.split_first() {
            Some((first, middles)) => (
                first.to_string(),
                middles.iter().map(|m| m.to_string()).collect(),
                last,
            ),
            None => (last.clone(), vec![], last),
        };
    }

    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    if tokens.len() < 2 {
        let only = tokens.first().copied().unwrap_or_default().to_string();
        return (only.clone(), vec![], only);
    }

    // A leading run of dotted initials: "J.Q. Doe", "J. Doe". Any tokens
    // between the run and the surname ("J. Q. Doe") are middles too.
    let head = tokens[0];
    if head.contains('.') && head.chars().filter(|c| *c != '.').count() <= 4 {
        let initials: Vec<&str> = head.split('.').filter(|s| !s.is_empty()).collect();
        if let Some((first, middles)) = initials.split_first() {
            let mut middles: Vec<String> = middles.iter().map(|m| m.to_string()).collect();
            middles.extend(tokens[1..tokens.len() - 1].iter().map(|m| m.to_string()));
            return (
                first.to_string(),
                middles,
                tokens.last().unwrap().to_string(),
            );
        }
    }

    // Concatenated initials: "JQ Doe". Only trusted when the original
    // token was all-uppercase, so genuine short first names ("Bo", "Al")
    // are not mistaken for initial runs.
    if tokens.len() == 2 {
        let head_chars = head.chars().count();
        let raw_head = raw.trim().split_whitespace().next().unwrap_or_default();
        let raw_head_upper = !raw_head.is_empty()
            && raw_head.chars().all(|c| c.is_alphabetic() && c.is_uppercase());
        if (2..=4).contains(&head_chars) && head.chars().all(|c| c.is_alphabetic()) && raw_head_upper
        {
            let mut letters = head.chars();
            let first = letters.next().unwrap().to_string();
            let middles: Vec<String> = letters.map(|c| c.to_string()).collect();
            return (first, middles, tokens[1].to_string());
        }
    }

    // "First [Middle...] Last"
    let first = tokens[0].to_string();
    let last = tokens.last().unwrap().to_string();
    let middles = tokens[1..tokens.len() - 1]
        .iter()
        .map(|m| m.to_string())
        .collect();
    (first, middles, last)
}
