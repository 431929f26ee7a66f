//! String canonicalization for comparison.
//!
//! Two levels: [`normalize`] folds case, punctuation variants and
//! whitespace but keeps word boundaries; [`normalize_strict`] additionally
//! strips everything outside `[a-z0-9]` for character-n-gram comparison
//! and cache keys.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Hyphen variants folded to `-`: minus sign, en dash, em dash, horizontal bar.
const HYPHENS: [char; 4] = ['\u{2212}', '\u{2013}', '\u{2014}', '\u{2015}'];

/// Apostrophe variants folded to `'`.
const APOSTROPHES: [char; 5] = ['\u{2018}', '\u{2019}', '\u{201B}', '\u{00B4}', '`'];

/// Double-quote variants folded to `"`.
const QUOTES: [char; 5] = ['\u{201C}', '\u{201D}', '\u{201E}', '\u{00AB}', '\u{00BB}'];

static SPACE_AROUND_JOINERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*([-/])\s*").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Canonicalize a string for word-level comparison.
///
/// Lowercases, folds hyphen/apostrophe/quote variants to their ASCII
/// forms, removes spaces around hyphens and slashes, collapses remaining
/// whitespace runs to single spaces, and trims. Empty input yields an
/// empty string; this never fails.
pub fn normalize(input: &str) -> String {
    if input.trim().is_empty() {
        return String::new();
    }

    let lowered = input.trim().to_lowercase();
    let folded: String = lowered
        .chars()
        .map(|c| {
            if HYPHENS.contains(&c) {
                '-'
            } else if APOSTROPHES.contains(&c) {
                '\''
            } else if QUOTES.contains(&c) {
                '"'
            } else {
                c
            }
        })
        .collect();

    let joined = SPACE_AROUND_JOINERS.replace_all(&folded, "$1");
    WHITESPACE_RUN.replace_all(&joined, " ").trim().to_string()
}

/// Canonicalize a string down to lowercase alphanumeric characters only.
///
/// Applies [`normalize`], then NFKD decomposition (so accented letters
/// reduce to their ASCII base), then drops everything outside `[a-z0-9]`.
pub fn normalize_strict(input: &str) -> String {
    normalize(input)
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize_strict(""), "");
    }

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize("  Deep Learning  "), "deep learning");
    }

    #[test]
    fn folds_dash_variants() {
        assert_eq!(normalize("state\u{2013}of\u{2014}the\u{2212}art"), "state-of-the-art");
    }

    #[test]
    fn folds_quote_variants() {
        assert_eq!(normalize("\u{201C}quoted\u{201D}"), "\"quoted\"");
        assert_eq!(normalize("O\u{2019}Brien"), "o'brien");
    }

    #[test]
    fn collapses_whitespace_around_joiners() {
        assert_eq!(normalize("end - to -  end"), "end-to-end");
        assert_eq!(normalize("client /server"), "client/server");
    }

    #[test]
    fn collapses_inner_whitespace() {
        assert_eq!(normalize("a   b\t\nc"), "a b c");
    }

    #[test]
    fn strict_strips_punctuation() {
        assert_eq!(
            normalize_strict("A General Theory of Everything."),
            "ageneraltheoryofeverything"
        );
    }

    #[test]
    fn strict_decomposes_accents() {
        assert_eq!(normalize_strict("Rényi entropy"), "renyientropy");
    }
}
