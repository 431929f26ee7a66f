//! Post-filters for extracted entries.
//!
//! The collaborator is prompted not to fabricate, but the contract is
//! enforced here: templated author names, implausibly generic titles not
//! backed by the document, and chunk-boundary duplicates are all removed
//! before entries reach the verification pipeline.

use once_cell::sync::Lazy;
use regex::Regex;

use scholarcheck_core::text::normalize_strict;
use scholarcheck_core::{Publication, similarity};

use crate::ExtractorConfig;

/// Fabricated-placeholder patterns the prompt forbids but models still
/// occasionally produce.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:john\s+doe|jane\s+doe|author\s+(?:one|two|three|name)|first(?:name)?\s+last(?:name)?|lorem\s+ipsum|example\s+(?:publication|paper|title)|sample\s+(?:publication|paper|title)|title\s+of\s+(?:the\s+)?(?:paper|publication))\b",
    )
    .unwrap()
});

/// Words that carry no identifying content on their own.
static GENERIC_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:a|an|the|of|on|in|and|paper|publication|article|study|report|analysis|review|research|introduction|thesis|dissertation)$").unwrap()
});

/// Whether one extracted entry survives validation against the source
/// document.
pub fn passes_filters(entry: &Publication, source_document: &str, config: &ExtractorConfig) -> bool {
    if entry.raw_text.trim().len() < config.min_entry_chars {
        return false;
    }

    if PLACEHOLDER.is_match(&entry.raw_text) || PLACEHOLDER.is_match(&entry.title) {
        return false;
    }

    if entry.title.trim().is_empty() {
        return false;
    }

    // A short or all-generic title is suspicious; keep it only when the
    // literal title text is verifiably present in the source document.
    if title_is_implausible(&entry.title, config) && !document_contains(source_document, &entry.title)
    {
        return false;
    }

    true
}

fn title_is_implausible(title: &str, config: &ExtractorConfig) -> bool {
    if normalize_strict(title).chars().count() < config.min_plausible_title_chars {
        return true;
    }
    title.split_whitespace().all(|w| GENERIC_WORDS.is_match(w))
}

fn document_contains(document: &str, needle: &str) -> bool {
    document.to_lowercase().contains(&needle.trim().to_lowercase())
}

/// Collapse near-identical entries, keeping the first of any pair whose
/// titles score above the dedup threshold. Input order is preserved.
pub fn dedup(entries: Vec<Publication>, config: &ExtractorConfig) -> Vec<Publication> {
    let mut kept: Vec<Publication> = Vec::with_capacity(entries.len());
    for entry in entries {
        let duplicate = kept
            .iter()
            .any(|existing| similarity(&existing.title, &entry.title) > config.dedup_threshold);
        if !duplicate {
            kept.push(entry);
        }
    }
    kept
}
