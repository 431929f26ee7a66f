//! Heading-driven document segmentation.
//!
//! Publication lists in CVs and profiles sit under recognizable headings.
//! Splitting the document at headings keeps each collaborator call
//! focused on one section and bounds prompt size.

use once_cell::sync::Lazy;
use regex::Regex;

/// A section-like span of the document.
#[derive(Debug, Clone)]
pub struct Span {
    pub heading: Option<String>,
    pub body: String,
}

/// Vocabulary that marks a publication-bearing section heading.
static SECTION_VOCAB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:selected\s+|peer[\s-]*reviewed\s+|refereed\s+)?(?:publications?|journal\s+articles?|conference\s+(?:papers?|proceedings)|book\s+chapters?|preprints?|working\s+papers?|bibliography|published\s+works?)\s*:?\s*$",
    )
    .unwrap()
});

/// Leading numbered/bracketed list marker: `1.`, `[12]`, `(3)`.
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\[\d{1,3}\]|\(\d{1,3}\)|\d{1,3}[.)])\s+").unwrap());

/// Whether a line reads as a section heading.
fn is_heading(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.len() > 60 {
        return false;
    }
    // List entries are content, never headings.
    if LIST_MARKER.is_match(trimmed) {
        return false;
    }
    if SECTION_VOCAB.is_match(trimmed) {
        return true;
    }
    // Short ALL-CAPS lines ("PUBLICATIONS", "SELECTED WORKS").
    let letters: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 3 && letters.iter().all(|c| c.is_uppercase())
}

/// Split a document into section-like spans at heading lines.
///
/// A document with no recognizable heading is returned as one span.
/// Empty spans (a heading directly followed by another) are dropped.
pub fn segment(text: &str) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut heading: Option<String> = None;
    let mut body = String::new();

    let mut flush = |heading: Option<String>, body: &mut String, spans: &mut Vec<Span>| {
        if !body.trim().is_empty() {
            spans.push(Span {
                heading,
                body: std::mem::take(body).trim().to_string(),
            });
        } else {
            body.clear();
        }
    };

    for line in text.lines() {
        if is_heading(line) {
            flush(heading.take(), &mut body, &mut spans);
            heading = Some(line.trim().to_string());
        } else {
            body.push_str(line);
            body.push('\n');
        }
    }
    flush(heading, &mut body, &mut spans);

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_headings_is_one_span() {
        let spans = segment("just a paragraph\nand another line");
        assert_eq!(spans.len(), 1);
        assert!(spans[0].heading.is_none());
    }

    #[test]
    fn vocab_heading_starts_a_span() {
        let spans = segment("Intro text here.\nPublications\nDoe J. A paper. 2021.");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].heading.as_deref(), Some("Publications"));
        assert!(spans[1].body.contains("A paper"));
    }

    #[test]
    fn all_caps_line_is_a_heading() {
        let spans = segment("SELECTED WORKS\nDoe J. Another paper. 2020.");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].heading.as_deref(), Some("SELECTED WORKS"));
    }

    #[test]
    fn vocab_variants_match() {
        for h in [
            "Peer-Reviewed Publications",
            "Selected publications:",
            "Journal Articles",
            "Conference Papers",
            "Preprints",
        ] {
            assert!(is_heading(h), "{h} should be a heading");
        }
    }

    #[test]
    fn numbered_entries_are_not_headings() {
        assert!(!is_heading("[1] Doe J. PUBLICATIONS OF NOTE. 2020."));
        assert!(!is_heading("1. SHORT CAPS ENTRY"));
    }

    #[test]
    fn long_caps_lines_are_not_headings() {
        let long = "A".repeat(80);
        assert!(!is_heading(&long));
    }

    #[test]
    fn empty_sections_are_dropped() {
        let spans = segment("Publications\nBibliography\nDoe J. Paper. 2019.");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].heading.as_deref(), Some("Bibliography"));
    }
}
