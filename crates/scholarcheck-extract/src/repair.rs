//! Repair and parse model output.
//!
//! Collaborator output is supposed to be a JSON array of entry objects,
//! but models wrap arrays in code fences, leave trailing commas, and leak
//! control characters. Minor defects are repaired before parsing;
//! anything unrecoverable yields an empty list, never an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// One entry as reported by the model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    /// The complete entry text as it appears in the document.
    pub publication: Option<String>,
    pub title: Option<String>,
    pub doi: Option<String>,
}

static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([\]}])").unwrap());

/// Parse model output into entries, repairing minor formatting defects.
/// Returns an empty list when the output cannot be salvaged.
pub fn parse_model_output(raw: &str) -> Vec<ModelEntry> {
    let repaired = repair(raw);
    if repaired.is_empty() {
        return vec![];
    }

    match serde_json::from_str::<Vec<ModelEntry>>(&repaired) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "model output unparseable after repair");
            vec![]
        }
    }
}

/// Best-effort cleanup: strip code fences, isolate the outermost array,
/// drop stray control characters, remove trailing commas.
fn repair(raw: &str) -> String {
    let no_fences = strip_code_fences(raw);

    // Isolate the outermost array; models sometimes preface it with prose.
    let start = no_fences.find('[');
    let end = no_fences.rfind(']');
    let body = match (start, end) {
        (Some(s), Some(e)) if s < e => &no_fences[s..=e],
        _ => return String::new(),
    };

    let no_control: String = body
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    TRAILING_COMMA.replace_all(&no_control, "$1").to_string()
}

fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    trimmed
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_array() {
        let entries = parse_model_output(
            r#"[{"publication": "Doe J. A paper. 2021.", "title": "A paper", "doi": null}]"#,
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title.as_deref(), Some("A paper"));
        assert!(entries[0].doi.is_none());
    }

    #[test]
    fn empty_array_is_empty() {
        assert!(parse_model_output("[]").is_empty());
    }

    #[test]
    fn strips_code_fences() {
        let raw = "```json\n[{\"title\": \"A paper\"}]\n```";
        let entries = parse_model_output(raw);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn removes_trailing_commas() {
        let raw = r#"[{"title": "A paper", "doi": null,},]"#;
        let entries = parse_model_output(raw);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn drops_control_characters() {
        let raw = "[{\"title\": \"A\u{0007} paper\"}]";
        let entries = parse_model_output(raw);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title.as_deref(), Some("A paper"));
    }

    #[test]
    fn prose_around_array_is_ignored() {
        let raw = "Here are the entries:\n[{\"title\": \"A paper\"}]\nLet me know!";
        let entries = parse_model_output(raw);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn garbage_yields_empty_not_error() {
        assert!(parse_model_output("I could not find any publications.").is_empty());
        assert!(parse_model_output("[{broken json").is_empty());
        assert!(parse_model_output("").is_empty());
    }
}
