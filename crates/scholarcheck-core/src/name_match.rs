//! Decide whether two name strings denote the same person.
//!
//! Strategies are ordered by confidence and short-circuit on first
//! success. The matcher is permissive on missing information (a CV's
//! "Sorelle A. Friedler" must match a byline's "S Friedler") but strict
//! on conflicting information: a present-but-different middle initial or
//! a different last name always fails.

use crate::names::NameParts;

/// True if any entry in `authors` plausibly denotes the same person as
/// `candidate`.
pub fn matches_any(candidate: &str, authors: &[String]) -> bool {
    let cand = NameParts::parse(candidate);
    if cand.full.is_empty() {
        return false;
    }
    authors
        .iter()
        .any(|author| same_person(&cand, &NameParts::parse(author)))
}

/// True if the two parsed names plausibly denote the same person.
pub fn same_person(candidate: &NameParts, author: &NameParts) -> bool {
    if candidate.full.is_empty() || author.full.is_empty() {
        return false;
    }

    exact_match(candidate, author)
        || last_name_initial_match(candidate, author)
        || full_name_match(candidate, author)
}

/// Strategy 1: normalized full names equal, with or without periods.
fn exact_match(a: &NameParts, b: &NameParts) -> bool {
    a.full == b.full || a.full_dotless == b.full_dotless
}

/// Strategy 2: last names equal, first initials equal, middle initials
/// compatible. Covers full-name-vs-initials in either direction and
/// initials-vs-initials.
fn last_name_initial_match(a: &NameParts, b: &NameParts) -> bool {
    if a.last.is_empty() || a.last != b.last {
        return false;
    }
    match (a.first_initial, b.first_initial) {
        (Some(x), Some(y)) if x == y => middle_initials_compatible(a, b),
        _ => false,
    }
}

/// Strategy 3: multi-character first names equal, last names equal,
/// middle information compatible (equal as full names or as initial
/// sequences when both sides carry it).
fn full_name_match(a: &NameParts, b: &NameParts) -> bool {
    if a.first.chars().count() < 2 || b.first.chars().count() < 2 {
        return false;
    }
    if a.first != b.first || a.last.is_empty() || a.last != b.last {
        return false;
    }
    if a.has_middle() && b.has_middle() {
        return a.middles == b.middles || a.middle_initials == b.middle_initials;
    }
    true
}

/// Both sides carry middle initials: every initial must match
/// positionally and the counts must be equal. One side (or neither)
/// carrying them is compatible — missing information is not a mismatch.
fn middle_initials_compatible(a: &NameParts, b: &NameParts) -> bool {
    if a.has_middle() && b.has_middle() {
        a.middle_initials == b.middle_initials
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    // =========================================================================
    // Cross-convention matches
    // =========================================================================

    #[test]
    fn full_name_vs_dotted_initials() {
        assert!(matches_any("Benjamin F. Goldfarb", &s(&["B.F. Goldfarb"])));
    }

    #[test]
    fn full_name_vs_surname_first() {
        assert!(matches_any("John Smith", &s(&["Smith, J."])));
    }

    #[test]
    fn full_name_vs_concatenated_initials() {
        assert!(matches_any("Benjamin D. Goldstein", &s(&["BD Goldstein"])));
    }

    #[test]
    fn conflicting_middle_initial_rejected() {
        assert!(!matches_any("Benjamin C. Goldstein", &s(&["BD Goldstein"])));
    }

    #[test]
    fn missing_middle_info_is_permissive() {
        assert!(matches_any("Sorelle A. Friedler", &s(&["S Friedler"])));
    }

    #[test]
    fn initials_only_vs_full_name() {
        assert!(matches_any("J. Doe", &s(&["Jane Doe"])));
    }

    #[test]
    fn exact_with_and_without_periods() {
        assert!(matches_any("B.F. Goldfarb", &s(&["BF Goldfarb"])));
    }

    // =========================================================================
    // Rejections
    // =========================================================================

    #[test]
    fn different_last_name_rejected() {
        assert!(!matches_any("Jane Doe", &s(&["Jane Smith"])));
    }

    #[test]
    fn different_first_initial_rejected() {
        assert!(!matches_any("Jane Doe", &s(&["K. Doe"])));
    }

    #[test]
    fn different_full_first_name_rejected() {
        // Same initial, different full first names: strategy 2 passes on
        // initials only when one side lacks the full name; both full
        // names present and equal initials still match by initial.
        // A conflicting *multi-character* first with a different initial
        // must fail.
        assert!(!matches_any("Maria Lopez", &s(&["Nadia Lopez"])));
    }

    #[test]
    fn empty_inputs_never_match() {
        assert!(!matches_any("", &s(&["Jane Doe"])));
        assert!(!matches_any("Jane Doe", &s(&[""])));
        assert!(!matches_any("Jane Doe", &[]));
    }

    #[test]
    fn no_author_list_entry_matches() {
        assert!(!matches_any("Jane Doe", &s(&["A. Smith", "B. Jones"])));
    }

    // =========================================================================
    // Middle-name handling
    // =========================================================================

    #[test]
    fn both_sides_full_middles_equal() {
        assert!(matches_any("Jane Quinn Doe", &s(&["Jane Quinn Doe"])));
    }

    #[test]
    fn full_middle_vs_middle_initial() {
        assert!(matches_any("Jane Quinn Doe", &s(&["Jane Q. Doe"])));
    }

    #[test]
    fn middle_initial_count_mismatch_rejected() {
        assert!(!matches_any("J. Q. R. Doe", &s(&["J. Q. Doe"])));
    }

    #[test]
    fn one_entry_in_long_list_matches() {
        assert!(matches_any(
            "Jane Doe",
            &s(&["A. Smith", "B. Jones", "J. Doe", "C. Wu"])
        ));
    }
}
