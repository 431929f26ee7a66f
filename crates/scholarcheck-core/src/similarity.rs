//! Hybrid string similarity in `[0, 100]`.
//!
//! Word overlap catches reordering and truncation (subtitles, "and" vs
//! "&"); character-bigram cosine catches spelling and OCR noise that
//! breaks exact word tokens. Both operate on canonicalized forms from
//! [`crate::text`].

use std::collections::{HashMap, HashSet};

use crate::text::{normalize, normalize_strict};

/// Word-overlap score above which the bigram pass is skipped.
const OVERLAP_SHORT_CIRCUIT: f64 = 90.0;

/// Compute the similarity of two strings as a score in `[0, 100]`.
///
/// Identical strict-normalized strings score 100. Otherwise the score is
/// the word-overlap Dice coefficient when it exceeds 90, else a 60/40
/// blend of word overlap and character-bigram cosine similarity. Either
/// input empty (after normalization) scores 0. Symmetric in its arguments.
pub fn similarity(a: &str, b: &str) -> f64 {
    let strict_a = normalize_strict(a);
    let strict_b = normalize_strict(b);

    if strict_a.is_empty() || strict_b.is_empty() {
        return 0.0;
    }
    if strict_a == strict_b {
        return 100.0;
    }

    let overlap = word_overlap(&normalize(a), &normalize(b));
    if overlap > OVERLAP_SHORT_CIRCUIT {
        return overlap;
    }

    let cosine = bigram_cosine(&strict_a, &strict_b);
    0.6 * overlap + 0.4 * cosine
}

/// Dice coefficient over the distinct word sets of two loosely-normalized
/// strings, scaled to `[0, 100]`. A word is common if it appears in both,
/// regardless of repetition count.
fn word_overlap(a: &str, b: &str) -> f64 {
    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let common = words_a.intersection(&words_b).count();
    2.0 * common as f64 / (words_a.len() + words_b.len()) as f64 * 100.0
}

/// Cosine similarity of the character-bigram frequency vectors of two
/// strict-normalized strings, scaled to `[0, 100]`.
fn bigram_cosine(a: &str, b: &str) -> f64 {
    let freq_a = bigram_frequencies(a);
    let freq_b = bigram_frequencies(b);
    if freq_a.is_empty() || freq_b.is_empty() {
        return 0.0;
    }

    let dot: f64 = freq_a
        .iter()
        .filter_map(|(gram, count)| freq_b.get(gram).map(|other| (count * other) as f64))
        .sum();

    let norm_a: f64 = freq_a.values().map(|c| (c * c) as f64).sum::<f64>().sqrt();
    let norm_b: f64 = freq_b.values().map(|c| (c * c) as f64).sum::<f64>().sqrt();

    dot / (norm_a * norm_b) * 100.0
}

fn bigram_frequencies(s: &str) -> HashMap<(char, char), u32> {
    let chars: Vec<char> = s.chars().collect();
    let mut freq = HashMap::new();
    for pair in chars.windows(2) {
        *freq.entry((pair[0], pair[1])).or_insert(0) += 1;
    }
    freq
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Contract properties
    // =========================================================================

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(similarity("Attention Is All You Need", "Attention Is All You Need"), 100.0);
    }

    #[test]
    fn punctuation_noise_still_scores_100() {
        assert_eq!(
            similarity("A General Theory of Everything", "A General Theory of Everything."),
            100.0
        );
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(similarity("", "Something"), 0.0);
        assert_eq!(similarity("Something", ""), 0.0);
        assert_eq!(similarity("", ""), 0.0);
    }

    #[test]
    fn symmetric() {
        let a = "Detecting fabricated publication records";
        let b = "Detecting fabricated publication record";
        assert_eq!(similarity(a, b), similarity(b, a));
    }

    #[test]
    fn score_within_bounds() {
        let pairs = [
            ("completely unrelated words here", "different topic entirely now"),
            ("abc", "abd"),
            ("one shared word", "word"),
        ];
        for (a, b) in pairs {
            let s = similarity(a, b);
            assert!((0.0..=100.0).contains(&s), "{a} vs {b} scored {s}");
        }
    }

    // =========================================================================
    // Word overlap
    // =========================================================================

    #[test]
    fn near_identical_titles_short_circuit_on_overlap() {
        // 9 of 10 words shared; overlap is over 90 and is returned directly.
        let a = "a survey of deep learning methods for anomaly detection systems";
        let b = "a survey of deep learning methods for anomaly detection system";
        let s = similarity(a, b);
        assert!(s > 85.0, "scored {s}");
    }

    #[test]
    fn reordered_words_score_high() {
        let s = similarity("learning deep networks", "deep learning networks");
        assert!(s > 90.0, "scored {s}");
    }

    #[test]
    fn unrelated_titles_score_low() {
        let s = similarity(
            "Quantum error correction with surface codes",
            "Economic history of medieval trade routes",
        );
        assert!(s < 40.0, "scored {s}");
    }

    // =========================================================================
    // Bigram cosine
    // =========================================================================

    #[test]
    fn ocr_noise_scores_above_unrelated() {
        // One transposed character; word tokens break but bigrams mostly hold.
        let noisy = similarity("compresison algorithms", "compression algorithms");
        let unrelated = similarity("compression algorithms", "medieval trade routes");
        assert!(noisy > unrelated);
        assert!(noisy > 50.0, "scored {noisy}");
    }

    #[test]
    fn bigram_cosine_identical_is_100() {
        assert!((bigram_cosine("abcdef", "abcdef") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn bigram_cosine_disjoint_is_0() {
        assert_eq!(bigram_cosine("aaaa", "bbbb"), 0.0);
    }

    #[test]
    fn single_char_strings_have_no_bigrams() {
        assert_eq!(bigram_cosine("a", "b"), 0.0);
        // Falls through to the blend; overlap is 0, cosine is 0.
        assert_eq!(similarity("a", "b"), 0.0);
    }
}
