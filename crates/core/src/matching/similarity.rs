//! Description similarity scoring.
//!
//! Sorensen-Dice coefficient over character bigrams, reported in permille
//! (0..=1000) so scores stay in integer arithmetic and compare exactly.

use std::collections::HashMap;

/// Similarity between two descriptions, in permille.
///
/// Case-insensitive; punctuation and extra whitespace are ignored. Two empty
/// (or all-punctuation) descriptions score 1000, one empty side scores 0.
#[must_use]
pub fn description_similarity(a: &str, b: &str) -> u32 {
    let a = normalize(a);
    let b = normalize(b);

    let bigrams_a = bigrams(&a);
    let bigrams_b = bigrams(&b);

    if bigrams_a.is_empty() && bigrams_b.is_empty() {
        // No bigrams at all: fall back to direct comparison of what's left.
        return if a == b { 1000 } else { 0 };
    }
    if bigrams_a.is_empty() || bigrams_b.is_empty() {
        return 0;
    }

    let mut counts: HashMap<[char; 2], usize> = HashMap::new();
    for bigram in &bigrams_a {
        *counts.entry(*bigram).or_insert(0) += 1;
    }

    let mut overlap = 0usize;
    for bigram in &bigrams_b {
        if let Some(count) = counts.get_mut(bigram) {
            if *count > 0 {
                *count -= 1;
                overlap += 1;
            }
        }
    }

    let total = bigrams_a.len() + bigrams_b.len();
    let scaled = 2 * overlap * 1000 / total;
    u32::try_from(scaled).unwrap_or(1000)
}

/// Lowercase and collapse runs of non-alphanumeric characters to one space.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

fn bigrams(text: &str) -> Vec<[char; 2]> {
    let chars: Vec<char> = text.chars().collect();
    chars.windows(2).map(|w| [w[0], w[1]]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_descriptions() {
        assert_eq!(description_similarity("Deposit A", "Deposit A"), 1000);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        assert_eq!(description_similarity("DEPOSIT-A", "deposit a"), 1000);
        assert_eq!(description_similarity("Fee  B.", "fee b"), 1000);
    }

    #[test]
    fn test_disjoint_descriptions() {
        assert_eq!(description_similarity("wire", "chck"), 0);
    }

    #[test]
    fn test_partial_overlap_is_between() {
        let score = description_similarity("Deposit A", "Deposit C");
        assert!(score > 0 && score < 1000, "score was {score}");
    }

    #[test]
    fn test_closer_description_scores_higher() {
        let close = description_similarity("Monthly service fee", "Monthly service fee Jan");
        let far = description_similarity("Monthly service fee", "Wire transfer in");
        assert!(close > far);
    }

    #[test]
    fn test_empty_sides() {
        assert_eq!(description_similarity("", ""), 1000);
        assert_eq!(description_similarity("", "Deposit"), 0);
        assert_eq!(description_similarity("...", "---"), 1000);
    }

    #[test]
    fn test_single_char_no_bigrams() {
        assert_eq!(description_similarity("a", "a"), 1000);
        assert_eq!(description_similarity("a", "b"), 0);
    }

    #[test]
    fn test_symmetric() {
        let ab = description_similarity("Deposit A", "Deposit B");
        let ba = description_similarity("Deposit B", "Deposit A");
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_repeated_bigrams_counted_once_each() {
        // "aaaa" has bigrams [aa, aa, aa]; "aa" has [aa]. Overlap is 1.
        assert_eq!(description_similarity("aaaa", "aa"), 2 * 1 * 1000 / 4);
    }
}
