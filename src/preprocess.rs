use regex::Regex;
use std::sync::LazyLock;

/// Concept keywords the backend's intents are trained on, with the words
/// users tend to type instead.
const CONCEPT_SYNONYMS: &[(&str, &[&str])] = &[
    ("cost", &["fee", "price", "charge", "amount", "payment"]),
    ("documents", &["papers", "proof", "ids", "requirements", "files"]),
    ("where", &["location", "apply", "submit", "place"]),
    ("authority", &["who issues", "issuer", "department", "office"]),
    ("lost", &["misplaced", "gone", "duplicate", "lost it"]),
];

/// Minimum Ratcliff/Obershelp similarity for a fuzzy synonym match.
const FUZZY_CUTOFF: f32 = 0.75;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+|\S").expect("token pattern is valid"));

/// Map `word` to its concept keyword, or return it unchanged.
///
/// Concepts are tried in order; within a concept an exact match on the
/// keyword or a synonym wins, otherwise the closest synonym scoring at least
/// the fuzzy cutoff. Short words match short synonyms easily: `is` counts as
/// `ids` and therefore as `documents`.
pub fn normalize_to_concept(word: &str) -> &str {
    let lowered = word.to_lowercase();
    for (concept, synonyms) in CONCEPT_SYNONYMS {
        if lowered == *concept || synonyms.contains(&lowered.as_str()) {
            return *concept;
        }
        let close = difflib::get_close_matches(&lowered, synonyms.to_vec(), 1, FUZZY_CUTOFF);
        if !close.is_empty() {
            return *concept;
        }
    }
    word
}

/// Normalize free text before it is sent to the backend: split into word and
/// punctuation tokens, map each to its concept, and re-join with spaces.
pub fn preprocess_user_input(text: &str) -> String {
    TOKEN
        .find_iter(text)
        .map(|token| normalize_to_concept(token.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_synonyms_map_to_concepts() {
        assert_eq!(normalize_to_concept("Fee"), "cost");
        assert_eq!(normalize_to_concept("papers"), "documents");
        assert_eq!(normalize_to_concept("misplaced"), "lost");
        assert_eq!(normalize_to_concept("COST"), "cost");
    }

    #[test]
    fn near_misses_are_matched_fuzzily() {
        assert_eq!(normalize_to_concept("fees"), "cost");
        assert_eq!(normalize_to_concept("paymnt"), "cost");
        assert_eq!(normalize_to_concept("departmant"), "authority");
        assert_eq!(normalize_to_concept("places"), "where");
    }

    #[test]
    fn short_words_match_short_synonyms() {
        assert_eq!(normalize_to_concept("is"), "documents");
        assert_eq!(normalize_to_concept("id"), "documents");
        assert_eq!(normalize_to_concept("what"), "what");
    }

    #[test]
    fn unrelated_words_are_untouched() {
        assert_eq!(normalize_to_concept("Passport"), "Passport");
        assert_eq!(normalize_to_concept("?"), "?");
    }

    #[test]
    fn sentences_are_tokenized_and_rejoined() {
        assert_eq!(
            preprocess_user_input("What is the fee for a passport?"),
            "What documents the cost for a passport ?"
        );
        assert_eq!(
            preprocess_user_input("I misplaced my license, where to apply"),
            "I lost my license , where to where"
        );
        assert_eq!(
            preprocess_user_input("Which papers do I need"),
            "Which documents do I need"
        );
    }
}
