//! Accepted answers for a quiz track
//!
//! A player's guess counts as correct when it matches any entry of the
//! track's [`AnswerSet`]. The set is derived from the original title and,
//! when known, a localized title, by layering progressively looser variants:
//! raw, without leading article, without punctuation, without both, the
//! longest keywords and an acronym.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::text::{
    DEFAULT_MAX_KEYWORDS, extract_keywords, generate_acronym, normalize, strip_leading_article,
    strip_punctuation,
};

/// Distinct, non-empty, normalized answers ordered shortest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(Vec<String>);

impl AnswerSet {
    pub fn contains(&self, answer: &str) -> bool {
        self.0.iter().any(|a| a == answer)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    fn from_candidates(candidates: BTreeSet<String>) -> Self {
        let mut answers = candidates
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        // BTreeSet already sorted lexicographically, that becomes the tie break
        answers.sort_by_key(|a| a.chars().count());
        Self(answers)
    }
}

/// Builds the accepted answers for a title and an optional localized title.
///
/// Pure and deterministic. Blank input yields an empty set.
pub fn generate_accepted_answers(title: &str, localized_title: Option<&str>) -> AnswerSet {
    let mut candidates = BTreeSet::new();

    collect_variants(title, &mut candidates);
    if let Some(localized) = localized_title {
        collect_variants(localized, &mut candidates);
    }

    AnswerSet::from_candidates(candidates)
}

fn collect_variants(title: &str, answers: &mut BTreeSet<String>) {
    let without_article_raw = strip_leading_article(title);

    let normalized = normalize(title);
    let without_article = normalize(without_article_raw);
    let without_punctuation = normalize(&strip_punctuation(title));
    let clean = normalize(&strip_punctuation(without_article_raw));

    answers.insert(normalized.clone());

    if without_article != normalized {
        answers.insert(without_article.clone());
    }
    if without_punctuation != normalized {
        answers.insert(without_punctuation.clone());
    }
    // compared against the two partial variants, not the raw one
    if clean != without_article && clean != without_punctuation {
        answers.insert(clean);
    }

    let keywords = extract_keywords(title, DEFAULT_MAX_KEYWORDS);
    if !keywords.is_empty() {
        answers.insert(normalize(&keywords.join(" ")));
    }

    if let Some(acronym) = generate_acronym(title) {
        answers.insert(normalize(&acronym));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn answers(title: &str, localized: Option<&str>) -> Vec<String> {
        generate_accepted_answers(title, localized).into_vec()
    }

    #[test]
    fn shawshank_has_raw_and_articleless_forms() {
        let set = generate_accepted_answers("The Shawshank Redemption", None);

        assert!(set.contains("the shawshank redemption"));
        assert!(set.contains("shawshank redemption"));
        assert!(set.contains("redemption shawshank"));
        assert!(set.contains("sr"));
        assert!(!set.contains(""));
    }

    #[test]
    fn lord_of_the_rings_covers_both_languages() {
        let set = generate_accepted_answers(
            "The Lord of the Rings: The Return of the King",
            Some("Le Seigneur des Anneaux: Le Retour du Roi"),
        );

        assert!(set.contains("the lord of the rings: the return of the king"));
        assert!(set.contains("lord of the rings the return of the king"));
        assert!(set.contains("return rings lord"));

        assert!(set.contains("le seigneur des anneaux: le retour du roi"));
        assert!(set.contains("seigneur des anneaux le retour du roi"));
        assert!(set.contains("seigneur anneaux retour"));

        // 9 and 7 words: both acronyms are out of bounds
        assert!(set.iter().all(|a| a.chars().count() > 6));
    }

    #[test]
    fn localized_title_gets_an_acronym_too() {
        let set = generate_accepted_answers("Spirited Away", Some("Le Voyage de Chihiro"));

        assert!(set.contains("sa"));
        assert!(set.contains("vdc"));
    }

    #[test]
    fn no_article_variant_is_skipped_when_identical() {
        assert_eq!(answers("Inception", None), vec!["inception"]);
    }

    #[test]
    fn clean_variant_needs_to_differ_from_both_partial_variants() {
        // stripping the article already removes everything stripping punctuation would
        let list = answers("The Matrix", None);
        assert_eq!(list, vec!["matrix", "the matrix"]);

        let list = answers("Alien: Resurrection", None);
        assert!(list.contains(&"alien resurrection".to_string()));
        assert!(list.contains(&"alien: resurrection".to_string()));
    }

    #[test]
    fn answers_are_folded_and_lowercase() {
        let set = generate_accepted_answers("Amélie", Some("Le Fabuleux Destin d'Amélie Poulain"));

        assert!(set.contains("amelie"));
        assert!(set.contains("fabuleux destin damelie poulain"));
        assert!(set.contains("fabuleux damelie poulain"));
        for answer in set.iter() {
            assert_eq!(answer, normalize(answer));
        }
    }

    #[test]
    fn empty_and_blank_titles_give_empty_sets() {
        assert!(generate_accepted_answers("", None).is_empty());
        assert!(generate_accepted_answers("   ", Some("")).is_empty());
    }

    #[test]
    fn never_contains_blank_or_duplicate_entries() {
        let titles = [
            "The Godfather",
            "The Godfather: Part II",
            "Star Wars: Episode IV - A New Hope",
            "Les Misérables",
            "Die Hard",
            "A",
            "The",
            "E.T. the Extra-Terrestrial",
            "8½",
            "Léon",
        ];

        for title in titles {
            let list = answers(title, Some(title));
            assert!(!list.is_empty(), "{title}");
            assert!(list.iter().all(|a| !a.trim().is_empty()), "{title}: {list:?}");
            let unique = list.iter().collect::<HashSet<_>>();
            assert_eq!(unique.len(), list.len(), "{title}: {list:?}");
        }
    }

    #[test]
    fn ordered_by_ascending_length() {
        let list = answers("The Lord of the Rings: The Return of the King", None);

        let lengths = list.iter().map(|a| a.chars().count()).collect::<Vec<_>>();
        let mut sorted = lengths.clone();
        sorted.sort();
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn is_deterministic() {
        let first = answers("Pirates of the Caribbean", Some("Pirates des Caraïbes"));
        for _ in 0..5 {
            assert_eq!(answers("Pirates of the Caribbean", Some("Pirates des Caraïbes")), first);
        }
    }

    #[test]
    fn serializes_as_plain_list() {
        let set = generate_accepted_answers("Inception", None);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["inception"]"#);
    }
}
