//! Text transforms used to derive guessable answers from a title

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Leading articles, in match priority order.
///
/// The list overlaps across languages ("la" is French, Spanish and Italian),
/// matching is pattern based and the first entry that matches wins.
const ARTICLES: &[&str] = &[
    "the", "a", "an", // English
    "le", "la", "les", "l", // French
    "el", "la", "los", "las", // Spanish
    "der", "die", "das", // German
    "il", "lo", "la", "i", // Italian
];

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "of", "and", "or", "but", "in", "on", "at", "to", "for", //
    "le", "la", "les", "de", "des", "du", "et", "ou", "dans", "sur", "avec", //
    "part", "volume", "chapter", "episode", "season", "series", //
    "partie", "tome", "chapitre", "saison",
];

pub const DEFAULT_MAX_KEYWORDS: usize = 3;

const MIN_ACRONYM_LEN: usize = 2;
const MAX_ACRONYM_LEN: usize = 6;

static LEADING_ARTICLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    let alternation = ARTICLES.join("|");
    Regex::new(&format!(r"(?i)^(?:{alternation})\s+")).expect("article regex should compile")
});

/// Lowercases, folds accents and collapses whitespace.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(s: &str) -> String {
    let folded: String = s
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes one leading article and the whitespace after it, if present.
pub fn strip_leading_article(s: &str) -> &str {
    match LEADING_ARTICLE_REGEX.find(s) {
        Some(m) => &s[m.end()..],
        None => s,
    }
}

/// Drops every character that is neither alphanumeric nor whitespace.
///
/// Whitespace runs are left as they are.
pub fn strip_punctuation(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

/// Picks the longest meaningful words of a title, longest first.
///
/// Words of equal length keep the order in which they appear.
pub fn extract_keywords(s: &str, max_count: usize) -> Vec<String> {
    let cleaned = strip_punctuation(strip_leading_article(s)).to_lowercase();

    let mut keywords = cleaned
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word) && word.chars().count() > 2)
        .map(str::to_string)
        .collect::<Vec<_>>();

    // stable, so ties stay in encounter order
    keywords.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    keywords.truncate(max_count);
    keywords
}

/// First letter of every word, for titles of two words or more.
///
/// Stop words are kept: "Lord of the Rings" gives "lotr".
pub fn generate_acronym(s: &str) -> Option<String> {
    let cleaned = strip_punctuation(strip_leading_article(s));
    let words = cleaned.split_whitespace().collect::<Vec<_>>();

    if words.len() < 2 {
        return None;
    }

    let acronym = words
        .iter()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_lowercase)
        .collect::<String>();

    let len = acronym.chars().count();
    (MIN_ACRONYM_LEN..=MAX_ACRONYM_LEN)
        .contains(&len)
        .then_some(acronym)
}

/// Uppercases the first character, used for display names
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("films"), "Films");
        assert_eq!(capitalize("émissions"), "Émissions");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn normalize_lowercases_and_folds_accents() {
        assert_eq!(normalize("Amélie"), "amelie");
        assert_eq!(normalize("LÉON: The Professional"), "leon: the professional");
        assert_eq!(normalize("Ça  ira\t bien "), "ca ira bien");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in [
            "",
            "   ",
            "The Shawshank Redemption",
            "  Le Fabuleux Destin d'Amélie Poulain ",
            "Crème Brûlée\n\n2",
            "ÆØÅ straße",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn normalize_of_blank_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n "), "");
    }

    #[test]
    fn strips_only_the_first_leading_article() {
        assert_eq!(strip_leading_article("The The"), "The");
        assert_eq!(strip_leading_article("The Dark Knight"), "Dark Knight");
        assert_eq!(strip_leading_article("the   godfather"), "godfather");
    }

    #[test]
    fn article_match_is_case_insensitive_and_needs_whitespace() {
        assert_eq!(strip_leading_article("LES Misérables"), "Misérables");
        assert_eq!(strip_leading_article("Theodora"), "Theodora");
        assert_eq!(strip_leading_article("L'Odyssée"), "L'Odyssée");
        assert_eq!(strip_leading_article("Die Hard"), "Hard");
        assert_eq!(strip_leading_article("I Robot"), "Robot");
    }

    #[test]
    fn article_without_following_word_is_kept() {
        assert_eq!(strip_leading_article("The"), "The");
        assert_eq!(strip_leading_article(""), "");
    }

    #[test]
    fn strip_punctuation_keeps_word_boundaries() {
        assert_eq!(
            strip_punctuation("The Lord of the Rings: The Return"),
            "The Lord of the Rings The Return"
        );
        assert_eq!(strip_punctuation("Se7en - Director's Cut"), "Se7en  Directors Cut");
        assert_eq!(strip_punctuation("Amélie!"), "Amélie");
    }

    #[test]
    fn keywords_drop_stop_words_and_short_tokens() {
        assert_eq!(
            extract_keywords("The Lord of the Rings: The Return of the King", 3),
            vec!["return", "rings", "lord"]
        );
        assert_eq!(
            extract_keywords("Le Seigneur des Anneaux: Le Retour du Roi", 3),
            vec!["seigneur", "anneaux", "retour"]
        );
    }

    #[test]
    fn keywords_keep_encounter_order_on_ties() {
        assert_eq!(
            extract_keywords("Fight Club Night", DEFAULT_MAX_KEYWORDS),
            vec!["fight", "night", "club"]
        );
    }

    #[test]
    fn keywords_respect_max_count() {
        assert_eq!(extract_keywords("Breaking Bad Season Finale", 1), vec!["breaking"]);
        assert!(extract_keywords("Up", 3).is_empty());
        assert!(extract_keywords("Part of the Series", 3).is_empty());
    }

    #[test]
    fn acronym_uses_every_word() {
        assert_eq!(generate_acronym("Lord of the Rings").as_deref(), Some("lotr"));
        assert_eq!(generate_acronym("The Lord of the Rings").as_deref(), Some("lotr"));
        assert_eq!(generate_acronym("Star Wars").as_deref(), Some("sw"));
    }

    #[test]
    fn acronym_requires_two_words_and_bounded_length() {
        assert_eq!(generate_acronym("Inception"), None);
        assert_eq!(generate_acronym("The Godfather"), None);
        assert_eq!(
            generate_acronym("The Lord of the Rings: The Return of the King"),
            None,
            "9 letters is too long"
        );
        assert_eq!(generate_acronym("One Two Three Four Five Six").as_deref(), Some("ottffs"));
    }
}
