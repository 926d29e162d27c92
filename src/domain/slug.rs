use super::text::normalize;

/// Filesystem friendly name derived from a title: lowercase ascii words joined by dashes.
///
/// Accents are folded first so "Amélie" becomes "amelie". Returns `None`
/// when nothing usable is left.
pub fn slugify(title: &str) -> Option<String> {
    let folded = normalize(title).replace(['\'', '’'], "");
    let slug: String = folded
        .chars()
        .map(|ch| match ch {
            ch if ch.is_ascii_alphanumeric() => ch,
            _ => '-',
        })
        .collect();

    let slug = slug
        .split('-')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() { None } else { Some(slug) }
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slug_is_lowercase_and_dashed() {
        assert_eq!(
            slugify("The Lord of the Rings: The Return of the King").as_deref(),
            Some("the-lord-of-the-rings-the-return-of-the-king")
        );
        assert_eq!(slugify("  Fight   Club ").as_deref(), Some("fight-club"));
    }

    #[test]
    fn slug_folds_accents_and_drops_apostrophes() {
        assert_eq!(slugify("Amélie").as_deref(), Some("amelie"));
        assert_eq!(slugify("Schindler's List").as_deref(), Some("schindlers-list"));
        assert_eq!(slugify("WALL·E").as_deref(), Some("wall-e"));
    }

    #[test]
    fn slug_of_symbols_only_is_none() {
        assert_eq!(slugify("?!"), None);
        assert_eq!(slugify(""), None);
        assert_eq!(slugify("東京"), None);
    }
}
