//! Competition discovery: slug extraction from platform listing pages.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Matches `href` attributes pointing into `/competitions/{slug}`.
static COMPETITION_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href\s*=\s*["'][^"']*/competitions/([a-z0-9][a-z0-9-]*)["'/?#]"#)
        .expect("valid regex")
});

/// Path segments under /competitions/ that are navigation, not slugs.
const NON_SLUG_SEGMENTS: &[&str] = &["community", "hosting", "rules"];

/// Extract competition slugs from a listing page. Deduplicated and sorted
/// lexicographically.
pub fn extract_competition_slugs(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut slugs = Vec::new();

    for cap in COMPETITION_HREF_RE.captures_iter(html) {
        let slug = cap[1].to_string();
        if NON_SLUG_SEGMENTS.contains(&slug.as_str()) {
            continue;
        }
        if seen.insert(slug.clone()) {
            slugs.push(slug);
        }
    }

    slugs.sort();
    slugs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_and_sorts_slugs() {
        let html = r#"
            <a href="/competitions/titanic">Titanic</a>
            <a href="/competitions/arc-prize-2025?tab=overview">ARC</a>
            <a href="https://www.kaggle.com/competitions/digit-recognizer/">Digits</a>
        "#;
        assert_eq!(
            extract_competition_slugs(html),
            vec!["arc-prize-2025", "digit-recognizer", "titanic"]
        );
    }

    #[test]
    fn deduplicates_repeated_links() {
        let html = r#"
            <a href="/competitions/titanic">one</a>
            <a href="/competitions/titanic">two</a>
        "#;
        assert_eq!(extract_competition_slugs(html), vec!["titanic"]);
    }

    #[test]
    fn navigation_segments_are_not_slugs() {
        let html = r#"<a href="/competitions/hosting">Host a competition</a>"#;
        assert!(extract_competition_slugs(html).is_empty());
    }

    #[test]
    fn empty_page_yields_nothing() {
        assert!(extract_competition_slugs("").is_empty());
    }
}
