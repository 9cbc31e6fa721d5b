//! Detail-page parsing: article body text plus a bucketed link inventory.

use std::sync::LazyLock;

use regex::Regex;

use super::inner_text;

/// Bare-URL matcher for link inventory over flattened article text.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("valid regex")
});

const LINKS_PER_BUCKET: usize = 5;

/// Links referenced by an article, bucketed by destination.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct LinkInventory {
    pub notebooks: Vec<String>,
    pub github: Vec<String>,
    pub other: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DetailPage {
    pub content: String,
    pub links: LinkInventory,
}

/// Extract the article body and its link inventory from a rendered page.
pub fn parse_detail(html: &str) -> DetailPage {
    let content = inner_text(html);
    let links = extract_links(&content);
    DetailPage { content, links }
}

/// Bucket every URL in the text: platform notebooks, GitHub repositories,
/// everything else. Each bucket is deduplicated and capped at five.
pub fn extract_links(content: &str) -> LinkInventory {
    let mut inventory = LinkInventory::default();

    for m in URL_RE.find_iter(content) {
        let url = m.as_str().trim_end_matches(['.', ',', ')']).to_string();

        let bucket = if url.contains("kaggle.com/code/") || url.contains("kaggle.com/notebooks/") {
            &mut inventory.notebooks
        } else if url.contains("github.com/") {
            &mut inventory.github
        } else {
            &mut inventory.other
        };

        if bucket.len() < LINKS_PER_BUCKET && !bucket.contains(&url) {
            bucket.push(url);
        }
    }

    inventory
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_by_destination() {
        let content = "\
            See https://www.kaggle.com/code/user/eda-notebook and \
            https://github.com/user/repo for details, \
            plus https://arxiv.org/abs/1234.5678.";
        let links = extract_links(content);
        assert_eq!(links.notebooks, vec!["https://www.kaggle.com/code/user/eda-notebook"]);
        assert_eq!(links.github, vec!["https://github.com/user/repo"]);
        assert_eq!(links.other, vec!["https://arxiv.org/abs/1234.5678"]);
    }

    #[test]
    fn buckets_deduplicate_and_cap_at_five() {
        let mut content = String::new();
        for i in 0..8 {
            content.push_str(&format!("https://github.com/user/repo{i} "));
        }
        content.push_str("https://github.com/user/repo0 ");

        let links = extract_links(&content);
        assert_eq!(links.github.len(), 5);
        assert_eq!(links.github[0], "https://github.com/user/repo0");
    }

    #[test]
    fn no_urls_is_an_empty_inventory() {
        assert_eq!(extract_links("nothing to see"), LinkInventory::default());
    }

    #[test]
    fn parse_detail_flattens_body() {
        let html = r#"
            <div id="site-content">
                <article><p>First paragraph.</p><p>Second paragraph.</p></article>
            </div>
        "#;
        let detail = parse_detail(html);
        assert_eq!(detail.content, "First paragraph.\nSecond paragraph.");
    }
}
