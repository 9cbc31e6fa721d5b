//! Discussion / writeup / notebook list parsing.
//!
//! The lists render as `div[role="list"]` containers whose direct children
//! are the items. Everything here is best-effort: a malformed item yields
//! nothing rather than failing the page.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use podium_common::{AuthorTier, DiscussionCategory};

use crate::classify::clean_title;

const BASE_URL: &str = "https://www.kaggle.com";

static ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[role="list"] > div"#).expect("valid selector"));
static TITLE_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href*="/discussion/"], a[href*="/writeups/"], a[href*="/code/"]"#)
        .expect("valid selector")
});
static AUTHOR_LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[target="_blank"]"#).expect("valid selector"));
static SVG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("svg").expect("valid selector"));
static CIRCLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("circle").expect("valid selector"));
static ARIA_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[aria-label]").expect("valid selector"));

static VOTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+votes?\b").expect("valid regex"));
static COMMENTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+comments?\b").expect("valid regex"));
static STROKE_STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"stroke:\s*([^;]+)").expect("valid regex"));

/// One row of a discussion, writeup or notebook list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub title: String,
    pub url: String,
    pub author: String,
    pub author_tier: Option<AuthorTier>,
    pub tier_color: Option<String>,
    pub vote_count: i64,
    pub comment_count: i64,
    pub is_pinned: bool,
    pub category: DiscussionCategory,
}

/// Extract every recognizable item from a rendered list page.
pub fn parse_list_items(html: &str) -> Vec<ListItem> {
    let document = Html::parse_document(html);

    document
        .select(&ITEM_SELECTOR)
        .filter_map(parse_item)
        .collect()
}

fn parse_item(item: ElementRef<'_>) -> Option<ListItem> {
    let title_link = item.select(&TITLE_LINK_SELECTOR).next()?;
    let href = title_link.value().attr("href")?;
    let url = absolutize(href);

    let author = author_of(&item);
    let raw_title: String = title_link.text().collect::<String>().trim().to_string();
    if raw_title.is_empty() {
        return None;
    }
    let title = clean_title(&raw_title, author.as_deref());

    let item_text: String = item.text().collect::<Vec<_>>().join(" ");

    let vote_count = first_capture(&VOTES_RE, &item_text).unwrap_or(0);
    let comment_count = first_capture(&COMMENTS_RE, &item_text).unwrap_or(0);

    let category = category_from_url(&url);

    Some(ListItem {
        title,
        url,
        author: author.unwrap_or_default(),
        author_tier: detect_tier(&item, &item_text),
        tier_color: detect_tier_color(&item),
        vote_count,
        comment_count,
        is_pinned: detect_pin(&item, &item_text),
        category,
    })
}

/// `/writeups/` anywhere in the path marks the solution tab; everything else
/// is a plain discussion.
pub fn category_from_url(url: &str) -> DiscussionCategory {
    if url.contains("/writeups/") {
        DiscussionCategory::Writeup
    } else {
        DiscussionCategory::Discussion
    }
}

fn absolutize(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{BASE_URL}{href}")
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<i64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// The author link opens the profile in a new tab; its text is the display
/// name.
fn author_of(item: &ElementRef<'_>) -> Option<String> {
    let link = item.select(&AUTHOR_LINK_SELECTOR).next()?;
    let name: String = link.text().collect::<String>().trim().to_string();
    if name.is_empty() {
        // Some layouts only carry the name in the aria-label.
        return link
            .value()
            .attr("aria-label")
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
    }
    Some(name)
}

/// Scan the item's text and badge attributes for the five tier keywords,
/// longest keyword first so "Master" never swallows "Grandmaster".
fn detect_tier(item: &ElementRef<'_>, item_text: &str) -> Option<AuthorTier> {
    let mut haystack = item_text.to_lowercase();
    for labeled in item.select(&ARIA_SELECTOR) {
        if let Some(label) = labeled.value().attr("aria-label") {
            haystack.push(' ');
            haystack.push_str(&label.to_lowercase());
        }
    }
    for svg in item.select(&SVG_SELECTOR) {
        let svg_text: String = svg.text().collect();
        haystack.push(' ');
        haystack.push_str(&svg_text.to_lowercase());
    }

    AuthorTier::LONGEST_FIRST
        .iter()
        .copied()
        .find(|tier| haystack.contains(&tier.to_string().to_lowercase()))
}

/// The author badge SVG draws two circles: an outer ring and the tier ring.
/// The tier color lives on the second circle's stroke, either as an
/// attribute or inside its inline style.
fn detect_tier_color(item: &ElementRef<'_>) -> Option<String> {
    for svg in item.select(&SVG_SELECTOR) {
        let circles: Vec<ElementRef<'_>> = svg.select(&CIRCLE_SELECTOR).collect();
        if circles.len() < 2 {
            continue;
        }
        let tier_circle = circles[1];
        if let Some(stroke) = tier_circle.value().attr("stroke") {
            return Some(stroke.trim().to_string());
        }
        if let Some(style) = tier_circle.value().attr("style") {
            if let Some(cap) = STROKE_STYLE_RE.captures(style) {
                return Some(cap[1].trim().to_string());
            }
        }
    }
    None
}

fn detect_pin(item: &ElementRef<'_>, item_text: &str) -> bool {
    if item_text.contains("push_pin") {
        return true;
    }
    for labeled in item.select(&ARIA_SELECTOR) {
        if let Some(label) = labeled.value().attr("aria-label") {
            if label.to_lowercase().contains("pinned") {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_html(inner: &str) -> String {
        format!(r#"<div role="list"><div>{inner}</div></div>"#)
    }

    #[test]
    fn parses_a_basic_discussion_item() {
        let html = item_html(
            r#"
            <a href="/competitions/titanic/discussion/12345">Great EDA thread</a>
            <a target="_blank" href="/someone">Aqsa</a>
            <span>12 votes</span><span>3 comments</span>
            "#,
        );
        let items = parse_list_items(&html);
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title, "Great EDA thread");
        assert_eq!(
            item.url,
            "https://www.kaggle.com/competitions/titanic/discussion/12345"
        );
        assert_eq!(item.author, "Aqsa");
        assert_eq!(item.vote_count, 12);
        assert_eq!(item.comment_count, 3);
        assert_eq!(item.category, DiscussionCategory::Discussion);
        assert!(!item.is_pinned);
    }

    #[test]
    fn writeup_urls_get_writeup_category() {
        let html = item_html(
            r#"<a href="/competitions/titanic/writeups/winner">1st Place Solution</a>"#,
        );
        let items = parse_list_items(&html);
        assert_eq!(items[0].category, DiscussionCategory::Writeup);
    }

    #[test]
    fn title_cleaning_strips_comment_suffix_and_author() {
        let html = item_html(
            r#"
            <a href="/competitions/t/discussion/1">2nd place · solo (Aqsa)</a>
            <a target="_blank" href="/aqsa">Aqsa</a>
            "#,
        );
        let items = parse_list_items(&html);
        assert_eq!(items[0].title, "2nd place · solo");
    }

    #[test]
    fn detects_tier_longest_keyword_first() {
        let html = item_html(
            r#"
            <a href="/c/t/discussion/1">Thread</a>
            <a target="_blank" href="/u" aria-label="Profile of Grandmaster user">u</a>
            "#,
        );
        let items = parse_list_items(&html);
        assert_eq!(items[0].author_tier, Some(AuthorTier::Grandmaster));
    }

    #[test]
    fn tier_color_comes_from_second_circle() {
        let html = item_html(
            r#"
            <a href="/c/t/discussion/1">Thread</a>
            <svg>
                <circle stroke="white"></circle>
                <circle style="fill: none; stroke: rgb(149, 69, 186)"></circle>
            </svg>
            "#,
        );
        let items = parse_list_items(&html);
        assert_eq!(items[0].tier_color.as_deref(), Some("rgb(149, 69, 186)"));
    }

    #[test]
    fn single_circle_svg_yields_no_color() {
        let html = item_html(
            r#"
            <a href="/c/t/discussion/1">Thread</a>
            <svg><circle stroke="white"></circle></svg>
            "#,
        );
        let items = parse_list_items(&html);
        assert_eq!(items[0].tier_color, None);
    }

    #[test]
    fn pin_icon_marks_item_pinned() {
        let html = item_html(
            r#"
            <a href="/c/t/discussion/1">Welcome thread</a>
            <span aria-label="Pinned topic"></span>
            "#,
        );
        let items = parse_list_items(&html);
        assert!(items[0].is_pinned);
    }

    #[test]
    fn items_without_a_recognizable_link_are_skipped() {
        let html = r#"<div role="list"><div><span>Advertisement</span></div></div>"#;
        assert!(parse_list_items(html).is_empty());
    }
}
