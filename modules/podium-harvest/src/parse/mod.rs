//! Page parsers: rendered DOM in, typed records out.

pub mod detail;
pub mod list;
pub mod listing;
pub mod meta;

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static CONTENT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["#site-content", "main", "body"]
        .iter()
        .map(|s| Selector::parse(s).expect("valid selector"))
        .collect()
});

/// Flatten the main content region of a page into line-oriented text,
/// approximating the browser's `inner_text`. Script, style and SVG subtrees
/// are dropped; block elements produce line breaks.
pub fn inner_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let document = Html::parse_document(html);

    for selector in CONTENT_SELECTORS.iter() {
        if let Some(root) = document.select(selector).next() {
            let mut out = String::new();
            collect_text(root, &mut out);
            return normalize_lines(&out);
        }
    }

    String::new()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                if !out.is_empty() && !out.ends_with('\n') && !out.ends_with(' ') {
                    out.push(' ');
                }
                out.push_str(trimmed);
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if matches!(name, "script" | "style" | "noscript" | "svg" | "template") {
                continue;
            }
            let block = is_block(name);
            if block && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            collect_text(child_el, out);
            if block && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
        }
    }
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "li"
            | "ul"
            | "ol"
            | "table"
            | "tr"
            | "br"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "pre"
            | "blockquote"
    )
}

fn normalize_lines(raw: &str) -> String {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_site_content_region() {
        let html = r#"
            <body>
                <nav>Navigation junk</nav>
                <div id="site-content"><p>Hello</p><p>World</p></div>
            </body>
        "#;
        assert_eq!(inner_text(html), "Hello\nWorld");
    }

    #[test]
    fn falls_back_to_body() {
        let html = "<body><p>Only body</p></body>";
        assert_eq!(inner_text(html), "Only body");
    }

    #[test]
    fn drops_script_and_svg_subtrees() {
        let html = r#"
            <div id="site-content">
                <script>var secret = 1;</script>
                <svg><title>Expert</title></svg>
                <p>Visible</p>
            </div>
        "#;
        assert_eq!(inner_text(html), "Visible");
    }

    #[test]
    fn inline_elements_do_not_break_lines() {
        let html = r#"<div id="site-content"><p>12 <span>votes</span></p></div>"#;
        assert_eq!(inner_text(html), "12 votes");
    }

    #[test]
    fn empty_html_is_empty_text() {
        assert_eq!(inner_text(""), "");
    }
}
