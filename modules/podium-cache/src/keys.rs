//! Cache key namespaces.
//!
//! `page:*` and `meta:*` carry scraped-page envelopes (short TTL);
//! `content:*` carries rendered article bodies (3-day TTL).

/// Scraped tab text for a competition, e.g. `page:titanic:overview`.
pub fn page(comp_id: &str, tab: &str) -> String {
    format!("page:{comp_id}:{tab}")
}

/// Parsed competition metadata envelope.
pub fn meta(comp_id: &str) -> String {
    format!("meta:{comp_id}")
}

/// Rendered discussion body.
pub fn discussion_content(id: i64) -> String {
    format!("content:discussion:{id}")
}

/// Translated-and-reorganized discussion body.
pub fn discussion_translated(id: i64) -> String {
    format!("content:discussion:{id}:translated")
}

/// Rendered solution body.
pub fn solution_content(id: i64) -> String {
    format!("content:solution:{id}")
}

/// Translated-and-reorganized solution body.
pub fn solution_translated(id: i64) -> String {
    format!("content:solution:{id}:translated")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(page("titanic", "data"), "page:titanic:data");
        assert_eq!(meta("titanic"), "meta:titanic");
        assert_eq!(discussion_content(7), "content:discussion:7");
        assert_eq!(discussion_translated(7), "content:discussion:7:translated");
        assert_eq!(solution_content(9), "content:solution:9");
        assert_eq!(solution_translated(9), "content:solution:9:translated");
    }
}
