//! Title heuristics: which list items are solutions, and at what rank.
//!
//! Pure functions, no I/O.

use std::sync::LazyLock;

use regex::Regex;

use podium_common::{DiscussionCategory, Medal, SolutionKind};

use crate::parse::list::ListItem;

static RANK_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(\d+)(?:st|nd|rd|th)\s+place",
        r"(?i)#(\d+)\s+solution",
        r"(?i)rank\s+(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

const SOLUTION_KEYWORDS: &[&str] = &[
    "solution",
    "approach",
    "write-up",
    "writeup",
    "解法",
    "our solution",
    "my solution",
];

/// A list item that qualified as a solution.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionCandidate {
    pub rank: Option<i64>,
    pub medal: Option<Medal>,
    pub kind: SolutionKind,
}

/// Leaderboard rank claimed by a title, from the first matching rank pattern.
pub fn rank_from_title(title: &str) -> Option<i64> {
    for pattern in RANK_PATTERNS.iter() {
        if let Some(cap) = pattern.captures(title) {
            if let Ok(rank) = cap[1].parse::<i64>() {
                if rank >= 1 {
                    return Some(rank);
                }
            }
        }
    }
    None
}

/// Whether a title reads like a solution post: either a rank pattern or one
/// of the solution keywords.
pub fn is_solution_title(title: &str) -> bool {
    if rank_from_title(title).is_some() {
        return true;
    }
    let lowered = title.to_lowercase();
    SOLUTION_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Top-three ranks map onto medals; everything else gets none.
pub fn medal_for_rank(rank: Option<i64>) -> Option<Medal> {
    match rank {
        Some(1) => Some(Medal::Gold),
        Some(2) => Some(Medal::Silver),
        Some(3) => Some(Medal::Bronze),
        _ => None,
    }
}

/// Decide whether a scraped list item is a solution.
///
/// Items from the writeup tab are solutions unconditionally; discussion-tab
/// items qualify by title. Writeup-origin solutions are stored with
/// `kind = discussion`; the solutions table keeps one canonical origin pair.
pub fn classify_item(item: &ListItem) -> Option<SolutionCandidate> {
    let rank = rank_from_title(&item.title);

    let qualifies =
        item.category == DiscussionCategory::Writeup || is_solution_title(&item.title);
    if !qualifies {
        return None;
    }

    Some(SolutionCandidate {
        rank,
        medal: medal_for_rank(rank),
        kind: SolutionKind::Discussion,
    })
}

/// Strip list-rendering artifacts from a title: the trailing
/// "· Last comment…" / "Posted…" fragments and the trailing author name
/// (bare or parenthesized).
pub fn clean_title(title: &str, author: Option<&str>) -> String {
    let mut title = title;

    for marker in ["· Last comment", "Last comment", "Posted"] {
        if let Some(idx) = title.find(marker) {
            title = &title[..idx];
        }
    }

    let mut cleaned = title.trim().to_string();

    if let Some(author) = author.filter(|a| !a.is_empty()) {
        let parenthesized = format!("({author})");
        if cleaned.ends_with(&parenthesized) {
            cleaned.truncate(cleaned.len() - parenthesized.len());
        } else if cleaned.ends_with(author) {
            cleaned.truncate(cleaned.len() - author.len());
        }
    }

    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use podium_common::AuthorTier;

    fn list_item(title: &str, category: DiscussionCategory) -> ListItem {
        ListItem {
            title: title.to_string(),
            url: "https://www.kaggle.com/competitions/t/discussion/1".to_string(),
            author: "someone".to_string(),
            author_tier: Some(AuthorTier::Expert),
            tier_color: None,
            vote_count: 10,
            comment_count: 2,
            is_pinned: false,
            category,
        }
    }

    #[test]
    fn ordinal_place_titles_yield_rank() {
        assert_eq!(rank_from_title("1st Place Solution"), Some(1));
        assert_eq!(rank_from_title("2nd place · solo"), Some(2));
        assert_eq!(rank_from_title("11th place writeup"), Some(11));
    }

    #[test]
    fn hash_and_rank_patterns_yield_rank() {
        assert_eq!(rank_from_title("#4 solution overview"), Some(4));
        assert_eq!(rank_from_title("Rank 7 approach"), Some(7));
    }

    #[test]
    fn titles_without_rank_patterns_have_no_rank() {
        assert_eq!(rank_from_title("Our solution"), None);
        assert_eq!(rank_from_title("EDA results"), None);
    }

    #[test]
    fn medals_follow_the_fixed_table() {
        assert_eq!(medal_for_rank(Some(1)), Some(Medal::Gold));
        assert_eq!(medal_for_rank(Some(2)), Some(Medal::Silver));
        assert_eq!(medal_for_rank(Some(3)), Some(Medal::Bronze));
        assert_eq!(medal_for_rank(Some(4)), None);
        assert_eq!(medal_for_rank(None), None);
    }

    #[test]
    fn keyword_titles_are_solutions_without_rank() {
        let candidate =
            classify_item(&list_item("Our approach to this problem", DiscussionCategory::Discussion))
                .unwrap();
        assert_eq!(candidate.rank, None);
        assert_eq!(candidate.medal, None);
    }

    #[test]
    fn plain_discussions_are_not_solutions() {
        assert!(classify_item(&list_item("EDA results", DiscussionCategory::Discussion)).is_none());
    }

    #[test]
    fn writeups_are_promoted_regardless_of_title() {
        let candidate =
            classify_item(&list_item("Random musings", DiscussionCategory::Writeup)).unwrap();
        assert_eq!(candidate.rank, None);
        assert_eq!(candidate.kind, SolutionKind::Discussion);
    }

    #[test]
    fn writeup_with_rank_title_keeps_the_rank() {
        let candidate =
            classify_item(&list_item("3rd place solution", DiscussionCategory::Writeup)).unwrap();
        assert_eq!(candidate.rank, Some(3));
        assert_eq!(candidate.medal, Some(Medal::Bronze));
    }

    #[test]
    fn second_place_solo_scenario() {
        let title = "2nd place · solo (Aqsa)";
        assert!(is_solution_title(title));
        assert_eq!(rank_from_title(title), Some(2));
        assert_eq!(medal_for_rank(rank_from_title(title)), Some(Medal::Silver));
        assert_eq!(clean_title(title, Some("Aqsa")), "2nd place · solo");
    }

    #[test]
    fn clean_title_cuts_comment_and_posted_suffixes() {
        assert_eq!(
            clean_title("Great thread · Last comment 3 days ago by someone", None),
            "Great thread"
        );
        assert_eq!(clean_title("Great thread Posted 2 days ago", None), "Great thread");
    }

    #[test]
    fn clean_title_strips_trailing_author() {
        assert_eq!(clean_title("Tips and tricks Aqsa", Some("Aqsa")), "Tips and tricks");
        assert_eq!(clean_title("Tips and tricks", Some("Unrelated")), "Tips and tricks");
    }
}
