//! Heuristic extraction of competition metadata from overview-page text.
//!
//! The overview tab renders lines like "Started May 1, 2025" and
//! "Closes Aug 30, 2025"; the evaluation section names the metric. None of
//! this is structured, so everything here is a best-effort line scan; the
//! LLM pass fills in whatever the heuristics miss.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// "May 1, 2025" / "Aug 30, 2025" style dates.
static LONG_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][a-z]+ \d{1,2}, \d{4})").expect("valid regex"));
/// ISO dates, as rendered in some localized layouts.
static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompetitionMeta {
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub metric_candidate: Option<String>,
}

/// Scan overview text for title, dates and a metric candidate.
pub fn parse_competition_meta(text: &str) -> CompetitionMeta {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let mut meta = CompetitionMeta {
        title: lines.first().map(|l| l.to_string()),
        ..Default::default()
    };

    for (i, line) in lines.iter().enumerate() {
        if meta.start_date.is_none() && line.contains("Started") {
            meta.start_date = date_in(line);
        }
        if meta.end_date.is_none()
            && (line.contains("Ended") || line.contains("Closes") || line.contains("Deadline"))
        {
            meta.end_date = date_in(line);
        }
        if meta.metric_candidate.is_none() && line.to_lowercase().contains("evaluation") {
            meta.metric_candidate = metric_after(&lines, i);
        }
    }

    meta
}

fn date_in(line: &str) -> Option<NaiveDate> {
    if let Some(cap) = LONG_DATE_RE.captures(line) {
        if let Ok(date) = NaiveDate::parse_from_str(&cap[1], "%b %d, %Y") {
            return Some(date);
        }
        if let Ok(date) = NaiveDate::parse_from_str(&cap[1], "%B %d, %Y") {
            return Some(date);
        }
    }
    if let Some(cap) = ISO_DATE_RE.captures(line) {
        return NaiveDate::parse_from_str(&cap[1], "%Y-%m-%d").ok();
    }
    None
}

/// The metric usually sits right after the "Evaluation" heading, as a short
/// line of its own ("Submissions are evaluated on F1 score" or just
/// "ROC AUC"). Long prose lines are not metric names.
fn metric_after(lines: &[&str], heading_idx: usize) -> Option<String> {
    lines
        .iter()
        .skip(heading_idx + 1)
        .take(3)
        .find(|line| line.chars().count() <= 60)
        .map(|line| line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_started_and_closes_lines() {
        let text = "\
Spaceship Titanic
Predict which passengers are transported.
Started Feb 10, 2025
Closes Aug 30, 2025";
        let meta = parse_competition_meta(text);
        assert_eq!(meta.title.as_deref(), Some("Spaceship Titanic"));
        assert_eq!(meta.start_date, Some(date(2025, 2, 10)));
        assert_eq!(meta.end_date, Some(date(2025, 8, 30)));
    }

    #[test]
    fn ended_lines_with_iso_dates_parse() {
        let text = "Title\nEnded 2024-12-01";
        let meta = parse_competition_meta(text);
        assert_eq!(meta.end_date, Some(date(2024, 12, 1)));
    }

    #[test]
    fn metric_candidate_follows_evaluation_heading() {
        let text = "\
Title
Evaluation
ROC AUC
Submissions are scored on the area under the curve.";
        let meta = parse_competition_meta(text);
        assert_eq!(meta.metric_candidate.as_deref(), Some("ROC AUC"));
    }

    #[test]
    fn relative_dates_yield_nothing() {
        let text = "Title\nStarted 3 months ago";
        let meta = parse_competition_meta(text);
        assert_eq!(meta.start_date, None);
    }

    #[test]
    fn empty_text_is_empty_meta() {
        assert_eq!(parse_competition_meta(""), CompetitionMeta::default());
    }
}
