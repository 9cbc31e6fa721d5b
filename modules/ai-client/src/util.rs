/// Truncate `s` to at most `max_chars` characters, cutting on a char
/// boundary. Used to keep prompt inputs inside per-task budgets.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// Strip a markdown code fence from around a JSON reply. Models in JSON mode
/// still occasionally wrap their output in ```json fences.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars_not_bytes() {
        let text = "評価指標はF1スコアです";
        assert_eq!(truncate_chars(text, 4), "評価指標");
    }

    #[test]
    fn truncate_within_bounds_is_identity() {
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn strips_fenced_json() {
        assert_eq!(strip_code_blocks("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("{}"), "{}");
    }
}
