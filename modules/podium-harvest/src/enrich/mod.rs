//! LLM enrichment façade: task-specific operations over the OpenAI client.
//!
//! Every operation truncates its input to a per-task character budget,
//! retries a bounded number of times with a fixed delay, and on exhaustion
//! returns the task's typed empty value instead of an error. Callers treat
//! an empty result as "leave the field unchanged".

pub mod prompts;
pub mod schemas;

use std::collections::BTreeMap;
use std::time::Duration;

use ai_client::util::truncate_chars;
use ai_client::{OpenAi, StructuredOutput};
use tracing::warn;

use schemas::{
    CompetitionSummary, DatasetInfo, DiscussionSummary, NotebookSummary, SolutionSummary,
    TagSelection, TechniqueList,
};

/// Character budgets per task. Inputs beyond these are cut before prompting.
const DESCRIPTION_BUDGET: usize = 4_000;
const CONTENT_BUDGET: usize = 4_000;
const DATA_TAB_BUDGET: usize = 8_000;
const TRANSLATE_BUDGET: usize = 8_000;
const NOTEBOOK_BUDGET: usize = 6_000;

const METRIC_MAX_CHARS: usize = 30;

pub struct Enricher {
    ai: OpenAi,
    max_retries: u32,
    retry_delay: Duration,
}

impl Enricher {
    pub fn new(ai: OpenAi, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            ai,
            max_retries,
            retry_delay,
        }
    }

    // -----------------------------------------------------------------------
    // Competition-level operations
    // -----------------------------------------------------------------------

    /// Name the evaluation metric, or empty when the description does not
    /// state one.
    pub async fn extract_metric(&self, description: &str, title: &str) -> String {
        if description.is_empty() {
            return String::new();
        }
        let description = truncate_chars(description, DESCRIPTION_BUDGET);
        let prompt = prompts::extract_metric(description, title);

        let Some(raw) = self
            .retry_text("extract_metric", prompts::ANALYST_SYSTEM, &prompt, 0.1, Some(100))
            .await
        else {
            return String::new();
        };

        normalize_metric(&raw)
    }

    /// A 100-150 character explanation of the metric.
    pub async fn describe_metric(&self, metric: &str, description: &str, title: &str) -> String {
        if metric.is_empty() || description.is_empty() {
            return String::new();
        }
        let description = truncate_chars(description, DESCRIPTION_BUDGET);
        let prompt = prompts::describe_metric(metric, description, title);

        let Some(text) = self
            .retry_text("describe_metric", prompts::ANALYST_SYSTEM, &prompt, 0.3, Some(300))
            .await
        else {
            return String::new();
        };

        clip_chars(&text, 200)
    }

    /// Structured overview, returned as JSON text. Empty string on failure.
    pub async fn generate_summary(&self, description: &str, title: &str, metric: &str) -> String {
        if description.is_empty() {
            return String::new();
        }
        let description = truncate_chars(description, DESCRIPTION_BUDGET);
        let prompt = prompts::generate_summary(description, title, metric);

        match self
            .retry_extract::<CompetitionSummary>("generate_summary", prompts::ANALYST_JSON_SYSTEM, &prompt)
            .await
        {
            Some(summary) => serde_json::to_string(&summary).unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Pick tags from the closed taxonomy. Unknown values are dropped.
    pub async fn generate_tags(
        &self,
        description: &str,
        title: &str,
        metric: &str,
        taxonomy: &BTreeMap<String, Vec<String>>,
    ) -> TagSelection {
        if description.is_empty() && title.is_empty() {
            return TagSelection::default();
        }
        let description = truncate_chars(description, DESCRIPTION_BUDGET);
        let taxonomy_json = serde_json::to_string_pretty(taxonomy).unwrap_or_default();
        let prompt = prompts::generate_tags(description, title, metric, &taxonomy_json);

        let Some(selection) = self
            .retry_extract::<TagSelection>("generate_tags", prompts::ANALYST_JSON_SYSTEM, &prompt)
            .await
        else {
            return TagSelection::default();
        };

        filter_tags(selection, taxonomy)
    }

    /// Dataset schema from the data-tab text. Typed empty on failure.
    pub async fn extract_dataset_info(&self, data_text: &str, title: &str) -> DatasetInfo {
        if data_text.is_empty() {
            return DatasetInfo::default();
        }
        let data_text = truncate_chars(data_text, DATA_TAB_BUDGET);
        let prompt = prompts::extract_dataset_info(data_text, title);

        self.retry_extract::<DatasetInfo>("extract_dataset_info", prompts::ANALYST_JSON_SYSTEM, &prompt)
            .await
            .map(DatasetInfo::capped)
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Article-level operations
    // -----------------------------------------------------------------------

    /// Study-notes summary of a discussion, as JSON text.
    pub async fn summarize_discussion_structured(&self, content: &str, title: &str) -> String {
        if content.is_empty() {
            return String::new();
        }
        let content = truncate_chars(content, CONTENT_BUDGET);
        let prompt = prompts::summarize_discussion(content, title);

        match self
            .retry_extract::<DiscussionSummary>(
                "summarize_discussion",
                prompts::SUMMARIZER_SYSTEM,
                &prompt,
            )
            .await
        {
            Some(summary) => serde_json::to_string(&summary).unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Translate and restructure an article. Numbers, code blocks and
    /// identifiers stay verbatim; sections are separated by `━━━`.
    pub async fn translate_and_organize(&self, content: &str) -> String {
        if content.is_empty() {
            return String::new();
        }
        let content = truncate_chars(content, TRANSLATE_BUDGET);
        let prompt = prompts::translate_and_organize(content);

        self.retry_text("translate_and_organize", prompts::TRANSLATOR_SYSTEM, &prompt, 0.3, None)
            .await
            .unwrap_or_default()
    }

    /// Structured summary of a solution post, as JSON text.
    pub async fn summarize_solution_structured(&self, content: &str, title: &str) -> String {
        if content.is_empty() {
            return String::new();
        }
        let content = truncate_chars(content, CONTENT_BUDGET);
        let prompt = prompts::summarize_solution(content, title);

        match self
            .retry_extract::<SolutionSummary>(
                "summarize_solution",
                prompts::SUMMARIZER_SYSTEM,
                &prompt,
            )
            .await
        {
            Some(summary) => serde_json::to_string(&summary).unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Ranked technique list, persisted as a bare JSON array. Empty string
    /// on failure so the caller leaves the stored value alone.
    pub async fn extract_techniques(&self, content: &str, title: &str) -> String {
        if content.is_empty() {
            return String::new();
        }
        let content = truncate_chars(content, CONTENT_BUDGET);
        let prompt = prompts::extract_techniques(content, title);

        let Some(mut list) = self
            .retry_extract::<TechniqueList>("extract_techniques", prompts::ANALYST_JSON_SYSTEM, &prompt)
            .await
        else {
            return String::new();
        };

        list.techniques.truncate(10);
        if list.techniques.is_empty() {
            return String::new();
        }
        serde_json::to_string(&list.techniques).unwrap_or_default()
    }

    /// Didactic notebook summary, as JSON text.
    pub async fn summarize_notebook(&self, content: &str, title: &str) -> String {
        if content.is_empty() {
            return String::new();
        }
        let content = truncate_chars(content, NOTEBOOK_BUDGET);
        let prompt = prompts::summarize_notebook(content, title);

        match self
            .retry_extract::<NotebookSummary>(
                "summarize_notebook",
                prompts::SUMMARIZER_SYSTEM,
                &prompt,
            )
            .await
        {
            Some(summary) => serde_json::to_string(&summary).unwrap_or_default(),
            None => String::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Retry plumbing
    // -----------------------------------------------------------------------

    async fn retry_extract<T: StructuredOutput>(
        &self,
        op: &str,
        system: &str,
        user: &str,
    ) -> Option<T> {
        let attempts = self.max_retries + 1;
        for attempt in 1..=attempts {
            match self.ai.extract::<T>(system, user).await {
                Ok(value) => return Some(value),
                Err(e) => {
                    warn!(op, attempt, error = %e, "Enrichment call failed");
                    if attempt < attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }
        None
    }

    async fn retry_text(
        &self,
        op: &str,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Option<String> {
        let attempts = self.max_retries + 1;
        for attempt in 1..=attempts {
            match self.ai.chat_text(system, user, temperature, max_tokens).await {
                Ok(value) => return Some(value),
                Err(e) => {
                    warn!(op, attempt, error = %e, "Enrichment call failed");
                    if attempt < attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }
        None
    }
}

/// Strip the lead-in phrases models like to add, and reject anything too
/// long to be a metric name.
fn normalize_metric(raw: &str) -> String {
    let metric = raw
        .trim()
        .trim_start_matches("評価指標は")
        .trim_start_matches("評価指標:")
        .trim_start_matches("指標:")
        .trim()
        .to_string();

    if metric.chars().count() > METRIC_MAX_CHARS {
        String::new()
    } else {
        metric
    }
}

fn clip_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let clipped: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{clipped}...")
}

/// Taxonomy closure: every selected value must exist in the supplied
/// taxonomy; duplicates are dropped; an unknown domain becomes empty.
fn filter_tags(selection: TagSelection, taxonomy: &BTreeMap<String, Vec<String>>) -> TagSelection {
    let empty: Vec<String> = Vec::new();
    let data_types = taxonomy.get("data_type").unwrap_or(&empty);
    let domains = taxonomy.get("domain").unwrap_or(&empty);
    let all_names: Vec<&String> = taxonomy.values().flatten().collect();

    let domain = if domains.iter().any(|d| *d == selection.domain) {
        selection.domain
    } else {
        String::new()
    };

    TagSelection {
        data_types: dedup_retain(selection.data_types, |t| data_types.contains(t)),
        tags: dedup_retain(selection.tags, |t| all_names.iter().any(|n| *n == t)),
        domain,
    }
}

fn dedup_retain(values: Vec<String>, keep: impl Fn(&String) -> bool) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| keep(v) && seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> BTreeMap<String, Vec<String>> {
        BTreeMap::from([
            (
                "data_type".to_string(),
                vec!["画像".to_string(), "テキスト".to_string()],
            ),
            (
                "task_type".to_string(),
                vec!["回帰".to_string(), "分類（二値）".to_string()],
            ),
            (
                "domain".to_string(),
                vec!["医療".to_string(), "金融".to_string()],
            ),
        ])
    }

    #[test]
    fn unknown_tags_are_dropped() {
        let selection = TagSelection {
            data_types: vec!["画像".to_string(), "ホログラム".to_string()],
            tags: vec!["回帰".to_string(), "invented-tag".to_string()],
            domain: "医療".to_string(),
        };
        let filtered = filter_tags(selection, &taxonomy());
        assert_eq!(filtered.data_types, vec!["画像"]);
        assert_eq!(filtered.tags, vec!["回帰"]);
        assert_eq!(filtered.domain, "医療");
    }

    #[test]
    fn unknown_domain_becomes_empty() {
        let selection = TagSelection {
            domain: "宇宙開発".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_tags(selection, &taxonomy()).domain, "");
    }

    #[test]
    fn duplicate_tags_are_dropped() {
        let selection = TagSelection {
            tags: vec!["回帰".to_string(), "回帰".to_string()],
            ..Default::default()
        };
        assert_eq!(filter_tags(selection, &taxonomy()).tags, vec!["回帰"]);
    }

    #[test]
    fn metric_lead_ins_are_stripped() {
        assert_eq!(normalize_metric("評価指標はF1スコア"), "F1スコア");
        assert_eq!(normalize_metric("指標: RMSE"), "RMSE");
        assert_eq!(normalize_metric("  AUC-ROC  "), "AUC-ROC");
    }

    #[test]
    fn overlong_metric_is_rejected() {
        let long = "あ".repeat(31);
        assert_eq!(normalize_metric(&long), "");
    }

    #[test]
    fn clip_chars_appends_ellipsis() {
        let text = "x".repeat(250);
        let clipped = clip_chars(&text, 200);
        assert_eq!(clipped.chars().count(), 200);
        assert!(clipped.ends_with("..."));
    }
}
