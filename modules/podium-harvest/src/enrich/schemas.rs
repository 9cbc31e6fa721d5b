//! Output shapes for the enrichment operations.
//!
//! These are the contract between prompt and parser: the prompt text can
//! drift, the shapes cannot. Fields without `#[serde(default)]` are
//! required; a reply missing one fails validation and burns a retry.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `generate_summary` output.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompetitionSummary {
    pub overview: String,
    pub objective: String,
    pub data: String,
    pub evaluation: EvaluationSummary,
    pub business_value: String,
    #[serde(default)]
    pub key_challenges: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationSummary {
    pub metric: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub why_important: String,
}

/// `generate_tags` output. Values outside the supplied taxonomy are dropped
/// after parsing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TagSelection {
    #[serde(default)]
    pub data_types: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub domain: String,
}

/// `extract_dataset_info` output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DatasetInfo {
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub total_size: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl DatasetInfo {
    /// Enforce the per-field caps.
    pub fn capped(mut self) -> Self {
        self.files.truncate(10);
        self.features.truncate(15);
        self.columns.truncate(20);
        self
    }
}

/// `summarize_discussion_structured` output: study notes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiscussionSummary {
    pub overview: String,
    pub main_topic: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub technical_details: String,
    #[serde(default)]
    pub glossary: Vec<GlossaryEntry>,
    #[serde(default)]
    pub approaches: Vec<String>,
    #[serde(default)]
    pub code_examples: String,
    #[serde(default)]
    pub results: String,
    #[serde(default)]
    pub related_links: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GlossaryEntry {
    pub term: String,
    #[serde(default)]
    pub explanation: String,
}

/// `summarize_solution_structured` output.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SolutionSummary {
    pub overview: String,
    pub approach: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub results: String,
    #[serde(default)]
    pub techniques: Vec<Technique>,
}

/// One technique in a ranked list.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Technique {
    pub name: String,
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub description: String,
}

/// `extract_techniques` wire shape. The persisted value is the bare array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TechniqueList {
    #[serde(default)]
    pub techniques: Vec<Technique>,
}

/// `summarize_notebook` output: a didactic walkthrough.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotebookSummary {
    pub purpose: String,
    #[serde(default)]
    pub data_overview: String,
    #[serde(default)]
    pub input_data: String,
    #[serde(default)]
    pub output_data: String,
    #[serde(default)]
    pub processing_steps: Vec<String>,
    #[serde(default)]
    pub approach: String,
    #[serde(default)]
    pub key_techniques: Vec<String>,
    #[serde(default)]
    pub models_used: Vec<String>,
    #[serde(default)]
    pub glossary: Vec<GlossaryEntry>,
    #[serde(default)]
    pub results: String,
    #[serde(default)]
    pub useful_for: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_missing_required_fields_fails_validation() {
        let err = serde_json::from_str::<CompetitionSummary>(r#"{"overview":"x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn summary_with_all_required_fields_parses() {
        let json = r#"{
            "overview": "o", "objective": "p", "data": "d",
            "evaluation": {"metric": "F1"},
            "business_value": "v"
        }"#;
        let parsed: CompetitionSummary = serde_json::from_str(json).unwrap();
        assert!(parsed.key_challenges.is_empty());
        assert_eq!(parsed.evaluation.metric, "F1");
    }

    #[test]
    fn dataset_info_caps_apply() {
        let info = DatasetInfo {
            files: (0..20).map(|i| format!("f{i}.csv")).collect(),
            features: (0..30).map(|i| format!("feat{i}")).collect(),
            columns: (0..40)
                .map(|i| ColumnInfo {
                    name: format!("col{i}"),
                    description: String::new(),
                })
                .collect(),
            ..Default::default()
        }
        .capped();
        assert_eq!(info.files.len(), 10);
        assert_eq!(info.features.len(), 15);
        assert_eq!(info.columns.len(), 20);
    }

    #[test]
    fn tag_selection_tolerates_missing_fields() {
        let parsed: TagSelection = serde_json::from_str("{}").unwrap();
        assert!(parsed.data_types.is_empty());
        assert!(parsed.domain.is_empty());
    }
}
