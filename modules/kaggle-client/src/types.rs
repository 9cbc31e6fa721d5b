use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One competition as returned by `GET /api/v1/competitions/list`.
///
/// `ref` is sometimes a bare slug and sometimes a full competition URL;
/// use [`CompetitionInfo::slug`] instead of reading it directly.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionInfo {
    #[serde(rename = "ref")]
    pub reference: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enabled_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub evaluation_metric: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub reward: Option<String>,
}

impl CompetitionInfo {
    /// The stable competition slug, extracted from `ref` whether the API
    /// returned `titanic` or `https://www.kaggle.com/competitions/titanic/`.
    pub fn slug(&self) -> &str {
        slug_from_ref(&self.reference)
    }
}

pub(crate) fn slug_from_ref(reference: &str) -> &str {
    if reference.starts_with("http") {
        reference
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(reference)
    } else {
        reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_slug_passes_through() {
        assert_eq!(slug_from_ref("titanic"), "titanic");
    }

    #[test]
    fn url_ref_yields_last_segment() {
        assert_eq!(
            slug_from_ref("https://www.kaggle.com/competitions/titanic"),
            "titanic"
        );
        assert_eq!(
            slug_from_ref("https://www.kaggle.com/c/spaceship-titanic/"),
            "spaceship-titanic"
        );
    }
}
