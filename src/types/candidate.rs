// src/types/candidate.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::types::{null_as_default, string_or_number};

/// A parsed resume as returned by the backend. Never built locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    #[serde(default)]
    pub chinese_name: Option<String>,
    #[serde(default)]
    pub english_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub current_city: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub expected_position: Option<String>,
    #[serde(default, alias = "ai_career_stage")]
    pub career_stage: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub ai_profile: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub summary_total_years: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, alias = "original_filename")]
    pub file_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Server fields this client does not interpret
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Candidate {
    pub fn display_name(&self) -> String {
        [&self.chinese_name, &self.english_name]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_loose_backend_shape() {
        let c: Candidate = serde_json::from_value(serde_json::json!({
            "id": 7,
            "english_name": "Ada",
            "skills": null,
            "summary_total_years": 5,
            "ai_career_stage": "senior",
            "original_filename": "ada.pdf",
            "oss_url": "oss://bucket/ada.pdf"
        }))
        .unwrap();

        assert!(c.skills.is_empty());
        assert_eq!(c.summary_total_years.as_deref(), Some("5"));
        assert_eq!(c.career_stage.as_deref(), Some("senior"));
        assert_eq!(c.file_name.as_deref(), Some("ada.pdf"));
        assert_eq!(c.extra["oss_url"], "oss://bucket/ada.pdf");
        assert_eq!(c.display_name(), "Ada");
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let c: Candidate = serde_json::from_str(r#"{"id": 3, "chinese_name": " "}"#).unwrap();
        assert_eq!(c.display_name(), "#3");
    }
}
