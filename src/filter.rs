// src/filter.rs
//! Derives the visible candidate list from the loaded collection

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::candidate::Candidate;
use crate::types::company::PositionScope;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search_keyword: String,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub selected_position: Option<PositionScope>,
}

/// Narrowing applied on top of the keyword search; all set fields must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickFilters {
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub experience: String,
}

impl QuickFilters {
    pub fn is_empty(&self) -> bool {
        [&self.skills, &self.city, &self.position, &self.experience]
            .iter()
            .all(|v| v.trim().is_empty())
    }
}

/// How candidates are fetched. The two modes never mix: a position scope
/// returns everything for that position, the global list is paginated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateQuery {
    Global {
        page: u32,
        page_size: u32,
        search: String,
        sort_order: SortOrder,
    },
    Position {
        position_id: i64,
    },
}

impl CandidateQuery {
    pub fn from_criteria(criteria: &FilterCriteria, page: u32, page_size: u32) -> Self {
        match &criteria.selected_position {
            Some(scope) => CandidateQuery::Position {
                position_id: scope.position_id,
            },
            None => CandidateQuery::Global {
                page: page.max(1),
                page_size,
                search: criteria.search_keyword.trim().to_string(),
                sort_order: criteria.sort_order,
            },
        }
    }
}

fn contains(field: &Option<String>, needle: &str) -> bool {
    field
        .as_deref()
        .map(|value| value.to_lowercase().contains(needle))
        .unwrap_or(false)
}

fn matches_keyword(candidate: &Candidate, keyword: &str) -> bool {
    contains(&candidate.chinese_name, keyword)
        || contains(&candidate.english_name, keyword)
        || contains(&candidate.expected_position, keyword)
        || candidate
            .skills
            .iter()
            .any(|skill| skill.to_lowercase().contains(keyword))
        || contains(&candidate.ai_profile, keyword)
        || contains(&candidate.current_city, keyword)
        || contains(&candidate.email, keyword)
        || contains(&candidate.phone, keyword)
}

fn matches_quick(candidate: &Candidate, quick: &QuickFilters) -> bool {
    let wanted = |value: &str| {
        let value = value.trim().to_lowercase();
        (!value.is_empty()).then_some(value)
    };

    if let Some(skill) = wanted(&quick.skills) {
        if !candidate
            .skills
            .iter()
            .any(|s| s.to_lowercase().contains(&skill))
        {
            return false;
        }
    }
    if let Some(city) = wanted(&quick.city) {
        if !contains(&candidate.current_city, &city) {
            return false;
        }
    }
    if let Some(position) = wanted(&quick.position) {
        if !contains(&candidate.expected_position, &position) {
            return false;
        }
    }
    if let Some(years) = wanted(&quick.experience) {
        if !contains(&candidate.summary_total_years, &years) {
            return false;
        }
    }
    true
}

/// Milliseconds since the epoch; anything unparseable counts as the epoch.
pub fn created_at_millis(created_at: Option<&str>) -> i64 {
    let Some(raw) = created_at.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_millis();
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return dt.and_utc().timestamp_millis();
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// Keyword and quick filters, then a stable sort on `created_at`.
pub fn apply(
    candidates: &[Candidate],
    criteria: &FilterCriteria,
    quick: &QuickFilters,
) -> Vec<Candidate> {
    let keyword = criteria.search_keyword.trim().to_lowercase();

    let mut keyed: Vec<(i64, &Candidate)> = candidates
        .iter()
        .filter(|c| keyword.is_empty() || matches_keyword(c, &keyword))
        .filter(|c| matches_quick(c, quick))
        .map(|c| (created_at_millis(c.created_at.as_deref()), c))
        .collect();

    match criteria.sort_order {
        SortOrder::Asc => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
        SortOrder::Desc => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
    }

    keyed.into_iter().map(|(_, c)| c.clone()).collect()
}
