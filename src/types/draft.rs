// src/types/draft.rs
//! Draft resumes produced by the AI parser, awaiting human review

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ApiError, ApiResult};
use crate::types::{lenient_list, null_as_default, string_or_number};

/// A record whose fields can be edited by name.
pub trait EditableRecord: Serialize + DeserializeOwned {
    const FIELDS: &'static [&'static str];

    fn set_field(&mut self, field: &str, value: Value) -> ApiResult<()> {
        if !Self::FIELDS.contains(&field) {
            return Err(ApiError::validation(format!(
                "unknown field '{}', expected one of: {}",
                field,
                Self::FIELDS.join(", ")
            )));
        }

        let mut object = match serde_json::to_value(&*self) {
            Ok(Value::Object(object)) => object,
            Ok(_) => Map::new(),
            Err(e) => return Err(ApiError::decode(field, e)),
        };
        object.insert(field.to_string(), value);

        *self = serde_json::from_value(Value::Object(object))
            .map_err(|e| ApiError::validation(format!("bad value for '{}': {}", field, e)))?;
        Ok(())
    }
}

macro_rules! editable_record {
    (
        $(#[$meta:meta])*
        $name:ident {
            text: [$($text:ident),* $(,)?],
            list: [$($list:ident),* $(,)?],
            loose: [$($loose:ident),* $(,)?] $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $(
                #[serde(default, deserialize_with = "string_or_number")]
                pub $text: Option<String>,
            )*
            $(
                #[serde(default, deserialize_with = "lenient_list")]
                pub $list: Vec<String>,
            )*
            $(
                #[serde(default)]
                pub $loose: Option<Value>,
            )*
            #[serde(flatten)]
            pub extra: BTreeMap<String, Value>,
        }

        impl EditableRecord for $name {
            const FIELDS: &'static [&'static str] = &[
                $(stringify!($text),)*
                $(stringify!($list),)*
                $(stringify!($loose),)*
            ];
        }
    };
}

editable_record! {
    BasicInfo {
        text: [
            chinese_name, english_name, gender, birth_date, native_place, current_city,
            political_status, marital_status, health, personality, avatar_url, phone,
            email, wechat, contact_time_preference, resume_number,
        ],
        list: [],
        loose: [height_cm, weight_kg],
    }
}

editable_record! {
    Expectations {
        text: [
            position, company_nature, company_size, company_stage, job_search_status,
            additional_conditions,
        ],
        list: [cities, industries],
        loose: [salary_monthly, salary_yearly, location_range_km],
    }
}

editable_record! {
    Summary {
        text: [],
        list: [roles, industries, skills, languages, awards],
        loose: [total_years],
    }
}

editable_record! {
    AiAnalysis {
        text: [profile, career_stage, personality],
        list: [],
        loose: [swot],
    }
}

editable_record! {
    WorkExperience {
        text: [
            company_name, company_intro, company_size, company_type, company_stage,
            company_location, position, department, start_date, end_date, current_status,
            report_to, job_description,
        ],
        list: [job_details, achievements],
        loose: [subordinates],
    }
}

editable_record! {
    EducationExperience {
        text: [school, degree, major, start_date, end_date, ranking],
        list: [main_courses, certificates],
        loose: [],
    }
}

editable_record! {
    ProjectExperience {
        text: [project_name, role, start_date, end_date, project_intro, project_achievements],
        list: [],
        loose: [],
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DraftStatus {
    Pending,
    Confirmed,
    Other(String),
}

impl From<String> for DraftStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => DraftStatus::Pending,
            "confirmed" => DraftStatus::Confirmed,
            _ => DraftStatus::Other(value),
        }
    }
}

impl From<DraftStatus> for String {
    fn from(status: DraftStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftStatus::Pending => f.write_str("pending"),
            DraftStatus::Confirmed => f.write_str("confirmed"),
            DraftStatus::Other(other) => f.write_str(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftResume {
    pub id: i64,
    #[serde(default, alias = "status")]
    pub draft_status: Option<DraftStatus>,
    #[serde(default, alias = "original_filename")]
    pub file_name: Option<String>,
    #[serde(default)]
    pub position_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub basic_info: BasicInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expectations: Expectations,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: Summary,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ai_analysis: AiAnalysis,
    #[serde(default, deserialize_with = "null_as_default")]
    pub work_experiences: Vec<WorkExperience>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education_experiences: Vec<EducationExperience>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_experiences: Vec<ProjectExperience>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftSection {
    BasicInfo,
    Expectations,
    Summary,
    AiAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceList {
    Work,
    Education,
    Project,
}

impl FromStr for DraftSection {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic_info" => Ok(DraftSection::BasicInfo),
            "expectations" => Ok(DraftSection::Expectations),
            "summary" => Ok(DraftSection::Summary),
            "ai_analysis" => Ok(DraftSection::AiAnalysis),
            other => Err(ApiError::validation(format!("unknown section '{}'", other))),
        }
    }
}

impl FromStr for ExperienceList {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work_experiences" => Ok(ExperienceList::Work),
            "education_experiences" => Ok(ExperienceList::Education),
            "project_experiences" => Ok(ExperienceList::Project),
            other => Err(ApiError::validation(format!("unknown list '{}'", other))),
        }
    }
}

/// Address of an editable value: `basic_info.chinese_name` or
/// `work_experiences[0].position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftFieldPath {
    Section {
        section: DraftSection,
        field: String,
    },
    Item {
        list: ExperienceList,
        index: usize,
        field: String,
    },
}

impl FromStr for DraftFieldPath {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, field) = s
            .split_once('.')
            .ok_or_else(|| ApiError::validation(format!("expected <section>.<field>, got '{}'", s)))?;
        if field.is_empty() {
            return Err(ApiError::validation(format!("missing field name in '{}'", s)));
        }

        match head.split_once('[') {
            Some((list, rest)) => {
                let index = rest
                    .strip_suffix(']')
                    .and_then(|i| i.parse::<usize>().ok())
                    .ok_or_else(|| ApiError::validation(format!("bad index in '{}'", s)))?;
                Ok(DraftFieldPath::Item {
                    list: list.parse()?,
                    index,
                    field: field.to_string(),
                })
            }
            None => Ok(DraftFieldPath::Section {
                section: head.parse()?,
                field: field.to_string(),
            }),
        }
    }
}

fn patch_list_item<R: EditableRecord>(
    items: &mut [R],
    index: usize,
    field: &str,
    value: Value,
) -> ApiResult<()> {
    let len = items.len();
    let item = items.get_mut(index).ok_or_else(|| {
        ApiError::validation(format!("index {} out of range ({} entries)", index, len))
    })?;
    item.set_field(field, value)
}

impl DraftResume {
    pub fn is_pending(&self) -> bool {
        matches!(self.draft_status, Some(DraftStatus::Pending))
    }

    /// Set one field of a section, rejecting names the section does not have
    pub fn patch(&mut self, section: DraftSection, field: &str, value: Value) -> ApiResult<()> {
        match section {
            DraftSection::BasicInfo => self.basic_info.set_field(field, value),
            DraftSection::Expectations => self.expectations.set_field(field, value),
            DraftSection::Summary => self.summary.set_field(field, value),
            DraftSection::AiAnalysis => self.ai_analysis.set_field(field, value),
        }
    }

    pub fn patch_item(
        &mut self,
        list: ExperienceList,
        index: usize,
        field: &str,
        value: Value,
    ) -> ApiResult<()> {
        match list {
            ExperienceList::Work => patch_list_item(&mut self.work_experiences, index, field, value),
            ExperienceList::Education => {
                patch_list_item(&mut self.education_experiences, index, field, value)
            }
            ExperienceList::Project => {
                patch_list_item(&mut self.project_experiences, index, field, value)
            }
        }
    }

    pub fn apply(&mut self, path: &DraftFieldPath, value: Value) -> ApiResult<()> {
        match path {
            DraftFieldPath::Section { section, field } => self.patch(*section, field, value),
            DraftFieldPath::Item { list, index, field } => {
                self.patch_item(*list, *index, field, value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DraftResume {
        serde_json::from_value(json!({
            "id": 11,
            "status": "pending",
            "basic_info": {"chinese_name": "李四", "phone": 13800000000u64, "height_cm": 180},
            "summary": {"skills": "Rust, Go", "total_years": 6},
            "ai_analysis": null,
            "work_experiences": [{"company_name": "Acme", "achievements": ["shipped"]}],
            "parser_version": "k2"
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_tolerates_loose_types() {
        let draft = sample();
        assert!(draft.is_pending());
        assert_eq!(draft.basic_info.phone.as_deref(), Some("13800000000"));
        assert_eq!(draft.summary.skills, vec!["Rust", "Go"]);
        assert_eq!(draft.ai_analysis, AiAnalysis::default());
        assert_eq!(draft.extra["parser_version"], "k2");
    }

    #[test]
    fn test_patch_section_field() {
        let mut draft = sample();
        draft
            .patch(DraftSection::BasicInfo, "chinese_name", json!("张三"))
            .unwrap();
        assert_eq!(draft.basic_info.chinese_name.as_deref(), Some("张三"));
        assert_eq!(draft.basic_info.height_cm, Some(json!(180)));
    }

    #[test]
    fn test_patch_rejects_unknown_field() {
        let mut draft = sample();
        let err = draft
            .patch(DraftSection::Summary, "chinese_name", json!("x"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(draft, sample());
    }

    #[test]
    fn test_patch_list_field_from_comma_text() {
        let mut draft = sample();
        draft
            .patch(DraftSection::Expectations, "cities", json!("Shanghai, Hangzhou"))
            .unwrap();
        assert_eq!(draft.expectations.cities, vec!["Shanghai", "Hangzhou"]);
    }

    #[test]
    fn test_patch_item_bounds() {
        let mut draft = sample();
        draft
            .patch_item(ExperienceList::Work, 0, "position", json!("CTO"))
            .unwrap();
        assert_eq!(draft.work_experiences[0].position.as_deref(), Some("CTO"));
        assert_eq!(draft.work_experiences[0].achievements, vec!["shipped"]);

        assert!(draft
            .patch_item(ExperienceList::Work, 3, "position", json!("CTO"))
            .is_err());
    }

    #[test]
    fn test_field_path_parsing() {
        assert_eq!(
            "basic_info.chinese_name".parse::<DraftFieldPath>().unwrap(),
            DraftFieldPath::Section {
                section: DraftSection::BasicInfo,
                field: "chinese_name".into()
            }
        );
        assert_eq!(
            "education_experiences[2].school"
                .parse::<DraftFieldPath>()
                .unwrap(),
            DraftFieldPath::Item {
                list: ExperienceList::Education,
                index: 2,
                field: "school".into()
            }
        );
        assert!("basic_info".parse::<DraftFieldPath>().is_err());
        assert!("work_experiences[x].position".parse::<DraftFieldPath>().is_err());
        assert!("hobbies.name".parse::<DraftFieldPath>().is_err());
    }

    #[test]
    fn test_status_round_trips_unknown_values() {
        let status: DraftStatus = serde_json::from_value(json!("archived")).unwrap();
        assert_eq!(status, DraftStatus::Other("archived".into()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("archived"));
    }
}
