// src/types/analysis.rs
//! Job-description analysis payloads delivered over the event stream

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::types::{lenient_list, string_or_number};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keywords {
    #[serde(default, deserialize_with = "lenient_list")]
    pub position: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub industry: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub company: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub product: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub skill: Vec<String>,
}

impl Keywords {
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
            && self.industry.is_empty()
            && self.company.is_empty()
            && self.product.is_empty()
            && self.skill.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "string_or_number")]
    pub job_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub products: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub companies: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub industry: Vec<String>,
    #[serde(default)]
    pub keywords: Option<Keywords>,
    #[serde(default)]
    pub tagging_dict: Option<Value>,
    #[serde(default)]
    pub mermaid_code: Option<String>,
    #[serde(default)]
    pub diagram_url: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl AnalysisResult {
    /// Shallow merge in order; a key present in a later part replaces the
    /// earlier value wholesale.
    pub fn merge<I>(parts: I) -> Result<Self, serde_json::Error>
    where
        I: IntoIterator<Item = Map<String, Value>>,
    {
        let mut merged = Map::new();
        for part in parts {
            merged.extend(part);
        }
        serde_json::from_value(Value::Object(merged))
    }
}

/// One decoded event body, with the wrapping decided once here.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `{request_id, payload: {...}}`
    Wrapped {
        request_id: Option<String>,
        body: Map<String, Value>,
    },
    /// The analysis fields sit at top level next to `request_id`
    Raw {
        request_id: Option<String>,
        body: Map<String, Value>,
    },
}

impl Envelope {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut object: Map<String, Value> = serde_json::from_str(text)?;
        let request_id = match object.remove("request_id") {
            Some(Value::String(id)) => Some(id),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };

        match object.remove("payload") {
            Some(Value::Object(body)) => Ok(Envelope::Wrapped { request_id, body }),
            Some(Value::Null) | None => Ok(Envelope::Raw {
                request_id,
                body: object,
            }),
            Some(other) => {
                object.insert("payload".to_string(), other);
                Ok(Envelope::Raw {
                    request_id,
                    body: object,
                })
            }
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            Envelope::Wrapped { request_id, .. } | Envelope::Raw { request_id, .. } => {
                request_id.as_deref()
            }
        }
    }

    pub fn into_body(self) -> Map<String, Value> {
        match self {
            Envelope::Wrapped { body, .. } | Envelope::Raw { body, .. } => body,
        }
    }
}
