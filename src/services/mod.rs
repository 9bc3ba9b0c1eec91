// src/services/mod.rs
//! Feature services: each wraps the gateway for one area of the backend

pub mod company;
pub mod drafts;
pub mod oss;
pub mod smart_search;
pub mod talent;

pub use company::{CompanyService, Entity};
pub use drafts::{DraftListQuery, DraftPage, DraftService};
pub use oss::OssService;
pub use smart_search::{KeywordScheme, SmartSearchService};
pub use talent::{AddSummary, BatchDeleteOutcome, CandidatePage, TalentService};
