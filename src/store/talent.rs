// src/store/talent.rs
//! Candidate browser state: loaded page, criteria, derived view, selections

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::app_log;
use crate::core::StateMedium;
use crate::filter::{self, CandidateQuery, FilterCriteria, QuickFilters, SortOrder};
use crate::store::clock::Clock;
use crate::store::slice::{Persisted, PersistedSlice};
use crate::store::ViewMode;
use crate::tree::NavigationTree;
use crate::types::candidate::Candidate;
use crate::types::company::PositionScope;

pub const STORAGE_KEY: &str = "talent-storage";
pub const CACHE_KEY: &str = "talentStore";

const TOP_SKILLS: usize = 10;

/// Fields kept across restarts under `talent-storage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalentSnapshot {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub filters: FilterCriteria,
    pub current_page: u32,
    pub page_size: u32,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub selected_candidate_id: Option<i64>,
}

/// Short-lived cache under `talentStore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalentCache {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub filtered_candidates: Vec<Candidate>,
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_count: u64,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub scroll_position: u32,
    #[serde(default)]
    pub filters: FilterCriteria,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TalentState {
    pub candidates: Vec<Candidate>,
    pub filtered: Vec<Candidate>,
    pub filters: FilterCriteria,
    pub quick_filters: QuickFilters,
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub view_mode: ViewMode,
    pub scroll_position: u32,
    pub selected_candidate_id: Option<i64>,
    pub selected_ids: BTreeSet<i64>,
    pub selected_talent: Option<Candidate>,
}

impl TalentState {
    fn initial(page_size: u32) -> Self {
        Self {
            candidates: Vec::new(),
            filtered: Vec::new(),
            filters: FilterCriteria::default(),
            quick_filters: QuickFilters::default(),
            current_page: 1,
            page_size,
            total_pages: 1,
            total_count: 0,
            view_mode: ViewMode::Grid,
            scroll_position: 0,
            selected_candidate_id: None,
            selected_ids: BTreeSet::new(),
            selected_talent: None,
        }
    }

    fn refilter(&mut self) {
        self.filtered = filter::apply(&self.candidates, &self.filters, &self.quick_filters);
    }
}

impl Persisted<TalentSnapshot> for TalentState {
    fn snapshot(&self) -> TalentSnapshot {
        TalentSnapshot {
            candidates: self.candidates.clone(),
            filters: self.filters.clone(),
            current_page: self.current_page,
            page_size: self.page_size,
            view_mode: self.view_mode,
            selected_candidate_id: self.selected_candidate_id,
        }
    }

    fn restore(&mut self, snapshot: TalentSnapshot) {
        self.candidates = snapshot.candidates;
        self.filters = snapshot.filters;
        self.current_page = snapshot.current_page.max(1);
        self.page_size = snapshot.page_size.max(1);
        self.view_mode = snapshot.view_mode;
        self.selected_candidate_id = snapshot.selected_candidate_id;
        self.refilter();
    }
}

impl Persisted<TalentCache> for TalentState {
    fn snapshot(&self) -> TalentCache {
        TalentCache {
            candidates: self.candidates.clone(),
            filtered_candidates: self.filtered.clone(),
            current_page: self.current_page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            total_count: self.total_count,
            view_mode: self.view_mode,
            scroll_position: self.scroll_position,
            filters: self.filters.clone(),
        }
    }

    fn restore(&mut self, cache: TalentCache) {
        self.candidates = cache.candidates;
        self.current_page = cache.current_page.max(1);
        self.page_size = cache.page_size.max(1);
        self.total_pages = cache.total_pages;
        self.total_count = cache.total_count;
        self.view_mode = cache.view_mode;
        self.scroll_position = cache.scroll_position;
        self.filters = cache.filters;
        // The cached view is only a hint; derive it again from the collection.
        self.refilter();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TalentStats {
    pub total: usize,
    pub by_city: Vec<(String, usize)>,
    pub by_career_stage: Vec<(String, usize)>,
    pub top_skills: Vec<(String, usize)>,
}

fn ranked(counts: BTreeMap<String, usize>, limit: Option<usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    // BTreeMap order breaks ties alphabetically; sort_by is stable.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

fn bucket(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

pub struct TalentStore {
    state: TalentState,
    storage: PersistedSlice<TalentSnapshot>,
    cache: PersistedSlice<TalentCache>,
    cache_hit: bool,
}

impl TalentStore {
    /// Restore from `talent-storage`, then overlay a still-fresh `talentStore` cache
    pub async fn open(
        medium: StateMedium,
        clock: Arc<dyn Clock>,
        cache_ttl: Duration,
        page_size: u32,
    ) -> Self {
        let storage = PersistedSlice::new(STORAGE_KEY, medium.clone()).with_clock(clock.clone());
        let cache = PersistedSlice::new(CACHE_KEY, medium)
            .with_ttl(cache_ttl)
            .with_clock(clock);

        let mut store = Self {
            state: TalentState::initial(page_size.max(1)),
            storage,
            cache,
            cache_hit: false,
        };

        store.storage.load_into(&mut store.state).await;
        store.cache_hit = store.cache.load_into(&mut store.state).await;
        if store.cache_hit {
            app_log!(debug, "Talent cache restored ({} candidates)", store.state.candidates.len());
        }
        store
    }

    pub fn state(&self) -> &TalentState {
        &self.state
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.state.candidates
    }

    /// The derived view: never edited directly, recomputed on every change
    pub fn filtered(&self) -> &[Candidate] {
        &self.state.filtered
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.state.filters
    }

    pub fn query(&self) -> CandidateQuery {
        CandidateQuery::from_criteria(
            &self.state.filters,
            self.state.current_page,
            self.state.page_size,
        )
    }

    async fn persist(&self) {
        self.storage.save_state(&self.state).await;
        self.cache.save_state(&self.state).await;
    }

    /// The loaded page no longer answers the query: keep the query, drop the cache.
    async fn persist_query(&mut self) {
        self.storage.save_state(&self.state).await;
        if self.cache_hit {
            app_log!(debug, "Query changed, talent cache invalidated");
        }
        self.cache.clear().await;
        self.cache_hit = false;
    }

    pub async fn set_candidates(&mut self, candidates: Vec<Candidate>) {
        self.state.candidates = candidates;
        let known: BTreeSet<i64> = self.state.candidates.iter().map(|c| c.id).collect();
        self.state.selected_ids.retain(|id| known.contains(id));
        self.state.refilter();
        self.persist().await;
    }

    pub async fn set_page(&mut self, page: u32) {
        self.state.current_page = page.max(1);
        self.persist_query().await;
    }

    pub async fn set_page_size(&mut self, page_size: u32) {
        self.state.page_size = page_size.max(1);
        self.persist_query().await;
    }

    pub async fn set_pagination(&mut self, total_pages: u32, total_count: u64) {
        self.state.total_pages = total_pages.max(1);
        self.state.total_count = total_count;
        self.persist().await;
    }

    pub async fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.state.view_mode = view_mode;
        self.persist().await;
    }

    pub async fn set_scroll_position(&mut self, position: u32) {
        self.state.scroll_position = position;
        self.persist().await;
    }

    /// Any criteria change sends the list back to page 1
    pub async fn update_filters<F>(&mut self, update: F)
    where
        F: FnOnce(&mut FilterCriteria),
    {
        update(&mut self.state.filters);
        self.state.current_page = 1;
        self.state.refilter();
        self.persist_query().await;
    }

    pub async fn set_search_keyword(&mut self, keyword: impl Into<String>) {
        let keyword = keyword.into();
        self.update_filters(|f| f.search_keyword = keyword).await;
    }

    pub async fn set_sort_order(&mut self, sort_order: SortOrder) {
        self.update_filters(|f| f.sort_order = sort_order).await;
    }

    pub async fn set_selected_position(&mut self, scope: Option<PositionScope>) {
        self.update_filters(|f| f.selected_position = scope).await;
    }

    pub async fn reset_filters(&mut self) {
        self.state.quick_filters = QuickFilters::default();
        self.update_filters(|f| *f = FilterCriteria::default()).await;
    }

    /// Quick filters are session-only and never persisted
    pub fn set_quick_filters(&mut self, quick: QuickFilters) {
        self.state.quick_filters = quick;
        self.state.refilter();
    }

    pub fn clear_quick_filters(&mut self) {
        self.set_quick_filters(QuickFilters::default());
    }

    pub async fn add_candidate(&mut self, candidate: Candidate) {
        self.state.candidates.push(candidate);
        self.state.refilter();
        self.persist().await;
    }

    /// Shallow-merge `updates` into the candidate with `id`. Returns whether it
    /// was found and the merged record was still a valid candidate.
    pub async fn update_candidate(&mut self, id: i64, updates: Map<String, Value>) -> bool {
        let Some(slot) = self.state.candidates.iter_mut().find(|c| c.id == id) else {
            return false;
        };

        let mut merged = match serde_json::to_value(&*slot) {
            Ok(Value::Object(map)) => map,
            _ => return false,
        };
        merged.extend(updates);
        merged.insert("id".to_string(), Value::from(id));

        match serde_json::from_value::<Candidate>(Value::Object(merged)) {
            Ok(updated) => *slot = updated,
            Err(e) => {
                app_log!(warn, "Ignoring invalid update for candidate {}: {}", id, e);
                return false;
            }
        }

        self.state.refilter();
        self.persist().await;
        true
    }

    /// Drop a candidate from the collection, the derived view and every selection
    pub async fn remove_candidate(&mut self, id: i64) {
        self.state.candidates.retain(|c| c.id != id);
        self.state.selected_ids.remove(&id);
        if self.state.selected_candidate_id == Some(id) {
            self.state.selected_candidate_id = None;
        }
        if self.state.selected_talent.as_ref().map(|c| c.id) == Some(id) {
            self.state.selected_talent = None;
        }
        self.state.refilter();
        self.persist().await;
    }

    pub async fn select_candidate(&mut self, id: Option<i64>) {
        self.state.selected_candidate_id = id;
        self.persist().await;
    }

    pub fn set_selected_talent(&mut self, candidate: Option<Candidate>) {
        self.state.selected_talent = candidate;
    }

    pub fn selected_talent(&self) -> Option<&Candidate> {
        self.state.selected_talent.as_ref()
    }

    /// Batch selection; returns whether `id` is selected afterwards
    pub fn toggle_selected(&mut self, id: i64) -> bool {
        if self.state.selected_ids.remove(&id) {
            false
        } else {
            self.state.selected_ids.insert(id);
            true
        }
    }

    pub fn select_all_visible(&mut self) {
        self.state.selected_ids = self.state.filtered.iter().map(|c| c.id).collect();
    }

    pub fn clear_selected(&mut self) {
        self.state.selected_ids.clear();
    }

    pub fn selected_ids(&self) -> Vec<i64> {
        self.state.selected_ids.iter().copied().collect()
    }

    pub async fn reset_all(&mut self) {
        let page_size = self.state.page_size;
        self.state = TalentState::initial(page_size);
        self.persist().await;
    }

    /// Forget the short-lived cache and start over in memory
    pub async fn clear_cache(&mut self) {
        self.cache.clear().await;
        self.cache_hit = false;
        self.state = TalentState::initial(self.state.page_size);
    }

    /// True while the page restored from a fresh cache still answers the
    /// current query, so a caller may skip the fetch.
    pub fn served_from_cache(&self) -> bool {
        self.cache_hit
    }

    /// Follow the tree's selection. A scope whose position was deleted or
    /// never resolved is dropped, which puts the list back in global mode.
    pub async fn sync_scope(&mut self, tree: &NavigationTree) -> bool {
        if self.state.filters.selected_position.as_ref() == tree.selection() {
            return false;
        }
        if let Some(stale) = &self.state.filters.selected_position {
            app_log!(info, "Candidate scope {} follows the tree", stale.label());
        }
        self.set_selected_position(tree.selection().cloned()).await;
        true
    }

    pub fn stats(&self) -> TalentStats {
        let mut cities = BTreeMap::new();
        let mut stages = BTreeMap::new();
        let mut skills = BTreeMap::new();

        for c in &self.state.candidates {
            *cities.entry(bucket(&c.current_city)).or_insert(0) += 1;
            *stages.entry(bucket(&c.career_stage)).or_insert(0) += 1;
            let distinct: BTreeSet<String> = c
                .skills
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            for skill in distinct {
                *skills.entry(skill).or_insert(0) += 1;
            }
        }

        TalentStats {
            total: self.state.candidates.len(),
            by_city: ranked(cities, None),
            by_career_stage: ranked(stages, None),
            top_skills: ranked(skills, Some(TOP_SKILLS)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::clock::ManualClock;
    use serde_json::json;

    fn candidate(id: i64, name: &str, city: &str, created_at: &str) -> Candidate {
        serde_json::from_value(json!({
            "id": id,
            "english_name": name,
            "current_city": city,
            "skills": ["Rust"],
            "created_at": created_at
        }))
        .unwrap()
    }

    fn sample() -> Vec<Candidate> {
        vec![
            candidate(1, "Ann", "Shanghai", "2024-01-01T00:00:00Z"),
            candidate(2, "Ben", "Beijing", "2024-02-01T00:00:00Z"),
            candidate(3, "Cat", "Shanghai", "2024-03-01T00:00:00Z"),
        ]
    }

    async fn open(medium: &StateMedium, clock: Arc<ManualClock>) -> TalentStore {
        TalentStore::open(medium.clone(), clock, Duration::minutes(30), 20).await
    }

    #[tokio::test]
    async fn test_filter_change_resets_page_and_rederives_view() {
        let medium = StateMedium::memory();
        let mut store = open(&medium, Arc::new(ManualClock::at(0))).await;
        store.set_candidates(sample()).await;
        store.set_page(3).await;

        store.set_search_keyword("shanghai").await;
        assert_eq!(store.state().current_page, 1);
        let ids: Vec<i64> = store.filtered().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_remove_candidate_purges_everywhere() {
        let medium = StateMedium::memory();
        let mut store = open(&medium, Arc::new(ManualClock::at(0))).await;
        store.set_candidates(sample()).await;
        store.select_candidate(Some(2)).await;
        store.toggle_selected(2);
        store.toggle_selected(3);

        store.remove_candidate(2).await;
        assert!(store.candidates().iter().all(|c| c.id != 2));
        assert!(store.filtered().iter().all(|c| c.id != 2));
        assert_eq!(store.selected_ids(), vec![3]);
        assert_eq!(store.state().selected_candidate_id, None);
    }

    #[tokio::test]
    async fn test_restart_restores_whitelisted_fields_only() {
        let medium = StateMedium::memory();
        let clock = Arc::new(ManualClock::at(0));
        {
            let mut store = open(&medium, clock.clone()).await;
            store.set_candidates(sample()).await;
            store.set_view_mode(ViewMode::List).await;
            store.select_candidate(Some(1)).await;
            store.toggle_selected(1);
            store.set_quick_filters(QuickFilters {
                city: "beijing".into(),
                ..Default::default()
            });
        }

        let store = open(&medium, clock).await;
        assert_eq!(store.candidates().len(), 3);
        assert_eq!(store.filtered().len(), 3);
        assert_eq!(store.state().view_mode, ViewMode::List);
        assert_eq!(store.state().selected_candidate_id, Some(1));
        assert!(store.selected_ids().is_empty());
        assert!(store.state().quick_filters.is_empty());
    }

    #[tokio::test]
    async fn test_cache_expires_but_storage_survives() {
        let medium = StateMedium::memory();
        let clock = Arc::new(ManualClock::at(0));
        {
            let mut store = open(&medium, clock.clone()).await;
            store.set_candidates(sample()).await;
            store.set_pagination(4, 77).await;
        }

        clock.advance(Duration::minutes(31));
        let store = open(&medium, clock).await;
        assert_eq!(medium.get(CACHE_KEY).await.unwrap(), None);
        // total_count lives only in the expired cache
        assert_eq!(store.state().total_count, 0);
        assert_eq!(store.candidates().len(), 3);
    }

    #[tokio::test]
    async fn test_page_change_never_revives_expired_cache() {
        let medium = StateMedium::memory();
        let clock = Arc::new(ManualClock::at(0));
        {
            let mut store = open(&medium, clock.clone()).await;
            store.set_candidates(vec![candidate(1, "Ann", "Shanghai", "2024-01-01T00:00:00Z")]).await;
        }

        clock.advance(Duration::minutes(31));
        let mut store = open(&medium, clock.clone()).await;
        assert!(!store.served_from_cache());
        store.set_page(2).await;

        assert!(!store.served_from_cache());
        assert_eq!(store.state().current_page, 2);
        assert_eq!(medium.get(CACHE_KEY).await.unwrap(), None);

        // the next process still has to fetch page 2
        let store = open(&medium, clock).await;
        assert!(!store.served_from_cache());
        assert_eq!(store.state().current_page, 2);
    }

    #[tokio::test]
    async fn test_query_change_invalidates_fresh_cache() {
        let medium = StateMedium::memory();
        let clock = Arc::new(ManualClock::at(0));
        {
            let mut store = open(&medium, clock.clone()).await;
            store.set_candidates(sample()).await;
            store.set_pagination(2, 40).await;
        }

        clock.advance(Duration::minutes(10));
        let mut store = open(&medium, clock).await;
        assert!(store.served_from_cache());
        assert_eq!(store.state().total_count, 40);

        store.set_search_keyword("ann").await;
        assert!(!store.served_from_cache());
        assert_eq!(medium.get(CACHE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sync_scope_follows_tree_selection() {
        let medium = StateMedium::memory();
        let mut store = open(&medium, Arc::new(ManualClock::at(0))).await;
        let mut tree = NavigationTree::new();
        tree.replace_companies(
            serde_json::from_value(json!([
                {"id": 1, "name": "Acme", "projects": [
                    {"id": 10, "name": "Infra", "positions": [{"id": 100, "name": "SRE"}]}
                ]}
            ]))
            .unwrap(),
        );

        let scope = tree.select_position(100).unwrap();
        store.set_selected_position(Some(scope)).await;
        store.set_page(4).await;
        assert!(!store.sync_scope(&tree).await);
        assert_eq!(store.state().current_page, 4);

        tree.replace_companies(Vec::new());
        assert!(store.sync_scope(&tree).await);
        assert_eq!(store.filters().selected_position, None);
        assert_eq!(store.state().current_page, 1);
        assert!(matches!(store.query(), CandidateQuery::Global { .. }));
    }

    #[tokio::test]
    async fn test_update_candidate_merges_fields() {
        let medium = StateMedium::memory();
        let mut store = open(&medium, Arc::new(ManualClock::at(0))).await;
        store.set_candidates(sample()).await;

        let mut updates = Map::new();
        updates.insert("current_city".into(), json!("Shenzhen"));
        assert!(store.update_candidate(1, updates).await);
        assert!(!store.update_candidate(99, Map::new()).await);

        let updated = store.candidates().iter().find(|c| c.id == 1).unwrap();
        assert_eq!(updated.current_city.as_deref(), Some("Shenzhen"));
        assert_eq!(updated.english_name.as_deref(), Some("Ann"));
    }

    #[tokio::test]
    async fn test_stats() {
        let medium = StateMedium::memory();
        let mut store = open(&medium, Arc::new(ManualClock::at(0))).await;
        store.set_candidates(sample()).await;

        let stats = store.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_city[0], ("Shanghai".to_string(), 2));
        assert_eq!(stats.by_career_stage, vec![("unknown".to_string(), 3)]);
        assert_eq!(stats.top_skills, vec![("Rust".to_string(), 3)]);
    }
}
