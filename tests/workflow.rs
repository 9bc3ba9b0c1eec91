mod common;

use serde_json::json;
use std::io::Write;
use std::sync::Arc;

use common::{candidate, FakeBackend};
use talent_client::services::{CompanyService, DraftListQuery, DraftService, Entity, TalentService};
use talent_client::store::{ManualClock, TalentStore};
use talent_client::tree::NavigationTree;
use talent_client::types::draft::DraftStatus;
use talent_client::StateMedium;

async fn talent_store(medium: &StateMedium) -> TalentStore {
    TalentStore::open(
        medium.clone(),
        Arc::new(ManualClock::at(1_700_000_000_000)),
        chrono::Duration::minutes(30),
        20,
    )
    .await
}

#[tokio::test]
async fn test_position_scope_and_global_list_never_mix() {
    let backend = FakeBackend::start().await;
    backend.set_candidates(vec![candidate(1, "张三", "2024-01-01T00:00:00Z")]);
    let medium = StateMedium::memory();
    let client = backend.logged_in_client(&medium).await;

    let mut tree = NavigationTree::new();
    CompanyService::new(client.clone())
        .refresh(&mut tree)
        .await
        .unwrap();

    let service = TalentService::new(client);
    let mut store = talent_store(&medium).await;
    store.set_page(3).await;

    let scope = tree.select_position(100).unwrap();
    store.set_selected_position(Some(scope)).await;
    service.refresh(&mut store).await.unwrap();

    let scoped = backend.requests_to("/positions/100/candidates");
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].query, None);
    assert!(backend.requests_to("/resume/list").is_empty());

    tree.clear_selection();
    store.set_selected_position(None).await;
    assert_eq!(store.state().current_page, 1);
    service.refresh(&mut store).await.unwrap();

    let global = backend.requests_to("/resume/list");
    assert_eq!(global.len(), 1);
    let query = global[0].query.clone().unwrap();
    assert!(query.contains("page=1"), "query was {}", query);
    assert!(query.contains("page_size=20"));
    assert!(query.contains("sort_order=desc"));
    assert!(!query.contains("search="));
}

#[tokio::test]
async fn test_upload_review_confirm_reaches_candidate_list() {
    let backend = FakeBackend::start().await;
    let medium = StateMedium::memory();
    let client = backend.logged_in_client(&medium).await;
    let drafts = DraftService::new(client.clone());

    let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    file.write_all(b"%PDF-1.4 resume").unwrap();

    let id = drafts.upload(file.path(), Some(100)).await.unwrap();
    let draft = drafts.get(id).await.unwrap();
    assert!(draft.is_pending());
    assert_eq!(draft.position_id, Some(100));

    let path = "basic_info.chinese_name".parse().unwrap();
    drafts.patch(id, &path, json!("张三")).await.unwrap();

    let draft = drafts.get(id).await.unwrap();
    assert_eq!(draft.basic_info.chinese_name.as_deref(), Some("张三"));
    assert_eq!(draft.basic_info.phone.as_deref(), Some("13800000000"));
    assert_eq!(draft.work_experiences[0].position.as_deref(), Some("Engineer"));

    let list = DraftListQuery::default();
    let page = drafts.confirm(id, &list).await.unwrap();
    assert_eq!(page.drafts[0].draft_status, Some(DraftStatus::Confirmed));
    assert_eq!(backend.requests_to("/resume/draft/list").len(), 1);

    let mut store = talent_store(&medium).await;
    TalentService::new(client).refresh(&mut store).await.unwrap();
    assert!(store
        .filtered()
        .iter()
        .any(|c| c.chinese_name.as_deref() == Some("张三")));
}

#[tokio::test]
async fn test_non_resume_upload_is_blocked_locally() {
    let backend = FakeBackend::start().await;
    let medium = StateMedium::memory();
    let drafts = DraftService::new(backend.logged_in_client(&medium).await);

    let mut file = tempfile::Builder::new().suffix(".exe").tempfile().unwrap();
    file.write_all(b"MZ").unwrap();

    let err = drafts.upload(file.path(), None).await.unwrap_err();
    assert!(matches!(err, talent_client::ApiError::Validation(_)));
    assert!(backend.state.lock().unwrap().drafts.is_empty());
}

#[tokio::test]
async fn test_deleted_company_drops_candidate_scope() {
    let backend = FakeBackend::start().await;
    backend.set_candidates(vec![candidate(1, "张三", "2024-01-01T00:00:00Z")]);
    let medium = StateMedium::memory();
    let client = backend.logged_in_client(&medium).await;
    let companies = CompanyService::new(client.clone());
    let service = TalentService::new(client);

    let mut tree = NavigationTree::new();
    companies.refresh(&mut tree).await.unwrap();
    let mut store = talent_store(&medium).await;
    store.set_selected_position(tree.select_position(200)).await;
    assert!(!store.sync_scope(&tree).await);

    companies.delete(&mut tree, Entity::Company, 2).await.unwrap();
    assert!(store.sync_scope(&tree).await);
    assert_eq!(store.filters().selected_position, None);

    service.refresh(&mut store).await.unwrap();
    assert!(backend.requests_to("/positions/200/candidates").is_empty());
    let global = backend.requests_to("/resume/list");
    assert_eq!(global.len(), 1);
    assert!(global[0].query.as_deref().unwrap().contains("page=1"));
    assert_eq!(store.candidates().len(), 1);
}
