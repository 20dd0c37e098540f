//! End-to-end behaviour of the users table against a mock API.

mod common;

use std::time::Duration;

use common::{TestContext, settle, user_json};
use roster_business::entities::{self, User};
use roster_business::resource::{EditPhase, SelectOption};
use roster_business::{AuthEvent, NotificationLevel, RowState};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn first_page_renders_rows() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("page", "1"))
        .and(query_param("size", "10"))
        .and(header(
            "authorization",
            format!("Bearer {}", ctx.auth.token().unwrap()).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [user_json(1, "alice")],
            "total": 1, "page": 1, "size": 10, "pages": 1
        })))
        .expect(1)
        .mount(&ctx.mock_server)
        .await;

    let mut users = entities::users(&ctx.client);
    users.load_page("", 1).unwrap();
    settle(&mut users).await;

    assert_eq!(users.items().len(), 1);
    assert_eq!(users.items()[0].username, "alice");
    assert_eq!(users.page().page, 1);
    assert_eq!(users.page().total_pages, 1);
    assert_eq!(users.empty_message(), None);
    assert_eq!(users.error(), None);
}

#[tokio::test]
async fn empty_collection_shows_placeholder() {
    let ctx = TestContext::new().await;
    ctx.mock_list("users", vec![], 0).await;

    let mut users = entities::users(&ctx.client);
    users.load_page("", 1).unwrap();
    settle(&mut users).await;

    assert_eq!(users.empty_message().as_deref(), Some("No users to display"));
}

#[tokio::test]
async fn delete_refetches_the_page() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::page_body(
            vec![user_json(3, "carol"), user_json(7, "gus")],
            2,
        )))
        .up_to_n_times(1)
        .mount(&ctx.mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/users/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&ctx.mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::page_body(vec![user_json(3, "carol")], 1)),
        )
        .mount(&ctx.mock_server)
        .await;

    let mut users = entities::users(&ctx.client);
    users.load_page("", 1).unwrap();
    settle(&mut users).await;
    assert_eq!(users.items().len(), 2);

    users.request_delete(7).unwrap();
    users.confirm_delete(7).unwrap();
    // Nothing changes until the server has answered and the page is re-fetched.
    assert_eq!(users.items().len(), 2);
    settle(&mut users).await;

    assert!(users.items().iter().all(|user| user.id != 7));
    assert_eq!(users.page().total_count, 1);
    assert!(users.pending_delete().is_none());
    let notes = users.take_notifications();
    assert!(notes.iter().any(|note| note.level == NotificationLevel::Success));
}

#[tokio::test]
async fn rejected_save_keeps_editor_open() {
    let ctx = TestContext::new().await;
    ctx.mock_list("users", vec![user_json(1, "alice")], 1).await;
    ctx.mock_list("roles", vec![json!({"id": 2, "name": "manager"})], 1)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/workers/unassigned"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&ctx.mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/users/1"))
        .and(body_json(json!({"username": "bob"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "username taken"})))
        .expect(1)
        .mount(&ctx.mock_server)
        .await;

    let mut users = entities::users(&ctx.client);
    users.load_page("", 1).unwrap();
    settle(&mut users).await;

    users.begin_edit(1).unwrap();
    users.update_field("username", json!("bob")).unwrap();
    users.commit_edit().unwrap();
    settle(&mut users).await;

    let session = users.edit_session().expect("editor still open");
    assert_eq!(session.phase(), EditPhase::Editing);
    assert_eq!(session.working_copy().username, "bob");
    assert_eq!(session.last_error(), Some("username taken"));
    assert_eq!(users.row_state(1), RowState::Editing);
    assert_eq!(users.items()[0].username, "alice");

    let notes = users.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert_eq!(notes[0].message, "username taken");
}

#[tokio::test]
async fn successful_save_merges_in_place() {
    let ctx = TestContext::new().await;
    ctx.mock_list(
        "users",
        vec![user_json(1, "alice"), user_json(2, "bob"), user_json(3, "carol")],
        3,
    )
    .await;
    ctx.mock_list("roles", vec![], 0).await;
    Mock::given(method("GET"))
        .and(path("/api/workers/unassigned"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&ctx.mock_server)
        .await;
    let mut updated = user_json(2, "robert");
    updated["role_name"] = json!("manager");
    Mock::given(method("PUT"))
        .and(path("/api/users/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": updated})))
        .mount(&ctx.mock_server)
        .await;

    let mut users = entities::users(&ctx.client);
    users.load_page("", 1).unwrap();
    settle(&mut users).await;

    users.begin_edit(2).unwrap();
    users.update_field("username", json!("robert")).unwrap();
    users.commit_edit().unwrap();
    settle(&mut users).await;

    let names: Vec<&str> = users.items().iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "robert", "carol"]);
    assert!(users.edit_session().is_none());
}

#[tokio::test]
async fn edit_dropdown_offers_currently_assigned_worker() {
    let ctx = TestContext::new().await;
    let mut alice = user_json(1, "alice");
    alice["worker_id"] = json!(42);
    alice["worker_name"] = json!("Jan Kowalski");
    ctx.mock_list("users", vec![alice], 1).await;
    ctx.mock_list("roles", vec![json!({"id": 2, "name": "manager"})], 1)
        .await;
    // The endpoint leaves assigned workers out even when asked to include one.
    Mock::given(method("GET"))
        .and(path("/api/workers/unassigned"))
        .and(query_param("include_id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "first_name": "Anna", "last_name": "Nowak"}
        ])))
        .expect(1)
        .mount(&ctx.mock_server)
        .await;

    let mut users = entities::users(&ctx.client);
    users.load_page("", 1).unwrap();
    settle(&mut users).await;

    users.begin_edit(1).unwrap();
    assert!(users.options("workers").unwrap().loading);
    settle(&mut users).await;

    let workers = users.options("workers").unwrap();
    assert!(!workers.loading);
    assert_eq!(workers.scope_id, Some(42));
    assert_eq!(
        workers.options,
        vec![
            SelectOption::new(42, "Jan Kowalski"),
            SelectOption::new(7, "Anna Nowak")
        ]
    );

    users.update_field("worker_id", json!(42)).unwrap();
    assert!(users.edit_session().unwrap().changed_fields().is_empty());
    users.update_field("worker_id", json!(7)).unwrap();
    assert_eq!(
        users.edit_session().unwrap().changed_fields().get("worker_id"),
        Some(&json!(7))
    );
}

#[tokio::test]
async fn create_form_keeps_the_edited_rows_worker() {
    let ctx = TestContext::new().await;
    let mut alice = user_json(1, "alice");
    alice["worker_id"] = json!(42);
    alice["worker_name"] = json!("Jan Kowalski");
    ctx.mock_list("users", vec![alice], 1).await;
    ctx.mock_list("roles", vec![json!({"id": 2, "name": "manager"})], 1)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/workers/unassigned"))
        .and(query_param("include_id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "first_name": "Anna", "last_name": "Nowak"}
        ])))
        .expect(2)
        .mount(&ctx.mock_server)
        .await;

    let mut users = entities::users(&ctx.client);
    users.load_page("", 1).unwrap();
    settle(&mut users).await;
    users.begin_edit(1).unwrap();
    settle(&mut users).await;
    assert!(users.options("workers").unwrap().contains(42));

    users.open_create_form().unwrap();
    settle(&mut users).await;

    assert_eq!(users.row_state(1), RowState::Editing);
    let workers = users.options("workers").unwrap();
    assert_eq!(workers.scope_id, Some(42));
    assert_eq!(
        workers.options,
        vec![
            SelectOption::new(42, "Jan Kowalski"),
            SelectOption::new(7, "Anna Nowak")
        ]
    );
}

#[tokio::test]
async fn slow_options_for_previous_row_are_dropped() {
    let ctx = TestContext::new().await;
    let mut alice = user_json(1, "alice");
    alice["worker_id"] = json!(42);
    alice["worker_name"] = json!("Jan Kowalski");
    let mut bob = user_json(2, "bob");
    bob["worker_id"] = json!(43);
    bob["worker_name"] = json!("Piotr Zielinski");
    ctx.mock_list("users", vec![alice, bob], 2).await;
    ctx.mock_list("roles", vec![json!({"id": 2, "name": "manager"})], 1)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/workers/unassigned"))
        .and(query_param("include_id", "42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([
                    {"id": 42, "first_name": "Jan", "last_name": "Kowalski"},
                    {"id": 7, "first_name": "Anna", "last_name": "Nowak"}
                ]))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&ctx.mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/workers/unassigned"))
        .and(query_param("include_id", "43"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 43, "first_name": "Piotr", "last_name": "Zielinski"},
            {"id": 7, "first_name": "Anna", "last_name": "Nowak"}
        ])))
        .expect(1)
        .mount(&ctx.mock_server)
        .await;

    let mut users = entities::users(&ctx.client);
    users.load_page("", 1).unwrap();
    settle(&mut users).await;

    users.begin_edit(1).unwrap();
    users.begin_edit(2).unwrap();
    settle(&mut users).await;

    assert_eq!(users.edit_session().unwrap().entity_id(), 2);
    let workers = users.options("workers").unwrap();
    assert!(!workers.loading);
    assert_eq!(workers.scope_id, Some(43));
    assert_eq!(
        workers.options,
        vec![
            SelectOption::new(43, "Piotr Zielinski"),
            SelectOption::new(7, "Anna Nowak")
        ]
    );
}

#[tokio::test]
async fn unauthorized_expires_session_without_banner() {
    let ctx = TestContext::new().await;
    let events = ctx.auth.subscribe();
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .mount(&ctx.mock_server)
        .await;

    let mut users = entities::users(&ctx.client);
    users.load_page("", 1).unwrap();
    settle(&mut users).await;

    assert!(!ctx.auth.is_authenticated());
    assert_eq!(events.try_recv(), Ok(AuthEvent::Expired));
    assert_eq!(users.error(), None);
    assert!(users.take_notifications().is_empty());
    assert!(!users.is_loading());
}

#[tokio::test]
async fn server_error_keeps_previous_rows() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::page_body(
            vec![user_json(1, "alice")],
            11,
        )))
        .mount(&ctx.mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&ctx.mock_server)
        .await;

    let mut users = entities::users(&ctx.client);
    users.load_page("", 1).unwrap();
    settle(&mut users).await;
    users.change_page(2).unwrap();
    settle(&mut users).await;

    assert_eq!(users.items().len(), 1);
    assert_eq!(users.page().page, 1);
    assert_eq!(
        users.error(),
        Some("The server encountered an error. Try again later.")
    );
    assert!(!users.is_loading());
}

#[tokio::test]
async fn malformed_list_shows_error_and_empty_state() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&ctx.mock_server)
        .await;

    let mut users = entities::users(&ctx.client);
    users.load_page("", 1).unwrap();
    settle(&mut users).await;

    assert!(users.error().is_some());
    assert_eq!(users.empty_message().as_deref(), Some("No users to display"));
}

#[tokio::test]
async fn created_user_is_appended() {
    let ctx = TestContext::new().await;
    ctx.mock_list("users", vec![user_json(1, "alice")], 1).await;
    ctx.mock_list("roles", vec![], 0).await;
    Mock::given(method("GET"))
        .and(path("/api/workers/unassigned"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&ctx.mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(body_json(json!({
            "username": "dora", "password": "pw", "role_id": 2, "is_active": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(user_json(9, "dora")))
        .expect(1)
        .mount(&ctx.mock_server)
        .await;

    let mut users = entities::users(&ctx.client);
    users.load_page("", 1).unwrap();
    settle(&mut users).await;

    users.open_create_form().unwrap();
    users.update_draft(|draft| {
        draft.username = "dora".to_owned();
        draft.password = "pw".to_owned();
        draft.role_id = Some(2);
    });
    users.submit_create_form().unwrap();
    settle(&mut users).await;

    let last: &User = users.items().last().unwrap();
    assert_eq!(last.id, 9);
    assert_eq!(users.page().total_count, 2);
    assert!(users.create_form().is_none());
}

#[tokio::test]
async fn failed_create_keeps_form_values() {
    let ctx = TestContext::new().await;
    ctx.mock_list("users", vec![], 0).await;
    ctx.mock_list("roles", vec![], 0).await;
    Mock::given(method("GET"))
        .and(path("/api/workers/unassigned"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&ctx.mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "email"], "msg": "invalid email"}]
        })))
        .mount(&ctx.mock_server)
        .await;

    let mut users = entities::users(&ctx.client);
    users.load_page("", 1).unwrap();
    users.open_create_form().unwrap();
    users.update_draft(|draft| {
        draft.username = "eve".to_owned();
        draft.email = Some("not-an-email".to_owned());
    });
    users.submit_create_form().unwrap();
    settle(&mut users).await;

    let form = users.create_form().expect("form stays open");
    assert!(!form.submitting);
    assert_eq!(form.draft.username, "eve");
    assert_eq!(form.error.as_deref(), Some("invalid email"));
    assert!(users.items().is_empty());
}
