//! End-to-end editing behavior: forms, field paths, undo/redo, debounced
//! page saves, deep-link hash mirroring.

use amphora_api::mock::MockTransport;
use amphora_api::{ApiConfig, ContentStore, Method};
use amphora_store::hash::RecordingLocation;
use amphora_store::state::{IssueLevel, Issue, PublishState, RetryAction};
use amphora_store::{
    FormOpen, PreloadData, SaveOutcome, Store, StoreOptions, Validator,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const PAGE: &str = "domain.com/pages/front";
const LAYOUT: &str = "domain.com/layouts/base";
const FOO: &str = "domain.com/components/foo/instances/a1b2";

struct TestHarness {
    store: Store,
    transport: Arc<MockTransport>,
    location: Arc<RecordingLocation>,
}

fn harness() -> TestHarness {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let transport = Arc::new(MockTransport::new());
    let location = Arc::new(RecordingLocation::default());
    let config = ApiConfig {
        protocol: "http".to_string(),
        port: 3001,
        component_hooks: false,
        ..ApiConfig::default()
    };
    let content = Arc::new(ContentStore::new(config, transport.clone()));
    let store = Store::builder(content)
        .location(location.clone())
        .options(StoreOptions {
            site_prefix: "domain.com".to_string(),
            save_debounce: Duration::from_millis(300),
        })
        .build();

    store.preload(PreloadData {
        page_uri: PAGE.to_string(),
        page_data: json!({ "head": [FOO] }),
        page_state: PublishState::default(),
        layout_uri: LAYOUT.to_string(),
        layout_state: PublishState::default(),
        components: HashMap::from([(
            FOO.to_string(),
            json!({ "title": "hello", "list": [{"field": "a"}] }),
        )]),
    });

    TestHarness {
        store,
        transport,
        location,
    }
}

fn open_foo_form(store: &Store) {
    store.open_form(FormOpen {
        uri: FOO.to_string(),
        path: "settings".to_string(),
        schema: json!({}),
        fields: None,
        inline: false,
        pos: None,
    });
}

#[test]
fn close_form_twice_equals_close_form_once() {
    let h = harness();
    open_foo_form(&h.store);
    assert!(h.store.with_state(|s| s.ui.current_form.is_some()));

    h.store.close_form();
    let after_once = serde_json::to_value(h.store.snapshot()).unwrap();
    h.store.close_form();
    let after_twice = serde_json::to_value(h.store.snapshot()).unwrap();

    assert!(h.store.with_state(|s| s.ui.current_form.is_none()));
    assert_eq!(after_once, after_twice);
}

#[test]
fn form_identity_drives_url_and_location_hash_together() {
    let h = harness();
    open_foo_form(&h.store);

    let target = h.store.with_state(|s| s.url.clone()).unwrap();
    assert_eq!(target.component, "foo");
    assert_eq!(target.instance.as_deref(), Some("a1b2"));
    assert_eq!(target.path, "settings");

    let changes = h.location.changes.lock().unwrap().clone();
    assert_eq!(
        changes.last().unwrap().as_deref(),
        Some("component=foo&instance=a1b2&path=settings")
    );

    drop(changes);
    h.store.close_form();
    assert!(h.store.with_state(|s| s.url.is_none()));
    assert_eq!(h.location.changes.lock().unwrap().last(), Some(&None));
}

#[tokio::test]
async fn form_edits_merge_into_component_and_save() {
    let h = harness();
    open_foo_form(&h.store);

    h.store.update_form_data("list.0.field", json!("edited"));
    h.store.update_form_data("title", json!("new title"));
    h.store.save_form().await.unwrap();

    let component = h.store.with_state(|s| s.components[FOO].clone());
    assert_eq!(
        component,
        json!({ "title": "new title", "list": [{"field": "edited"}] })
    );

    // the write went to the component address with hooks suppressed
    let calls = h.transport.calls();
    assert_eq!(
        calls,
        vec![format!("PUT http://domain.com:3001/{}?componenthooks=false", FOO.trim_start_matches("domain.com/"))]
    );
}

#[tokio::test]
async fn undo_redo_round_trip_restores_the_latest_snapshot() {
    let h = harness();

    // S0 is the preload; make S1 and S2
    h.store
        .update_component(FOO, json!({ "title": "one" }))
        .await
        .unwrap();
    h.store
        .update_component(FOO, json!({ "title": "two" }))
        .await
        .unwrap();

    let s2 = h.store.with_state(|s| s.components[FOO].clone());
    let flags = |s: &Store| s.with_state(|s| (s.undo.cursor, s.undo.at_start, s.undo.at_end));
    assert_eq!(flags(&h.store), (2, false, true));

    h.store.undo().await.unwrap();
    assert_eq!(flags(&h.store), (1, false, false));
    assert_eq!(
        h.store.with_state(|s| s.components[FOO].clone()),
        json!({ "title": "one" })
    );

    h.store.undo().await.unwrap();
    assert_eq!(flags(&h.store), (0, true, false));
    assert_eq!(
        h.store.with_state(|s| s.components[FOO].clone()),
        json!({ "title": "hello", "list": [{"field": "a"}] })
    );

    h.store.redo().await.unwrap();
    assert_eq!(flags(&h.store), (1, false, false));

    h.store.redo().await.unwrap();
    assert_eq!(flags(&h.store), (2, false, true));
    assert_eq!(h.store.with_state(|s| s.components[FOO].clone()), s2);
}

#[tokio::test]
async fn undo_at_start_and_redo_at_end_are_noops() {
    let h = harness();
    let before = serde_json::to_value(h.store.snapshot()).unwrap();

    h.store.undo().await.unwrap();
    h.store.redo().await.unwrap();

    assert_eq!(serde_json::to_value(h.store.snapshot()).unwrap(), before);
    assert!(h.transport.requests().is_empty());
}

#[tokio::test]
async fn new_edit_mid_history_discards_the_redo_tail() {
    let h = harness();
    h.store
        .update_component(FOO, json!({ "title": "one" }))
        .await
        .unwrap();
    h.store
        .update_component(FOO, json!({ "title": "two" }))
        .await
        .unwrap();
    h.store.undo().await.unwrap();

    // a new edit from cursor 1 invalidates "two"
    h.store
        .update_component(FOO, json!({ "title": "fork" }))
        .await
        .unwrap();

    let (cursor, at_end) = h.store.with_state(|s| (s.undo.cursor, s.undo.at_end));
    assert_eq!(cursor, 2);
    assert!(at_end);

    // redo has nothing to restore
    h.store.redo().await.unwrap();
    assert_eq!(
        h.store.with_state(|s| s.components[FOO].clone()),
        json!({ "title": "fork" })
    );
}

#[tokio::test]
async fn undo_mirrors_restored_data_to_the_remote_store() {
    let h = harness();
    h.store
        .update_component(FOO, json!({ "title": "one" }))
        .await
        .unwrap();

    h.store.undo().await.unwrap();

    let calls = h.transport.calls();
    // edit save + restore save, both to the component
    assert_eq!(calls.len(), 2);
    let restore = &h.transport.requests()[1];
    assert_eq!(restore.method, Method::Put);
    assert_eq!(
        restore.body,
        Some(json!({ "title": "hello", "list": [{"field": "a"}] }))
    );
}

#[tokio::test(start_paused = true)]
async fn rapid_page_saves_collapse_into_one_write() {
    let h = harness();

    let (a, b, c) = tokio::join!(
        h.store.save_page(json!({ "head": [], "rev": 1 })),
        h.store.save_page(json!({ "head": [], "rev": 2 })),
        h.store.save_page(json!({ "head": [], "rev": 3 })),
    );

    assert_eq!(a.unwrap(), SaveOutcome::Superseded);
    assert_eq!(b.unwrap(), SaveOutcome::Superseded);
    assert_eq!(c.unwrap(), SaveOutcome::Saved);

    let requests = h.transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "http://domain.com:3001/pages/front");
    assert_eq!(requests[0].body, Some(json!({ "head": [], "rev": 3 })));
}

#[tokio::test]
async fn failed_page_save_rolls_back_and_offers_retry() {
    let h = harness();
    h.transport
        .respond_with(Some(Method::Put), "/pages/front", 500, "boom");

    let before = h.store.with_state(|s| s.page.data.clone());
    let result = h.store.save_page(json!({ "head": [], "broken": true })).await;
    assert!(result.is_err());

    // page data reverted to the pre-save snapshot
    assert_eq!(h.store.with_state(|s| s.page.data.clone()), before);

    let notifications = h.store.with_state(|s| s.ui.notifications.clone());
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].retry, Some(RetryAction::SavePage));
}

#[tokio::test]
async fn lists_track_loading_and_error_states() {
    let h = harness();
    h.transport.respond_with(
        Some(Method::Get),
        "/lists/tags",
        200,
        r#"["a (site1)", "b (not:site1)", "c"]"#,
    );
    h.transport
        .respond_with(Some(Method::Get), "/lists/broken", 500, "nope");

    h.store.load_list("tags").await.unwrap();
    let tags = h.store.with_state(|s| s.lists["tags"].clone());
    assert!(!tags.is_loading);
    assert_eq!(tags.items.len(), 3);

    let items: Vec<String> = tags
        .items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    assert_eq!(
        amphora_store::lists::filter_site_list(&items, "site1"),
        vec!["a", "c"]
    );
    assert_eq!(
        amphora_store::lists::filter_site_list(&items, "site2"),
        vec!["c"]
    );

    assert!(h.store.load_list("broken").await.is_err());
    let broken = h.store.with_state(|s| s.lists["broken"].clone());
    assert!(!broken.is_loading);
    assert!(broken.error.is_some());
}

struct RequireTitle;

impl Validator for RequireTitle {
    fn validate(&self, state: &amphora_store::State) -> Vec<Issue> {
        let missing = state
            .ui
            .current_form
            .as_ref()
            .map(|form| form.fields.get("title") == Some(&json!("")))
            .unwrap_or(false);
        if missing {
            vec![Issue {
                level: IssueLevel::Error,
                uri: state.ui.current_form.as_ref().map(|f| f.uri.clone()),
                path: Some("title".to_string()),
                message: "Title is required".to_string(),
            }]
        } else {
            Vec::new()
        }
    }
}

#[test]
fn validators_rerun_on_every_form_edit() {
    let transport = Arc::new(MockTransport::new());
    let config = ApiConfig::default();
    let content = Arc::new(ContentStore::new(config, transport));
    let store = Store::builder(content)
        .validator("require-title", Arc::new(RequireTitle))
        .build();

    store.preload(PreloadData {
        page_uri: PAGE.to_string(),
        page_data: json!({}),
        page_state: PublishState::default(),
        layout_uri: LAYOUT.to_string(),
        layout_state: PublishState::default(),
        components: HashMap::from([(FOO.to_string(), json!({ "title": "ok" }))]),
    });

    open_foo_form(&store);
    assert!(store.with_state(|s| s.validation.errors.is_empty()));

    store.update_form_data("title", json!(""));
    let errors = store.with_state(|s| s.validation.errors.clone());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Title is required");

    store.update_form_data("title", json!("fixed"));
    assert!(store.with_state(|s| s.validation.errors.is_empty()));
}
