//! Publish/schedule transitions and their sequencing guarantees.

use amphora_api::mock::MockTransport;
use amphora_api::{ApiConfig, ContentStore, Method};
use amphora_store::progress::{ProgressEvent, RecordingProgress};
use amphora_store::state::PublishState;
use amphora_store::{PreloadData, Store, StoreOptions};
use amphora_uri::encode_uri;
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const PAGE: &str = "domain.com/pages/front";
const LAYOUT: &str = "domain.com/layouts/base";

struct TestHarness {
    store: Store,
    transport: Arc<MockTransport>,
    progress: Arc<RecordingProgress>,
}

fn harness(page_state: PublishState) -> TestHarness {
    let transport = Arc::new(MockTransport::new());
    let progress = Arc::new(RecordingProgress::default());
    let config = ApiConfig {
        protocol: "http".to_string(),
        port: 3001,
        ..ApiConfig::default()
    };
    let content = Arc::new(ContentStore::new(config, transport.clone()));
    let store = Store::builder(content)
        .progress(progress.clone())
        .options(StoreOptions {
            site_prefix: "domain.com".to_string(),
            save_debounce: Duration::from_millis(300),
        })
        .build();

    store.preload(PreloadData {
        page_uri: PAGE.to_string(),
        page_data: json!({ "main": [] }),
        page_state,
        layout_uri: LAYOUT.to_string(),
        layout_state: PublishState::default(),
        components: HashMap::new(),
    });

    TestHarness {
        store,
        transport,
        progress,
    }
}

#[tokio::test]
async fn schedule_page_posts_a_schedule_record() {
    let h = harness(PublishState::default());
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    h.store.schedule_page(at).await.unwrap();

    let requests = h.transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].url, "http://domain.com:3001/schedule");
    assert_eq!(
        requests[0].body,
        Some(json!({
            "at": at.timestamp_millis(),
            "publish": "http://domain.com:3001/pages/front",
        }))
    );

    let state = h.store.with_state(|s| s.page.state.clone());
    assert!(state.scheduled);
    assert_eq!(state.scheduled_time, Some(at));
}

#[tokio::test]
async fn unschedule_page_deletes_by_encoded_id() {
    let mut scheduled = PublishState::default();
    scheduled.scheduled = true;
    scheduled.scheduled_time = Some(Utc::now());
    let h = harness(scheduled);

    h.store.unschedule_page().await.unwrap();

    assert_eq!(
        h.transport.calls(),
        vec![format!(
            "DELETE http://domain.com:3001/schedule/{}",
            encode_uri(PAGE)
        )]
    );

    let state = h.store.with_state(|s| s.page.state.clone());
    assert!(!state.scheduled);
    assert_eq!(state.scheduled_time, None);
}

#[tokio::test]
async fn publishing_a_scheduled_page_unschedules_first() {
    let mut scheduled = PublishState::default();
    scheduled.scheduled = true;
    let h = harness(scheduled);
    h.transport.respond_with(
        Some(Method::Put),
        "@published",
        200,
        r#"{"url": "http://domain.com/2024/front.html"}"#,
    );

    h.store.publish_page().await.unwrap();

    // the schedule-removal call strictly precedes the publish write
    let calls = h.transport.calls();
    assert_eq!(
        calls,
        vec![
            format!(
                "DELETE http://domain.com:3001/schedule/{}",
                encode_uri(PAGE)
            ),
            "PUT http://domain.com:3001/pages/front@published".to_string(),
        ]
    );

    let state = h.store.with_state(|s| s.page.state.clone());
    assert!(state.published);
    assert!(!state.scheduled);
    assert_eq!(
        state.published_url.as_deref(),
        Some("http://domain.com/2024/front.html")
    );
    assert!(state.publish_time.is_some());
}

#[tokio::test]
async fn publishing_an_unscheduled_page_skips_the_unschedule_call() {
    let h = harness(PublishState::default());

    h.store.publish_page().await.unwrap();

    assert_eq!(
        h.transport.calls(),
        vec!["PUT http://domain.com:3001/pages/front@published"]
    );
}

#[tokio::test]
async fn publish_brackets_progress_once() {
    let mut scheduled = PublishState::default();
    scheduled.scheduled = true;
    let h = harness(scheduled);

    h.store.publish_page().await.unwrap();

    // one bracket around the whole transition, unschedule included
    assert_eq!(
        *h.progress.events.lock().unwrap(),
        vec![ProgressEvent::Begin, ProgressEvent::Finish]
    );
    assert_eq!(h.store.with_state(|s| s.ui.progress), 0);
}

#[tokio::test]
async fn progress_finishes_even_when_the_transition_fails() {
    let h = harness(PublishState::default());
    h.transport
        .respond_with(Some(Method::Put), "@published", 500, "boom");

    assert!(h.store.publish_page().await.is_err());
    assert_eq!(
        *h.progress.events.lock().unwrap(),
        vec![ProgressEvent::Begin, ProgressEvent::Finish]
    );
    assert!(!h.store.with_state(|s| s.page.state.published));
}

#[tokio::test]
async fn unpublish_recovers_the_public_url_and_deletes_its_index() {
    let mut published = PublishState::default();
    published.published = true;
    published.published_url = Some("http://domain.com/2024/front.html".to_string());
    let h = harness(published);
    h.transport.respond_with(
        Some(Method::Get),
        "@published",
        200,
        r#"{"url": "http://domain.com/2024/front.html", "main": []}"#,
    );

    h.store.unpublish_page().await.unwrap();

    assert_eq!(
        h.transport.calls(),
        vec![
            "GET http://domain.com:3001/pages/front@published".to_string(),
            format!(
                "DELETE http://domain.com:3001/uris/{}",
                encode_uri("domain.com/2024/front.html")
            ),
        ]
    );

    let state = h.store.with_state(|s| s.page.state.clone());
    assert!(!state.published);
    assert_eq!(state.published_url, None);
    assert_eq!(state.publish_time, None);
}

#[tokio::test]
async fn layout_publish_fetches_the_draft_then_writes_the_version() {
    let h = harness(PublishState::default());
    h.transport.respond_with(
        Some(Method::Get),
        "/layouts/base",
        200,
        r#"{"name": "base", "slots": ["top"]}"#,
    );

    h.store.publish_layout().await.unwrap();

    let requests = h.transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, Method::Get);
    assert_eq!(requests[0].url, "http://domain.com:3001/layouts/base");
    assert_eq!(requests[1].method, Method::Put);
    assert_eq!(
        requests[1].url,
        "http://domain.com:3001/layouts/base@published"
    );
    assert_eq!(requests[1].body, Some(json!({"name": "base", "slots": ["top"]})));

    assert!(h.store.with_state(|s| s.layout.state.published));
}

#[tokio::test]
async fn layout_unpublish_without_a_public_url_just_clears_state() {
    let mut published = PublishState::default();
    published.published = true;
    let h = harness(PublishState::default());
    h.store.commit(amphora_store::Mutation::UpdateLayoutState(published));
    h.transport.respond_with(
        Some(Method::Get),
        "/layouts/base@published",
        200,
        r#"{"name": "base"}"#,
    );

    h.store.unpublish_layout().await.unwrap();

    // no url in the published metadata, so no uri-index delete
    assert_eq!(
        h.transport.calls(),
        vec!["GET http://domain.com:3001/layouts/base@published"]
    );
    assert!(!h.store.with_state(|s| s.layout.state.published));
}

#[tokio::test]
async fn schedule_layout_round_trip() {
    let h = harness(PublishState::default());
    let at = Utc.with_ymd_and_hms(2024, 7, 4, 9, 30, 0).unwrap();

    h.store.schedule_layout(at).await.unwrap();
    assert!(h.store.with_state(|s| s.layout.state.scheduled));

    h.store.unschedule_layout().await.unwrap();
    assert!(!h.store.with_state(|s| s.layout.state.scheduled));

    let calls = h.transport.calls();
    assert_eq!(calls[0], "POST http://domain.com:3001/schedule");
    assert_eq!(
        calls[1],
        format!(
            "DELETE http://domain.com:3001/schedule/{}",
            encode_uri(LAYOUT)
        )
    );
}
