//! End-to-end roster/registry synchronization against mocked HTTP
//! collaborators: the audit endpoint and the page registry.

use std::sync::Arc;
use std::time::Duration;

use beacon_runtime::config::Config;
use beacon_runtime::events::PageEvent;
use beacon_runtime::registry::types::Strategy;
use beacon_runtime::roster::{PageRoster, RosterError, RowState};

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn audit_body(score: f64) -> serde_json::Value {
    json!({
        "result": { "lighthouseResult": {
            "categories": { "performance": { "score": score } },
            "audits": {
                "first-contentful-paint": { "displayValue": "1.2 s" },
                "largest-contentful-paint": { "numericValue": 1800 }
            }
        }}
    })
}

fn page_body(id: i64, url: &str, score: f64) -> serde_json::Value {
    json!({ "id": id, "url": url, "score": score, "strategy": "mobile" })
}

fn roster_for(server: &MockServer) -> PageRoster {
    PageRoster::new(&Config::new(server.uri()))
}

#[tokio::test]
async fn register_persists_and_appends() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pageSpeedInsights"))
        .and(query_param("url", "https://example.com/"))
        .and(query_param("strategy", "mobile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(audit_body(0.87)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pageList"))
        .and(body_partial_json(json!({ "url": "https://example.com/", "score": 87.0 })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(page_body(1, "https://example.com/", 87.0)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let roster = roster_for(&server);
    let mut events = roster.events().subscribe();

    // Bare hostname: normalization must run before the audit
    let record = roster
        .register(Some("Example".to_string()), "example.com", Strategy::Mobile)
        .await
        .unwrap();

    assert_eq!(record.id, 1);
    assert_eq!(record.score, 87.0);
    assert_eq!(roster.len().await, 1);
    assert_eq!(roster.snapshot().await[0].id, 1);

    // The audited metrics are cached for the device profile used
    let cached = roster.cached_metrics(1, Strategy::Mobile).await.unwrap();
    assert_eq!(cached.fcp.as_deref(), Some("1.2 s"));
    assert_eq!(cached.lcp, Some(1800.0));
    assert!(roster.cached_metrics(1, Strategy::Desktop).await.is_none());

    match events.recv().await.unwrap() {
        PageEvent::PageRegistered { id, score, .. } => {
            assert_eq!(id, 1);
            assert_eq!(score, 87.0);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn register_audit_failure_creates_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pageSpeedInsights"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pageList"))
        .respond_with(ResponseTemplate::new(201).set_body_json(page_body(1, "x", 0.0)))
        .expect(0)
        .mount(&server)
        .await;

    let roster = roster_for(&server);
    let err = roster
        .register(None, "https://example.com", Strategy::Mobile)
        .await
        .unwrap_err();

    assert!(matches!(err, RosterError::Audit(_)));
    assert!(roster.is_empty().await);
}

#[tokio::test]
async fn register_extraction_failure_creates_nothing() {
    let server = MockServer::start().await;

    // 200, but the report lacks lighthouseResult
    Mock::given(method("GET"))
        .and(path("/pageSpeedInsights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": {} })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pageList"))
        .respond_with(ResponseTemplate::new(201).set_body_json(page_body(1, "x", 0.0)))
        .expect(0)
        .mount(&server)
        .await;

    let roster = roster_for(&server);
    let err = roster
        .register(None, "https://example.com", Strategy::Mobile)
        .await
        .unwrap_err();

    assert!(matches!(err, RosterError::Extraction(_)));
    assert!(roster.is_empty().await);
}

#[tokio::test]
async fn register_registry_failure_appends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pageSpeedInsights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(audit_body(0.87)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pageList"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let roster = roster_for(&server);
    let err = roster
        .register(None, "https://example.com", Strategy::Mobile)
        .await
        .unwrap_err();

    assert!(matches!(err, RosterError::Registry(_)));
    assert!(roster.is_empty().await);
}

#[tokio::test]
async fn registering_same_url_twice_yields_distinct_ids() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pageSpeedInsights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(audit_body(0.87)))
        .mount(&server)
        .await;
    // The registry mints a fresh id per create; no implicit dedup
    Mock::given(method("POST"))
        .and(path("/pageList"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(page_body(1, "https://example.com/", 87.0)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pageList"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(page_body(2, "https://example.com/", 87.0)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let roster = roster_for(&server);
    let a = roster
        .register(None, "example.com", Strategy::Mobile)
        .await
        .unwrap();
    let b = roster
        .register(None, "example.com", Strategy::Mobile)
        .await
        .unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(roster.len().await, 2);
}

#[tokio::test]
async fn load_all_is_one_shot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pageList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            page_body(1, "https://a.example/", 90.0),
            page_body(2, "https://b.example/", 75.0),
            page_body(3, "https://c.example/", 60.0),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let roster = roster_for(&server);
    assert_eq!(roster.load_all().await.unwrap(), 3);
    assert_eq!(roster.load_all().await.unwrap(), 0);
    assert_eq!(roster.len().await, 3);

    // Registry order is preserved as display order
    let ids: Vec<i64> = roster.snapshot().await.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn refresh_commits_score_and_date_together() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pageList"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!([page_body(7, "https://example.com/", 50.0)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pageSpeedInsights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(audit_body(0.92)))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/pageList/7"))
        .and(body_partial_json(json!({ "score": 92.0 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let roster = roster_for(&server);
    roster.load_all().await.unwrap();

    let pages = roster.snapshot().await;
    assert_eq!(pages[0].score, 50.0);
    assert_eq!(pages[0].date, None);

    let updated = roster.refresh(7, Strategy::Mobile).await.unwrap();
    assert_eq!(updated.score, 92.0);
    assert!(updated.date.is_some());

    let pages = roster.snapshot().await;
    assert_eq!(pages[0].score, 92.0);
    assert_eq!(pages[0].date, updated.date);
    assert_eq!(roster.row_state(7).await, Some(RowState::Idle));
}

#[tokio::test]
async fn refresh_registry_failure_leaves_row_untouched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pageList"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!([page_body(7, "https://example.com/", 50.0)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pageSpeedInsights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(audit_body(0.92)))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/pageList/7"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let roster = roster_for(&server);
    roster.load_all().await.unwrap();

    let err = roster.refresh(7, Strategy::Mobile).await.unwrap_err();
    assert!(matches!(err, RosterError::Registry(_)));

    // Old value still visible, row back to Idle
    let pages = roster.snapshot().await;
    assert_eq!(pages[0].score, 50.0);
    assert_eq!(pages[0].date, None);
    assert_eq!(roster.row_state(7).await, Some(RowState::Idle));
    assert!(!roster.is_loading().await);
}

#[tokio::test]
async fn refresh_rejects_second_call_while_in_flight() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pageList"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!([page_body(7, "https://example.com/", 50.0)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pageSpeedInsights"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(audit_body(0.92))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/pageList/7"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let roster = Arc::new(roster_for(&server));
    roster.load_all().await.unwrap();

    let first = {
        let roster = Arc::clone(&roster);
        tokio::spawn(async move { roster.refresh(7, Strategy::Mobile).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(roster.row_state(7).await, Some(RowState::Refreshing));
    assert!(roster.is_loading().await);

    match roster.refresh(7, Strategy::Mobile).await {
        Err(RosterError::RefreshInFlight(7)) => {}
        other => panic!("expected RefreshInFlight, got {other:?}"),
    }

    let committed = first.await.unwrap().unwrap();
    assert_eq!(committed.score, 92.0);
    assert_eq!(roster.row_state(7).await, Some(RowState::Idle));
}

#[tokio::test]
async fn strategy_switch_keeps_both_caches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pageList"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!([page_body(7, "https://example.com/", 50.0)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pageSpeedInsights"))
        .and(query_param("strategy", "mobile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(audit_body(0.60)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pageSpeedInsights"))
        .and(query_param("strategy", "desktop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(audit_body(0.95)))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/pageList/7"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let roster = roster_for(&server);
    roster.load_all().await.unwrap();

    roster.refresh(7, Strategy::Mobile).await.unwrap();
    let updated = roster.refresh(7, Strategy::Desktop).await.unwrap();

    // Current row reflects the latest strategy...
    assert_eq!(updated.score, 95.0);
    assert_eq!(updated.strategy, Strategy::Desktop);
    // ...but the mobile result is not discarded by the switch
    let mobile = roster.cached_metrics(7, Strategy::Mobile).await.unwrap();
    assert_eq!(mobile.score, 60.0);
    let desktop = roster.cached_metrics(7, Strategy::Desktop).await.unwrap();
    assert_eq!(desktop.score, 95.0);
}

#[tokio::test]
async fn remove_deletes_exactly_one_row_preserving_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pageList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            page_body(1, "https://a.example/", 90.0),
            page_body(2, "https://b.example/", 75.0),
            page_body(3, "https://c.example/", 60.0),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/pageList/2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let roster = roster_for(&server);
    roster.load_all().await.unwrap();

    roster.remove(2).await.unwrap();

    let ids: Vec<i64> = roster.snapshot().await.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn remove_not_found_leaves_list_unchanged() {
    let server = MockServer::start().await;

    // Five rows; the registry no longer knows id 55
    Mock::given(method("GET"))
        .and(path("/pageList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            page_body(51, "https://a.example/", 90.0),
            page_body(52, "https://b.example/", 85.0),
            page_body(53, "https://c.example/", 80.0),
            page_body(54, "https://d.example/", 75.0),
            page_body(55, "https://e.example/", 70.0),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/pageList/55"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let roster = roster_for(&server);
    roster.load_all().await.unwrap();

    let err = roster.remove(55).await.unwrap_err();
    assert!(matches!(err, RosterError::Registry(_)));

    let pages = roster.snapshot().await;
    assert_eq!(pages.len(), 5);
    let ids: Vec<i64> = pages.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![51, 52, 53, 54, 55]);
}
