//! End-to-end reconciliation against a mock Neo N3 node.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use neons_redirect::config::RedirectConfig;
use neons_redirect::reconcile::{ReconcileOutcome, Reconciler, RuleTemplate};
use neons_redirect::resolver::{DomainResolver, NeoRpcClient, Resolution, ResolverError};
use neons_redirect::rules::{RedirectRule, ResourceType, RuleId, RuleStore, RuleStoreAccessor};

mod common;
use common::RecordingStore;

const ERROR_PAGE: &str = "chrome-extension://neons-redirect/error_page.html";

fn redirect_rule(id: u32, target: &str) -> RedirectRule {
    RedirectRule::redirect(RuleId(id), 1, "http://test.neo/", target, vec![ResourceType::MainFrame])
}

fn reconciler_for(addr: std::net::SocketAddr, store: Arc<RecordingStore>) -> Reconciler {
    let config = RedirectConfig::default();
    let client = NeoRpcClient::new(&common::node_config(addr)).unwrap();
    Reconciler::new(
        Arc::new(client),
        RuleStoreAccessor::new(store),
        RuleTemplate::from_config(&config).unwrap(),
    )
}

#[tokio::test]
async fn test_resolved_name_creates_rule() {
    let addr = common::start_mock_node(|_| (200, common::stack_response("example.com/page"))).await;
    let store = Arc::new(RecordingStore::default());
    let reconciler = reconciler_for(addr, store.clone());

    let outcome = reconciler.reconcile("http://test.neo/").await.unwrap();
    assert_eq!(
        outcome,
        ReconcileOutcome::Created {
            rule_id: RuleId(1),
            target: "https://example.com/page".to_string()
        }
    );

    let updates = store.updates();
    assert_eq!(updates.len(), 1);
    assert!(updates[0].remove_rule_ids.is_empty());
    assert_eq!(updates[0].add_rules, vec![redirect_rule(1, "https://example.com/page")]);
}

#[tokio::test]
async fn test_empty_record_adds_error_rule() {
    let addr = common::start_mock_node(|_| (200, common::raw_stack_response(""))).await;
    let store = Arc::new(RecordingStore::default());
    let reconciler = reconciler_for(addr, store.clone());

    let outcome = reconciler.reconcile("http://test.neo/").await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::ErrorRedirect { rule_id: RuleId(1) });

    let rules = store.get_dynamic_rules().await.unwrap();
    assert_eq!(rules, vec![redirect_rule(1, ERROR_PAGE)]);
}

#[tokio::test]
async fn test_up_to_date_rule_makes_no_commit() {
    let addr = common::start_mock_node(|_| (200, common::stack_response("example.com/page"))).await;
    let store = Arc::new(RecordingStore::with_rules([redirect_rule(3, "https://example.com/page")]));
    let reconciler = reconciler_for(addr, store.clone());

    for _ in 0..3 {
        let outcome = reconciler.reconcile("http://test.neo/").await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::Unchanged { rule_id: RuleId(3) });
    }
    assert!(store.updates().is_empty());
}

#[tokio::test]
async fn test_stale_rule_replaced_in_one_commit() {
    let addr = common::start_mock_node(|_| (200, common::stack_response("new.example.com/"))).await;
    let store = Arc::new(RecordingStore::with_rules([redirect_rule(5, "https://old.example.com/")]));
    let reconciler = reconciler_for(addr, store.clone());

    let outcome = reconciler.reconcile("http://test.neo/").await.unwrap();
    assert_eq!(
        outcome,
        ReconcileOutcome::Replaced {
            removed: vec![RuleId(5)],
            added: RuleId(6),
            target: "https://new.example.com/".to_string()
        }
    );

    let updates = store.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].remove_rule_ids, vec![RuleId(5)]);
    assert_eq!(updates[0].add_rules, vec![redirect_rule(6, "https://new.example.com/")]);
    assert_eq!(
        store.get_dynamic_rules().await.unwrap(),
        vec![redirect_rule(6, "https://new.example.com/")]
    );
}

#[tokio::test]
async fn test_network_error_is_unresolved() {
    let addr = common::start_dropping_node().await;
    let client = NeoRpcClient::new(&common::node_config(addr)).unwrap();

    assert_eq!(client.resolve("http://test.neo/").await, Resolution::Unresolved);
}

#[tokio::test]
async fn test_silent_node_times_out() {
    let addr = common::start_silent_node().await;
    let mut node = common::node_config(addr);
    node.rpc_timeout_secs = Some(1);
    let client = NeoRpcClient::new(&node).unwrap();

    let err = client.invoke_resolve("test.neo").await.unwrap_err();
    assert!(matches!(err, ResolverError::Timeout(1)));
    assert_eq!(client.resolve("http://test.neo/").await, Resolution::Unresolved);
}

#[tokio::test]
async fn test_failure_responses_are_unresolved() {
    let responses = [
        (503, "Service Unavailable".to_string()),
        (200, "not json".to_string()),
        (
            200,
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"Invalid params"}}"#.to_string(),
        ),
        (200, r#"{"jsonrpc":"2.0","id":1,"result":{"state":"FAULT","stack":[]}}"#.to_string()),
        (200, common::raw_stack_response("%%%")),
        (200, common::stack_response("bad host/")),
    ];

    for (status, body) in responses {
        let addr = common::start_mock_node(move |_| (status, body.clone())).await;
        let client = NeoRpcClient::new(&common::node_config(addr)).unwrap();
        assert_eq!(client.resolve("http://test.neo/").await, Resolution::Unresolved);
    }
}

#[tokio::test]
async fn test_request_carries_canonical_domain() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let addr = common::start_mock_node(move |body| {
        recorder.lock().unwrap().push(body);
        (200, common::stack_response("example.com"))
    })
    .await;
    let client = NeoRpcClient::new(&common::node_config(addr)).unwrap();

    let resolution = client.resolve("https://test.neo//").await;
    assert_eq!(
        resolution,
        Resolution::Resolved(url::Url::parse("https://example.com/").unwrap())
    );

    let bodies = seen.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    let request: serde_json::Value = serde_json::from_str(&bodies[0]).unwrap();
    assert_eq!(request["method"], "invokefunction");
    assert_eq!(request["params"][0], "0x50ac1c37690cc2cfc594472833cf57505d5f46de");
    assert_eq!(request["params"][1], "resolve");
    assert_eq!(
        request["params"][2],
        serde_json::json!([{ "type": "String", "value": "test.neo" }, { "type": "Integer", "value": 5 }])
    );
}

#[tokio::test]
async fn test_changing_records_keep_one_rule_per_url() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let addr = common::start_mock_node(move |_| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        let record = match n % 3 {
            0 => "a.example.com/",
            1 => "b.example.com/",
            _ => "b.example.com/",
        };
        (200, common::stack_response(record))
    })
    .await;
    let store = Arc::new(RecordingStore::default());
    let reconciler = reconciler_for(addr, store.clone());

    for _ in 0..6 {
        reconciler.reconcile("http://test.neo/").await.unwrap();
        let rules = store.get_dynamic_rules().await.unwrap();
        let matching = rules
            .iter()
            .filter(|rule| rule.condition.url_filter == "http://test.neo/")
            .count();
        assert_eq!(matching, 1);
    }

    // a, b, b, a, b, b: the repeated b answers commit nothing.
    assert_eq!(store.updates().len(), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_resolution_after_failures_leaves_one_rule() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let addr = common::start_mock_node(move |_| match counter.fetch_add(1, Ordering::SeqCst) {
        0 | 1 => (200, common::raw_stack_response("")),
        _ => (200, common::stack_response("example.com/")),
    })
    .await;
    let store = Arc::new(RecordingStore::default());
    let reconciler = reconciler_for(addr, store.clone());

    assert_eq!(
        reconciler.reconcile("http://test.neo/").await.unwrap(),
        ReconcileOutcome::ErrorRedirect { rule_id: RuleId(1) }
    );
    assert_eq!(
        reconciler.reconcile("http://test.neo/").await.unwrap(),
        ReconcileOutcome::ErrorRedirect { rule_id: RuleId(2) }
    );
    assert_eq!(
        reconciler.reconcile("http://test.neo/").await.unwrap(),
        ReconcileOutcome::Replaced {
            removed: vec![RuleId(1), RuleId(2)],
            added: RuleId(3),
            target: "https://example.com/".to_string()
        }
    );

    assert_eq!(
        store.get_dynamic_rules().await.unwrap(),
        vec![redirect_rule(3, "https://example.com/")]
    );
    assert_eq!(store.updates().len(), 3);
}
