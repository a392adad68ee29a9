mod common;

use common::{MockGateway, Op};
use serde_json::json;
use std::sync::Arc;
use tokio::time::{sleep, Duration, Instant};
use voltport::gateway::{Gateway, GatewayError};
use voltport::notifications::{Notifier, ToastLevel};
use voltport::search::{ProductSearch, SearchStatus};

const DELAY: Duration = Duration::from_millis(600);

fn search_over(gateway: &Arc<MockGateway>, notifier: Notifier) -> ProductSearch {
    let gateway: Arc<dyn Gateway> = gateway.clone();
    ProductSearch::new(gateway, notifier, DELAY)
}

fn tesla() -> serde_json::Value {
    json!({"id": "1", "name": "Tesla Model S", "price": 89990, "availableQuantity": 3, "rating": 4.8})
}

#[tokio::test(start_paused = true)]
async fn test_keystrokes_coalesce_into_one_fetch() {
    let gateway = MockGateway::new();
    let mut search = search_over(&gateway, Notifier::new());
    let start = Instant::now();

    search.set_term("T");
    sleep(Duration::from_millis(100)).await;
    search.set_term("Te");
    sleep(Duration::from_millis(100)).await;
    search.set_term("Tes");
    sleep(Duration::from_millis(350)).await;
    search.set_term("Tesla");
    assert!(search.is_pending());

    sleep(Duration::from_millis(1000)).await;

    let fetches = gateway.calls_of(Op::List);
    assert_eq!(fetches.len(), 1);
    let fetch = &fetches[0];
    assert_eq!(fetch.query.as_ref().and_then(|q| q.search.as_deref()), Some("Tesla"));

    let elapsed = fetch.at - start;
    assert!(elapsed >= Duration::from_millis(1150), "fired too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1160), "fired too late: {elapsed:?}");
    assert!(!search.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_term_does_not_reschedule() {
    let gateway = MockGateway::new();
    let mut search = search_over(&gateway, Notifier::new());

    search.set_term("Leaf");
    sleep(Duration::from_millis(700)).await;
    search.set_term("Leaf");
    sleep(Duration::from_millis(700)).await;

    assert_eq!(gateway.calls_of(Op::List).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_discarded() {
    let gateway = MockGateway::new();
    gateway.set_search_results("Niro", vec![json!({"id": "n1", "name": "Kia Niro EV"})]);
    gateway.set_search_results("Nissan", vec![json!({"id": "l1", "name": "Nissan Leaf"})]);
    gateway.set_search_delay("Niro", Duration::from_millis(2000));
    gateway.set_search_delay("Nissan", Duration::from_millis(10));

    let mut search = search_over(&gateway, Notifier::new());

    // "Niro" goes out at 600ms and is still in flight when "Nissan" goes out
    search.set_term("Niro");
    sleep(Duration::from_millis(700)).await;
    assert_eq!(search.snapshot().status, SearchStatus::Loading);
    search.set_term("Nissan");

    sleep(Duration::from_millis(700)).await;
    let rendered = search.snapshot();
    assert_eq!(rendered.term, "Nissan");
    assert_eq!(rendered.results[0].name, "Nissan Leaf");

    // The "Niro" response lands now and must not overwrite the view
    sleep(Duration::from_millis(2000)).await;
    assert_eq!(gateway.calls_of(Op::List).len(), 2);
    let after = search.snapshot();
    assert_eq!(after.term, "Nissan");
    assert_eq!(after.results.len(), 1);
    assert_eq!(after.results[0].id, "l1");
    assert_eq!(after.status, SearchStatus::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_tesla_search_then_clear_reissues_listing() {
    let gateway = MockGateway::new();
    gateway.set_search_results("Tesla", vec![tesla()]);
    gateway.set_collection(
        voltport::gateway::ResourceKind::Products,
        vec![tesla(), json!({"id": "2", "name": "Polestar 2", "price": 49900})],
    );

    let mut search = search_over(&gateway, Notifier::new());
    let mut updates = search.subscribe();

    search.set_term("Tesla");
    sleep(DELAY + Duration::from_millis(50)).await;

    let snapshot = updates.borrow_and_update().clone();
    assert_eq!(snapshot.status, SearchStatus::Ready);
    assert_eq!(snapshot.results.len(), 1);
    let product = &snapshot.results[0];
    assert_eq!(product.id, "1");
    assert_eq!(product.name, "Tesla Model S");
    assert_eq!(product.price, 89990.0);
    assert_eq!(product.available_quantity, 3);
    assert_eq!(product.rating, 4.8);

    search.set_term("");
    sleep(DELAY + Duration::from_millis(50)).await;

    let fetches = gateway.calls_of(Op::List);
    assert_eq!(fetches.len(), 2);
    assert_eq!(fetches[1].query.as_ref().and_then(|q| q.search.clone()), None);
    assert!(!fetches[1].authenticated);
    assert_eq!(search.snapshot().results.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_search_keeps_previous_results() {
    let gateway = MockGateway::new();
    gateway.set_search_results("Tesla", vec![tesla()]);
    let notifier = Notifier::new();
    let mut search = search_over(&gateway, notifier.clone());

    search.set_term("Tesla");
    sleep(Duration::from_millis(700)).await;
    assert_eq!(search.snapshot().results.len(), 1);

    gateway.fail_with(GatewayError::Connectivity("connection refused".to_string()));
    search.set_term("Tesla Y");
    sleep(Duration::from_millis(700)).await;

    let snapshot = search.snapshot();
    assert!(matches!(snapshot.status, SearchStatus::Failed(_)));
    assert_eq!(snapshot.term, "Tesla");
    assert_eq!(snapshot.results.len(), 1);

    let toast = notifier.latest().expect("error toast");
    assert_eq!(toast.level, ToastLevel::Error);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_and_ignores_in_flight() {
    let gateway = MockGateway::new();
    gateway.set_search_results("Ioniq", vec![json!({"id": "i5", "name": "Ioniq 5"})]);
    gateway.set_search_delay("Ioniq", Duration::from_millis(500));
    let mut search = search_over(&gateway, Notifier::new());

    search.set_term("Ioniq");
    sleep(Duration::from_millis(700)).await;
    search.shutdown();
    sleep(Duration::from_millis(1000)).await;

    assert!(search.snapshot().results.is_empty());

    search.set_term("Zoe");
    sleep(Duration::from_millis(1000)).await;
    assert_eq!(gateway.calls_of(Op::List).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_pending_timer() {
    let gateway = MockGateway::new();
    {
        let mut search = search_over(&gateway, Notifier::new());
        search.set_term("Ariya");
    }
    sleep(Duration::from_millis(1000)).await;
    assert_eq!(gateway.call_count(), 0);
}
