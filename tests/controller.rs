mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{ids_of, scenario_stories, MockSource};
use hn_top_stories::{FetchError, LoadState, StoriesController};
use tokio::runtime::Handle;

fn controller(source: &Arc<MockSource>) -> StoriesController {
    StoriesController::new(source.clone(), 100, Handle::current())
}

#[tokio::test]
async fn starts_loading_and_settles_loaded() {
    let source = Arc::new(MockSource::new(scenario_stories()));
    let mut controller = controller(&source);

    assert!(controller.state().is_loading());
    assert!(controller.visible_stories().is_empty());

    controller.load();
    controller.settle().await;

    let stories = controller.state().stories().expect("loaded");
    assert_eq!(ids_of(stories), vec![1, 2, 3]);
    assert_eq!(controller.total_stories(), 3);
    assert_eq!(source.index_calls(), 1);
    assert_eq!(source.detail_calls(), 3);
}

#[tokio::test]
async fn query_filters_loaded_stories() {
    let source = Arc::new(MockSource::new(scenario_stories()));
    let mut controller = controller(&source);
    controller.load();
    controller.settle().await;

    controller.set_query("RUST");
    assert_eq!(controller.query(), "RUST");
    assert_eq!(ids_of(controller.visible_stories()), vec![1, 3]);

    controller.query_mut().push_str("y");
    assert_eq!(ids_of(controller.visible_stories()), vec![3]);

    controller.clear_query();
    assert_eq!(ids_of(controller.visible_stories()), vec![1, 2, 3]);
}

#[tokio::test]
async fn failed_detail_is_a_failed_state_not_a_partial_list() {
    let source = Arc::new(MockSource::new(scenario_stories()).failing(2));
    let mut controller = controller(&source);
    controller.load();
    controller.settle().await;

    let err = controller.state().error().expect("failed");
    assert!(matches!(err, FetchError::Details { id: 2, .. }));
    assert!(controller.state().stories().is_none());
    assert!(controller.visible_stories().is_empty());
    assert_eq!(controller.total_stories(), 0);
}

#[tokio::test]
async fn failed_index_skips_details() {
    let source = Arc::new(
        MockSource::new(scenario_stories()).with_index(Err(FetchError::ids("bad json"))),
    );
    let mut controller = controller(&source);
    controller.load();
    controller.settle().await;

    assert!(matches!(controller.state(), LoadState::Failed(FetchError::Ids { .. })));
    assert_eq!(source.detail_calls(), 0);
}

#[tokio::test]
async fn empty_index_is_loaded_with_no_stories() {
    let source = Arc::new(MockSource::new(vec![]));
    let mut controller = controller(&source);
    controller.load();
    controller.settle().await;

    assert_eq!(controller.state(), &LoadState::Loaded(vec![]));
}

#[tokio::test]
async fn each_id_delivery_fetches_details_once() {
    let source = Arc::new(MockSource::new(scenario_stories()));
    let mut controller = controller(&source);

    controller.load();
    controller.settle().await;
    assert_eq!(source.detail_calls(), 3);

    controller.load();
    assert!(controller.state().is_loading());
    controller.settle().await;

    assert_eq!(source.index_calls(), 2);
    assert_eq!(source.detail_calls(), 6);
    assert!(controller.state().stories().is_some());
}

#[tokio::test]
async fn superseded_cycle_never_reaches_state() {
    let source = Arc::new(MockSource::new(scenario_stories()).gated());
    let mut controller = controller(&source);

    controller.load();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(source.index_calls(), 1);

    // Restart while the first index request is still waiting
    controller.load();
    source.release(2);
    controller.settle().await;

    assert_eq!(source.index_calls(), 2);
    assert_eq!(source.detail_calls(), 3);
    assert_eq!(ids_of(controller.state().stories().unwrap()), vec![1, 2, 3]);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!controller.poll());
}

#[tokio::test]
async fn late_results_after_teardown_are_dropped() {
    let source = Arc::new(MockSource::new(scenario_stories()).gated());
    let mut controller = controller(&source);

    controller.load();
    tokio::time::sleep(Duration::from_millis(20)).await;
    controller.teardown();
    source.release(1);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!controller.poll());
    assert!(controller.is_torn_down());
    assert!(controller.state().is_loading());
    assert_eq!(source.detail_calls(), 0);

    // No further cycles once torn down
    controller.load();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(source.index_calls(), 1);
    assert!(controller.settle().await.is_loading());
}

#[tokio::test]
async fn poll_applies_events_and_wakes() {
    let source = Arc::new(MockSource::new(scenario_stories()));
    let mut controller = controller(&source);
    let wakes = Arc::new(AtomicUsize::new(0));
    let counter = wakes.clone();
    controller.set_waker(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    controller.load();
    let mut changed = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        changed |= controller.poll();
        if !controller.state().is_loading() {
            break;
        }
    }

    assert!(changed);
    assert_eq!(ids_of(controller.state().stories().unwrap()), vec![1, 2, 3]);
    // One wake for the index, one for the details
    assert_eq!(wakes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn settle_without_load_returns_immediately() {
    let source = Arc::new(MockSource::new(scenario_stories()));
    let mut controller = controller(&source);
    assert!(controller.settle().await.is_loading());
    assert_eq!(source.index_calls(), 0);
}
