//! Display pipeline tests: lost messages and a saturated queue

mod common;

use std::sync::Arc;

use common::{Published, RecordingPublisher, TestTracker};
use skirmish::combat::CombatSession;
use skirmish::display::DisplayUpdateQueue;
use skirmish::ChannelId;
use tokio::sync::Semaphore;

#[tokio::test]
async fn test_deleted_message_is_replaced() {
    let publisher = Arc::new(RecordingPublisher::new());
    let (queue, task) = DisplayUpdateQueue::spawn(publisher.clone(), 8);
    let channel = ChannelId::from("table");

    let mut session = CombatSession::new(channel.clone());
    session.add_player("p1", "Thoradin", 15).unwrap();

    queue.enqueue(channel.clone(), session.clone());
    // Let the worker post the first message before it disappears
    while publisher.calls().is_empty() {
        tokio::task::yield_now().await;
    }
    let first = publisher.calls()[0].handle().clone();
    publisher.delete(&first);

    queue.enqueue(channel.clone(), session.clone());
    queue.enqueue(channel.clone(), session);
    drop(queue);
    task.await.unwrap();

    let calls = publisher.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[1], Published::Create { .. }));
    let replacement = calls[1].handle().clone();
    assert_ne!(replacement, first);

    // The replacement is bound: later updates edit it
    assert_eq!(
        calls[2],
        Published::Edit {
            handle: replacement,
            view: calls[2].view().clone(),
        }
    );
}

#[tokio::test]
async fn test_saturated_queue_drops_updates() {
    const CAPACITY: usize = 4;

    let gate = Arc::new(Semaphore::new(0));
    let publisher = Arc::new(RecordingPublisher::gated(gate.clone()));
    let t = TestTracker::with_publisher(publisher, CAPACITY);
    let channel = ChannelId::from("table");

    t.tracker
        .add_player(&channel, "p1", "Thoradin", 15)
        .await
        .unwrap();
    t.tracker
        .add_enemy(&channel, "Ogre", 8, Some(59))
        .await
        .unwrap();

    let session = t.tracker.store().get(&channel).await.unwrap();
    let snapshot = session.lock().await.clone();

    let mut accepted = 2;
    for _ in 0..20 {
        if t.tracker.queue_display_update(&channel, &snapshot) {
            accepted += 1;
        }
    }
    // Queue slots plus at most one update held by the blocked worker
    assert!(accepted <= CAPACITY + 1);
    assert!(accepted < 22);

    // Dropped display updates never touch the session
    let update = t
        .tracker
        .apply_narrative_update(&channel, "The ogre takes damage, down to 0 hp")
        .await;
    assert!(update.applied);
    let ogre = t
        .tracker
        .session_status(&channel)
        .await
        .unwrap()
        .combatants
        .into_iter()
        .find(|c| c.name == "Ogre")
        .unwrap();
    assert_eq!(ogre.hp, "0/59");

    gate.add_permits(100);
    let calls = t.finish().await;
    assert!(calls.len() <= CAPACITY + 1);
}
