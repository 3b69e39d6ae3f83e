// End-to-end lifecycle tests for Lume Connect: rate -> match -> message
// -> unmatch, driven through the in-memory storage and directory.

use std::sync::Arc;

use lume_connect::core::{CoreError, MatchRegistry, MatchingEngine, Messenger};
use lume_connect::models::{RatingKind, SendMessageRequest};
use lume_connect::services::{MemoryDirectory, MemorySink, MemoryStore, NotificationEvent};
use uuid::Uuid;

struct Harness {
    directory: Arc<MemoryDirectory>,
    store: Arc<MemoryStore>,
    sink: Arc<MemorySink>,
    engine: MatchingEngine,
    messenger: Messenger,
}

fn harness() -> Harness {
    let directory = Arc::new(MemoryDirectory::new());
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(MemorySink::new());

    let engine = MatchingEngine::new(
        directory.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        sink.clone(),
    );
    let messenger = Messenger::new(
        directory.clone(),
        store.clone(),
        store.clone(),
        sink.clone(),
    );

    Harness {
        directory,
        store,
        sink,
        engine,
        messenger,
    }
}

fn send_req(sender: Uuid, receiver: Uuid, match_id: Uuid, content: &str) -> SendMessageRequest {
    SendMessageRequest {
        sender_id: sender,
        receiver_id: receiver,
        match_id,
        content: content.to_string(),
    }
}

#[tokio::test]
async fn test_one_sided_like_does_not_match() {
    let h = harness();
    let a = h.directory.seed("Ava").await;
    let b = h.directory.seed("Ben").await;

    let outcome = h.engine.rate_user(a, b, RatingKind::Like).await.unwrap();
    assert!(outcome.is_none());
    assert!(!h.store.exists_between(a, b).await.unwrap());
    assert!(h.sink.events().await.is_empty());
}

#[tokio::test]
async fn test_mutual_like_creates_exactly_one_match() {
    let h = harness();
    let a = h.directory.seed("Ava").await;
    let b = h.directory.seed("Ben").await;

    h.engine.rate_user(a, b, RatingKind::Like).await.unwrap();
    let created = h
        .engine
        .rate_user(b, a, RatingKind::Like)
        .await
        .unwrap()
        .expect("second like should form the match");

    // Existence is symmetric in the pair order
    assert!(h.store.exists_between(a, b).await.unwrap());
    assert!(h.store.exists_between(b, a).await.unwrap());

    // Exactly one match, visible to both participants
    assert_eq!(h.engine.matches_for_user(a, true).await.unwrap().len(), 1);
    assert_eq!(h.engine.matches_for_user(b, true).await.unwrap().len(), 1);

    // Both users were notified of the match
    let events = h.sink.events().await;
    assert_eq!(events.len(), 2);
    assert!(events.contains(&NotificationEvent::MatchCreated {
        user_id: a,
        other_user_id: b,
        match_id: created.id,
    }));
    assert!(events.contains(&NotificationEvent::MatchCreated {
        user_id: b,
        other_user_id: a,
        match_id: created.id,
    }));
}

#[tokio::test]
async fn test_re_rating_after_match_has_no_side_effects() {
    let h = harness();
    let a = h.directory.seed("Ava").await;
    let b = h.directory.seed("Ben").await;

    h.engine.rate_user(a, b, RatingKind::Like).await.unwrap();
    h.engine.rate_user(b, a, RatingKind::Like).await.unwrap();
    let events_before = h.sink.events().await.len();

    // Re-visiting the profile and rating again must not re-match or re-notify
    assert!(h.engine.rate_user(a, b, RatingKind::Like).await.unwrap().is_none());

    assert_eq!(h.engine.matches_for_user(a, true).await.unwrap().len(), 1);
    assert_eq!(h.sink.events().await.len(), events_before);
}

#[tokio::test]
async fn test_inactive_match_blocks_sends_but_not_reads() {
    let h = harness();
    let a = h.directory.seed("Ava").await;
    let b = h.directory.seed("Ben").await;

    h.engine.rate_user(a, b, RatingKind::Like).await.unwrap();
    let m = h.engine.rate_user(b, a, RatingKind::Like).await.unwrap().unwrap();

    h.messenger.send(&send_req(a, b, m.id, "hey")).await.unwrap();
    h.engine.unmatch(b, m.id).await.unwrap();

    let err = h
        .messenger
        .send(&send_req(a, b, m.id, "still there?"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::MatchNotActive(_)));

    // History of an ended match stays readable (the unmatch cleared it)
    let history = h.messenger.history(m.id, a).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_history_read_state_is_idempotent() {
    let h = harness();
    let a = h.directory.seed("Ava").await;
    let b = h.directory.seed("Ben").await;

    h.engine.rate_user(a, b, RatingKind::Like).await.unwrap();
    let m = h.engine.rate_user(b, a, RatingKind::Like).await.unwrap().unwrap();

    h.messenger.send(&send_req(a, b, m.id, "one")).await.unwrap();
    h.messenger.send(&send_req(a, b, m.id, "two")).await.unwrap();
    h.messenger.send(&send_req(b, a, m.id, "three")).await.unwrap();

    // First view flips only the messages addressed to the viewer
    let first = h.messenger.history(m.id, b).await.unwrap();
    for msg in first.iter().filter(|msg| msg.receiver_id == b) {
        assert!(msg.is_read);
    }
    assert!(!first.iter().any(|msg| msg.receiver_id == a && msg.is_read));

    // Every subsequent view reports the same read state
    let second = h.messenger.history(m.id, b).await.unwrap();
    assert_eq!(
        first.iter().map(|msg| msg.is_read).collect::<Vec<_>>(),
        second.iter().map(|msg| msg.is_read).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    let h = harness();
    let user1 = h.directory.seed("Ava").await;
    let user2 = h.directory.seed("Ben").await;

    // User 1 likes user 2: one-sided, no match yet
    assert!(h.engine.rate_user(user1, user2, RatingKind::Like).await.unwrap().is_none());

    // User 2 likes back: the match forms, exactly once
    let m = h
        .engine
        .rate_user(user2, user1, RatingKind::Like)
        .await
        .unwrap()
        .expect("mutual like should match");
    assert!(m.is_active);

    // User 1 says hi
    let message = h
        .messenger
        .send(&send_req(user1, user2, m.id, "hi"))
        .await
        .unwrap();
    assert!(!message.is_read);

    // User 2 opens the conversation: the message flips to read
    let history = h.messenger.history(m.id, user2).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].is_read);

    // User 1 unmatches: conversation gone, match deactivated
    h.engine.unmatch(user1, m.id).await.unwrap();

    let views = h.engine.matches_for_user(user1, false).await.unwrap();
    assert_eq!(views.len(), 1);
    assert!(!views[0].is_active);
    assert!(views[0].last_message.is_none());

    // A second unmatch is a no-op, not an error
    h.engine.unmatch(user2, m.id).await.unwrap();

    // And the pair cannot silently re-match: ratings are spent
    assert!(h.engine.rate_user(user1, user2, RatingKind::Like).await.unwrap().is_none());
    let m_after = h.store.by_id(m.id).await.unwrap().unwrap();
    assert!(!m_after.is_active);
}

#[tokio::test]
async fn test_non_participant_cannot_read_history() {
    let h = harness();
    let a = h.directory.seed("Ava").await;
    let b = h.directory.seed("Ben").await;
    let outsider = h.directory.seed("Cleo").await;

    h.engine.rate_user(a, b, RatingKind::Like).await.unwrap();
    let m = h.engine.rate_user(b, a, RatingKind::Like).await.unwrap().unwrap();

    h.messenger
        .send(&send_req(a, b, m.id, "our little secret"))
        .await
        .unwrap();

    let err = h.messenger.history(m.id, outsider).await.unwrap_err();

    // NotFound, not Forbidden: the response must not confirm the match
    // exists, let alone leak content
    assert!(matches!(err, CoreError::NotFound(_)));
    assert!(!err.to_string().contains("secret"));
}

#[tokio::test]
async fn test_active_only_filter() {
    let h = harness();
    let a = h.directory.seed("Ava").await;
    let b = h.directory.seed("Ben").await;
    let c = h.directory.seed("Cleo").await;

    h.engine.rate_user(a, b, RatingKind::Like).await.unwrap();
    let with_b = h.engine.rate_user(b, a, RatingKind::Like).await.unwrap().unwrap();

    h.engine.rate_user(a, c, RatingKind::Like).await.unwrap();
    h.engine.rate_user(c, a, RatingKind::Like).await.unwrap().unwrap();

    h.engine.unmatch(a, with_b.id).await.unwrap();

    assert_eq!(h.engine.matches_for_user(a, true).await.unwrap().len(), 1);
    assert_eq!(h.engine.matches_for_user(a, false).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_match_is_terminal() {
    let h = harness();
    let a = h.directory.seed("Ava").await;
    let b = h.directory.seed("Ben").await;

    h.engine.rate_user(a, b, RatingKind::Like).await.unwrap();
    let m = h.engine.rate_user(b, a, RatingKind::Like).await.unwrap().unwrap();
    h.messenger.send(&send_req(a, b, m.id, "hello")).await.unwrap();

    h.engine.delete_match(b, m.id).await.unwrap();

    assert!(h.store.by_id(m.id).await.unwrap().is_none());
    assert!(h.engine.matches_for_user(a, false).await.unwrap().is_empty());

    let err = h.messenger.history(m.id, a).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn test_match_views_are_rendered_per_caller() {
    let h = harness();
    let a = h.directory.seed("Ava").await;
    let b = h.directory.seed("Ben").await;

    h.engine.rate_user(a, b, RatingKind::Like).await.unwrap();
    let m = h.engine.rate_user(b, a, RatingKind::Like).await.unwrap().unwrap();

    h.messenger.send(&send_req(a, b, m.id, "hi Ben")).await.unwrap();

    let for_a = h.engine.match_for_user(m.id, a).await.unwrap();
    assert_eq!(for_a.matched_user.name, "Ben");
    assert_eq!(for_a.unread_count, 0);

    let for_b = h.engine.match_for_user(m.id, b).await.unwrap();
    assert_eq!(for_b.matched_user.name, "Ava");
    assert_eq!(for_b.unread_count, 1);
    assert_eq!(
        for_b.last_message.as_ref().map(|msg| msg.content.as_str()),
        Some("hi Ben")
    );

    // Message notification went to the receiver
    let events = h.sink.events().await;
    assert!(events.contains(&NotificationEvent::MessageSent {
        receiver_id: b,
        sender_id: a,
        match_id: m.id,
    }));
}
