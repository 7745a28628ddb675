//! Unit tests for `WsManager`.
//!
//! These tests exercise the WebSocket connection manager directly, without
//! performing any HTTP upgrades. They verify add/remove semantics, channel
//! subscription, the per-publish visibility re-check, and graceful shutdown
//! behaviour.

use axum::extract::ws::Message;
use civicdesk_api::ws::WsManager;
use civicdesk_core::channels::ticket_channel;
use civicdesk_core::roles::Role;

fn text(s: &str) -> Message {
    Message::Text(s.into())
}

// ---------------------------------------------------------------------------
// Test: new manager starts with zero connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: add() increments the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_increments_connection_count() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string(), 1, Role::Youth).await;

    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: remove() drops the connection and its subscriptions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_drops_connection_and_subscriptions() {
    let manager = WsManager::new();
    let channel = ticket_channel(9);

    let _rx = manager.add("conn-1".to_string(), 1, Role::Youth).await;
    manager.subscribe(&channel, "conn-1").await;
    assert_eq!(manager.subscriber_count(&channel).await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
    assert_eq!(manager.subscriber_count(&channel).await, 0);
}

// ---------------------------------------------------------------------------
// Test: remove() with unknown ID is a no-op
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_unknown_id_is_noop() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string(), 1, Role::Youth).await;
    manager.remove("nonexistent").await;

    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: publish_ticket() reaches the owner-youth and assigned officer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_ticket_reaches_participants() {
    let manager = WsManager::new();
    let channel = ticket_channel(5);

    let mut youth_rx = manager.add("conn-youth".to_string(), 10, Role::Youth).await;
    let mut officer_rx = manager
        .add("conn-officer".to_string(), 20, Role::Officer)
        .await;
    manager.subscribe(&channel, "conn-youth").await;
    manager.subscribe(&channel, "conn-officer").await;

    let sent = manager
        .publish_ticket(&channel, 10, Some(20), text("update"))
        .await;
    assert_eq!(sent, 2);

    let msg = youth_rx.recv().await.expect("youth should receive");
    assert!(matches!(&msg, Message::Text(t) if *t == "update"));
    let msg = officer_rx.recv().await.expect("officer should receive");
    assert!(matches!(&msg, Message::Text(t) if *t == "update"));
}

// ---------------------------------------------------------------------------
// Test: publish_ticket() skips subscribers who lost visibility
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_ticket_skips_reassigned_officer() {
    let manager = WsManager::new();
    let channel = ticket_channel(5);

    // Officer 20 subscribed while assigned; the ticket has since moved to
    // officer 30.
    let mut old_rx = manager
        .add("conn-old".to_string(), 20, Role::Officer)
        .await;
    let mut youth_rx = manager.add("conn-youth".to_string(), 10, Role::Youth).await;
    manager.subscribe(&channel, "conn-old").await;
    manager.subscribe(&channel, "conn-youth").await;

    let sent = manager
        .publish_ticket(&channel, 10, Some(30), text("after reassign"))
        .await;
    assert_eq!(sent, 1, "only the youth should be reached");

    let msg = youth_rx.recv().await.expect("youth should receive");
    assert!(matches!(&msg, Message::Text(t) if *t == "after reassign"));
    assert!(
        old_rx.try_recv().is_err(),
        "old officer must not receive thread messages after reassignment"
    );
}

// ---------------------------------------------------------------------------
// Test: publish_ticket() never reaches a foreign youth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_ticket_skips_foreign_youth() {
    let manager = WsManager::new();
    let channel = ticket_channel(5);

    let mut other_rx = manager.add("conn-other".to_string(), 99, Role::Youth).await;
    manager.subscribe(&channel, "conn-other").await;

    let sent = manager
        .publish_ticket(&channel, 10, None, text("private"))
        .await;
    assert_eq!(sent, 0);
    assert!(other_rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: admins receive ticket channel publishes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_ticket_reaches_admin() {
    let manager = WsManager::new();
    let channel = ticket_channel(5);

    let mut admin_rx = manager.add("conn-admin".to_string(), 1, Role::Admin).await;
    manager.subscribe(&channel, "conn-admin").await;

    let sent = manager
        .publish_ticket(&channel, 10, Some(20), text("oversight"))
        .await;
    assert_eq!(sent, 1);
    let msg = admin_rx.recv().await.expect("admin should receive");
    assert!(matches!(&msg, Message::Text(t) if *t == "oversight"));
}

// ---------------------------------------------------------------------------
// Test: publish_officer() checks identity and role
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_officer_requires_matching_identity() {
    let manager = WsManager::new();

    let mut officer_rx = manager
        .add("conn-officer".to_string(), 20, Role::Officer)
        .await;
    let mut imposter_rx = manager
        .add("conn-imposter".to_string(), 99, Role::Youth)
        .await;
    manager.subscribe("notifications_20", "conn-officer").await;
    // A forged subscription to someone else's channel.
    manager.subscribe("notifications_20", "conn-imposter").await;

    let sent = manager.publish_officer(20, text("alert")).await;
    assert_eq!(sent, 1);

    let msg = officer_rx.recv().await.expect("officer should receive");
    assert!(matches!(&msg, Message::Text(t) if *t == "alert"));
    assert!(
        imposter_rx.try_recv().is_err(),
        "a forged subscription must not receive another user's alerts"
    );
}

// ---------------------------------------------------------------------------
// Test: publish to a channel with no subscribers sends nothing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_to_empty_channel_is_noop() {
    let manager = WsManager::new();

    let sent = manager
        .publish_ticket(&ticket_channel(1), 10, None, text("nobody home"))
        .await;
    assert_eq!(sent, 0);

    let sent = manager.publish_officer(20, text("nobody home")).await;
    assert_eq!(sent, 0);
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string(), 1, Role::Youth).await;
    let mut rx2 = manager.add("conn-2".to_string(), 2, Role::Officer).await;
    manager.subscribe(&ticket_channel(1), "conn-1").await;
    assert_eq!(manager.connection_count().await, 2);

    manager.shutdown_all().await;

    // Connection count and subscriptions should be zero after shutdown.
    assert_eq!(manager.connection_count().await, 0);
    assert_eq!(manager.subscriber_count(&ticket_channel(1)).await, 0);

    // Both receivers should have received a Close message.
    let msg1 = rx1.recv().await.expect("rx1 should receive Close");
    assert!(
        matches!(msg1, Message::Close(None)),
        "Expected Close(None), got: {msg1:?}"
    );

    let msg2 = rx2.recv().await.expect("rx2 should receive Close");
    assert!(
        matches!(msg2, Message::Close(None)),
        "Expected Close(None), got: {msg2:?}"
    );

    // After Close, the channel should be closed (no more messages).
    assert!(
        rx1.recv().await.is_none(),
        "Channel should be closed after shutdown"
    );
}

// ---------------------------------------------------------------------------
// Test: publish skips closed channels without panicking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_skips_closed_channels() {
    let manager = WsManager::new();
    let channel = ticket_channel(3);

    let rx1 = manager.add("conn-1".to_string(), 10, Role::Youth).await;
    let mut rx2 = manager.add("conn-2".to_string(), 20, Role::Officer).await;
    manager.subscribe(&channel, "conn-1").await;
    manager.subscribe(&channel, "conn-2").await;

    // Drop rx1 to close its channel.
    drop(rx1);

    // Publish should not panic even though conn-1's channel is closed.
    manager
        .publish_ticket(&channel, 10, Some(20), text("still alive"))
        .await;

    // conn-2 should still receive the message.
    let msg = rx2.recv().await.expect("rx2 should receive publish");
    assert!(matches!(&msg, Message::Text(t) if *t == "still alive"));
}

// ---------------------------------------------------------------------------
// Test: adding with duplicate ID replaces the previous connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_id_replaces_previous_connection() {
    let manager = WsManager::new();
    let channel = ticket_channel(7);

    let _rx_old = manager.add("conn-1".to_string(), 10, Role::Youth).await;
    assert_eq!(manager.connection_count().await, 1);

    // Re-add with the same ID -- should replace, not duplicate.
    let mut rx_new = manager.add("conn-1".to_string(), 10, Role::Youth).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.subscribe(&channel, "conn-1").await;
    manager
        .publish_ticket(&channel, 10, None, text("replaced"))
        .await;
    let msg = rx_new.recv().await.expect("New rx should receive message");
    assert!(matches!(&msg, Message::Text(t) if *t == "replaced"));
}
