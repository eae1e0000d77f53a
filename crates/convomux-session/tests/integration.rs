use std::sync::Arc;
use std::time::Duration;

use convomux_core::{AppConfig, SessionSnapshot};
use convomux_session::{decode_event, NullSink, SessionHost};
use tokio::sync::watch;

const TIMEOUT: Duration = Duration::from_secs(2);

fn make_host(toml: &str) -> SessionHost {
    let config = AppConfig::from_toml_str(toml).unwrap();
    SessionHost::new(&config, Arc::new(NullSink::new())).unwrap()
}

async fn wait_for(
    rx: &mut watch::Receiver<SessionSnapshot>,
    predicate: impl Fn(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    tokio::time::timeout(TIMEOUT, async {
        loop {
            if predicate(&rx.borrow()) {
                return rx.borrow().clone();
            }
            rx.changed().await.expect("host loop stopped");
        }
    })
    .await
    .expect("timed out waiting for snapshot")
}

#[tokio::test]
async fn test_wire_events_through_full_pipeline() {
    let mut host = make_host("");
    let mut rx = host.subscribe();
    let tx = host.event_sender();
    host.start();

    let lines = [
        r#"{"type": "session_start"}"#,
        r#"{"type": "transcription", "speaker_id": "user", "segments": [{"id": "u1", "text": "I'll have a", "created_at": 100}]}"#,
        r#"{"type": "transcription", "speaker_id": "user", "segments": [{"id": "u1", "text": "I'll have a latte with oat milk", "created_at": 100, "is_final": true}]}"#,
        r#"{"type": "chat_message", "id": "u2", "timestamp": 200, "speaker_id": "user", "text": "large please, with whipped cream"}"#,
        r#"{"type": "chat_message", "id": "a1", "timestamp": 300, "speaker_id": "agent", "text": "Perfect. Order number 482 has been saved for Sam"}"#,
    ];
    for line in lines {
        if let Some(event) = decode_event(line).unwrap() {
            tx.send(event).unwrap();
        }
    }

    let snap = wait_for(&mut rx, |s| s.order.is_complete).await;
    assert!(snap.is_live);
    assert_eq!(snap.entries.len(), 3);
    assert_eq!(snap.entries[0].text, "I'll have a latte with oat milk");
    assert_eq!(snap.order.item_type, "latte");
    assert_eq!(snap.order.size, "large");
    assert_eq!(snap.order.variant, "oat milk");
    assert_eq!(snap.order.extras, vec!["whipped cream".to_string()]);
    assert_eq!(snap.order.order_id, Some("482".to_string()));
    assert_eq!(snap.order.customer_name, "Sam");

    drop(tx);
    host.shutdown().await;
}

#[tokio::test]
async fn test_promoted_segment_deduplicated_end_to_end() {
    let mut host = make_host("");
    let mut rx = host.subscribe();
    let tx = host.event_sender();
    host.start();

    let lines = [
        r#"{"type": "transcription", "speaker_id": "agent", "segments": [{"id": "utt_5", "text": "welcome in", "created_at": 50, "is_final": true}]}"#,
        r#"{"type": "chat_message", "id": "utt_5", "timestamp": 50, "speaker_id": "agent", "text": "welcome in"}"#,
    ];
    for line in lines {
        if let Some(event) = decode_event(line).unwrap() {
            tx.send(event).unwrap();
        }
    }

    let snap = wait_for(&mut rx, |s| !s.entries.is_empty()).await;
    // Exactly one entry for the shared id, the chat-derived one
    assert_eq!(snap.entries.len(), 1);
    assert_eq!(snap.entries[0].id, "utt_5");

    drop(tx);
    host.shutdown().await;
}

#[tokio::test]
async fn test_malformed_wire_lines_are_skipped_not_fatal() {
    let mut host = make_host("");
    let mut rx = host.subscribe();
    let tx = host.event_sender();
    host.start();

    let lines = [
        r#"{"type": "chat_message", "text": "no id or timestamp"}"#,
        r#"{"type": "transcription", "segments": [{"text": "segment without id", "created_at": 10}]}"#,
        r#"{"type": "chat_message", "id": "c1", "timestamp": 20, "speaker_id": "agent", "text": "survives"}"#,
    ];
    for line in lines {
        if let Some(event) = decode_event(line).unwrap() {
            tx.send(event).unwrap();
        }
    }

    let snap = wait_for(&mut rx, |s| !s.entries.is_empty()).await;
    assert_eq!(snap.entries.len(), 1);
    assert_eq!(snap.entries[0].text, "survives");

    drop(tx);
    host.shutdown().await;
}

#[tokio::test]
async fn test_reconnect_discards_previous_session() {
    let mut host = make_host("");
    let mut rx = host.subscribe();
    let tx = host.event_sender();
    host.start();

    for line in [
        r#"{"type": "session_start"}"#,
        r#"{"type": "chat_message", "id": "c1", "timestamp": 10, "speaker_id": "user", "text": "a mocha"}"#,
        r#"{"type": "chat_message", "id": "a1", "timestamp": 20, "speaker_id": "agent", "text": "your order has been saved"}"#,
    ] {
        if let Some(event) = decode_event(line).unwrap() {
            tx.send(event).unwrap();
        }
    }
    let snap = wait_for(&mut rx, |s| s.order.is_complete).await;
    assert_eq!(snap.order.item_type, "mocha");

    // Teardown and reconnect: no carry-over, no replay
    for line in [
        r#"{"type": "session_end"}"#,
        r#"{"type": "session_start"}"#,
    ] {
        if let Some(event) = decode_event(line).unwrap() {
            tx.send(event).unwrap();
        }
    }
    let snap = wait_for(&mut rx, |s| s.is_live && s.entries.is_empty()).await;
    assert!(!snap.order.is_complete);
    assert!(snap.order.item_type.is_empty());

    drop(tx);
    host.shutdown().await;
}
