use chrono::{NaiveDate, TimeZone, Utc};
use courier::{
    domain::{
        events::MessageFinalizedEvent,
        models::{DeliveryOptions, Message, MessageStatus, Payload},
        repositories::AuditLogRepository,
        value_objects::Recipient,
    },
    infrastructure::repositories::FileAuditLog,
};

fn finalized(body: &str, day: u32) -> MessageFinalizedEvent {
    let mut message = Message::new(
        Recipient::parse("919876543210", "91").unwrap(),
        Payload::Text {
            body: body.to_string(),
        },
        DeliveryOptions::default(),
        3,
    );
    message.begin_attempt().unwrap();
    message.mark_sent("mock".to_string(), None).unwrap();

    let mut event = MessageFinalizedEvent::new(message);
    event.logged_at = Utc.with_ymd_and_hms(2026, 10, day, 12, 0, 0).unwrap();
    event
}

#[tokio::test]
async fn entries_are_partitioned_by_day() {
    let dir = tempfile::tempdir().unwrap();
    let log = FileAuditLog::new(dir.path().join("messages"));

    let first = finalized("first", 18);
    let second = finalized("second", 19);
    let third = finalized("third", 19);
    for event in [&first, &second, &third] {
        log.append(event).await.unwrap();
    }

    let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    assert!(log.partition_path(day).ends_with("messages-2026-10-19.jsonl"));
    assert!(log.partition_path(day).exists());

    let entries = log.read_day(day).await.unwrap();
    assert_eq!(
        entries.iter().map(|e| e.message.id).collect::<Vec<_>>(),
        vec![second.message.id, third.message.id]
    );
    assert_eq!(entries[0].status(), MessageStatus::Sent);
    assert_eq!(entries[0].message.method.as_deref(), Some("mock"));

    let earlier = log
        .read_day(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
        .await
        .unwrap();
    assert_eq!(earlier.len(), 1);
    assert_eq!(earlier[0].message.id, first.message.id);
}

#[tokio::test]
async fn missing_partition_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let log = FileAuditLog::new(dir.path());

    let entries = log
        .read_day(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
        .await
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn unreadable_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let log = FileAuditLog::new(dir.path());
    let event = finalized("kept", 19);
    log.append(&event).await.unwrap();

    let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let path = log.partition_path(day);
    let mut contents = std::fs::read_to_string(&path).unwrap();
    contents.push_str("{not json\n");
    std::fs::write(&path, contents).unwrap();

    let entries = log.read_day(day).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message.id, event.message.id);
}
