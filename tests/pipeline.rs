mod common;

use std::{sync::Arc, time::Duration};

use courier::{
    app::DeliveryApp,
    application::{
        handlers::message_dispatcher::{DispatchOutcome, MessageDispatchHandler},
        services::{
            channel::{ChannelAdapter, ChannelRegistry},
            event_bus::CompletionFeed,
            orchestrator::{DeliveryOrchestrator, NO_AVAILABLE_METHODS},
            retry::RetryPolicy,
            stats::DeliveryStats,
        },
        usecases::submit_message::SubmitMessageRequest,
    },
    config::DeliverySettings,
    domain::{
        errors::DomainError,
        models::{DeliveryOptions, Message, MessageStatus, Payload, Priority},
        repositories::MessageRepository,
        value_objects::Recipient,
    },
    infrastructure::{
        channels::MockChannel,
        messaging::LocalQueue,
        repositories::{InMemoryAuditLog, InMemoryMessageRepository},
    },
};
use tokio::time::Instant;

use common::{
    FlakyMessageRepository, PanickingChannel, ScriptedChannel, app_with, app_with_repository,
    settings, text_request,
};

#[tokio::test(start_paused = true)]
async fn mock_channel_delivers_a_text_message() {
    let app = app_with(vec![Arc::new(MockChannel::new(true)) as Arc<dyn ChannelAdapter>]);
    let mut completions = app.subscribe();
    let worker = app.start();

    let response = app
        .submit_message
        .execute(text_request("9876543210", "Hello"))
        .await
        .unwrap();
    assert_eq!(response.status, MessageStatus::Queued);
    assert_eq!(response.queue_position, 1);

    let event = completions.recv().await.unwrap();
    assert_eq!(event.message.id, response.message_id);
    assert_eq!(event.status(), MessageStatus::Sent);
    assert_eq!(event.message.method.as_deref(), Some("mock"));
    assert_eq!(event.message.recipient.as_str(), "919876543210");
    assert_eq!(event.message.attempts, 0);
    assert!(event.message.sent_at.is_some());

    let stored = app.get_message.execute(response.message_id).await.unwrap();
    assert_eq!(stored.status, MessageStatus::Sent);

    let day = event.logged_at.date_naive().format("%Y-%m-%d").to_string();
    let audit = app.read_audit_log.execute(&day).await.unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].message.id, response.message_id);

    let status = app.get_status.execute().await;
    assert_eq!(status.stats.sent, 1);
    assert_eq!(status.stats.queued, 1);
    assert_eq!(status.queue_length, 0);

    worker.abort();
}

#[tokio::test(start_paused = true)]
async fn message_fails_after_bounded_attempts_with_backoff() {
    let channel = ScriptedChannel::failing("primary");
    let app = app_with(vec![channel.clone() as Arc<dyn ChannelAdapter>]);
    let mut completions = app.subscribe();

    let response = app
        .submit_message
        .execute(text_request("+919876543210", "Hello"))
        .await
        .unwrap();

    let started = Instant::now();
    let worker = app.start();
    let event = completions.recv().await.unwrap();

    assert_eq!(event.message.id, response.message_id);
    assert_eq!(event.status(), MessageStatus::Failed);
    assert_eq!(event.message.attempts, 3);
    assert_eq!(event.message.last_error.as_deref(), Some(NO_AVAILABLE_METHODS));
    assert!(event.message.method.is_none());

    // attempts at t0, t0 + 2s and t0 + 6s
    let starts = channel.send_starts();
    assert_eq!(starts.len(), 3);
    assert_close(starts[0] - started, Duration::ZERO);
    assert_close(starts[1] - starts[0], Duration::from_secs(2));
    assert_close(starts[2] - starts[1], Duration::from_secs(4));

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(channel.calls(), 3);

    let status = app.get_status.execute().await;
    assert_eq!(status.stats.failed, 1);
    assert_eq!(status.stats.retried, 2);
    assert_eq!(status.stats.sent, 0);
    assert_eq!(status.queue_length, 0);

    worker.abort();
}

fn assert_close(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(50),
        "expected about {expected:?}, got {actual:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn panicking_channel_does_not_stop_the_worker() {
    let app = app_with(vec![
        Arc::new(PanickingChannel) as Arc<dyn ChannelAdapter>,
        Arc::new(MockChannel::new(true)),
    ]);
    let mut completions = app.subscribe();
    let worker = app.start();

    for _ in 0..2 {
        let response = app
            .submit_message
            .execute(text_request("9876543210", "Hello"))
            .await
            .unwrap();

        let event = completions.recv().await.unwrap();
        assert_eq!(event.message.id, response.message_id);
        assert_eq!(event.status(), MessageStatus::Sent);
        assert_eq!(event.message.method.as_deref(), Some("mock"));
    }

    assert!(!worker.is_finished());
    assert_eq!(app.get_status.execute().await.stats.sent, 2);

    worker.abort();
}

#[tokio::test(start_paused = true)]
async fn store_failure_after_delivery_still_finalizes_as_sent() {
    // second update is the one persisting the sent state
    let repository = FlakyMessageRepository::failing_updates(&[2]);
    let app = app_with_repository(
        vec![Arc::new(MockChannel::new(true)) as Arc<dyn ChannelAdapter>],
        repository,
    );
    let mut completions = app.subscribe();
    let worker = app.start();

    let response = app
        .submit_message
        .execute(text_request("9876543210", "Hello"))
        .await
        .unwrap();

    let event = completions.recv().await.unwrap();
    assert_eq!(event.message.id, response.message_id);
    assert_eq!(event.status(), MessageStatus::Sent);

    let stored = app.get_message.execute(response.message_id).await.unwrap();
    assert_eq!(stored.status, MessageStatus::Sent);

    let day = event.logged_at.date_naive().format("%Y-%m-%d").to_string();
    assert_eq!(app.read_audit_log.execute(&day).await.unwrap().len(), 1);

    let status = app.get_status.execute().await;
    assert_eq!(status.stats.sent, 1);
    assert_eq!(status.stats.failed, 0);
    assert_eq!(status.queue_length, 0);

    worker.abort();
}

#[tokio::test(start_paused = true)]
async fn store_failure_before_sending_fails_the_message() {
    let channel = ScriptedChannel::succeeding("primary");
    let repository = FlakyMessageRepository::failing_updates(&[1]);
    let app = app_with_repository(vec![channel.clone() as Arc<dyn ChannelAdapter>], repository);
    let mut completions = app.subscribe();
    let worker = app.start();

    let response = app
        .submit_message
        .execute(text_request("9876543210", "Hello"))
        .await
        .unwrap();

    let event = completions.recv().await.unwrap();
    assert_eq!(event.message.id, response.message_id);
    assert_eq!(event.status(), MessageStatus::Failed);
    assert!(
        event
            .message
            .last_error
            .as_deref()
            .is_some_and(|error| error.contains("store unavailable"))
    );
    assert_eq!(channel.calls(), 0);

    let stored = app.get_message.execute(response.message_id).await.unwrap();
    assert_eq!(stored.status, MessageStatus::Failed);
    assert_eq!(app.get_status.execute().await.stats.failed, 1);

    worker.abort();
}

#[tokio::test(start_paused = true)]
async fn zero_tick_is_tolerated() {
    let app = DeliveryApp::build(
        &DeliverySettings {
            tick: Duration::ZERO,
            ..settings()
        },
        vec![Arc::new(MockChannel::new(true)) as Arc<dyn ChannelAdapter>],
        Arc::new(InMemoryAuditLog::new()),
    );
    let mut completions = app.subscribe();
    let worker = app.start();

    app.submit_message
        .execute(text_request("9876543210", "Hello"))
        .await
        .unwrap();

    assert_eq!(completions.recv().await.unwrap().status(), MessageStatus::Sent);
    assert!(!worker.is_finished());

    worker.abort();
}

#[tokio::test(start_paused = true)]
async fn falls_back_to_the_next_channel_within_one_attempt() {
    let primary = ScriptedChannel::failing("primary");
    let secondary = ScriptedChannel::succeeding("secondary");
    let app = app_with(vec![
        primary.clone() as Arc<dyn ChannelAdapter>,
        secondary.clone(),
    ]);
    let mut completions = app.subscribe();
    let worker = app.start();

    app.submit_message
        .execute(text_request("919876543210", "Hello"))
        .await
        .unwrap();

    let event = completions.recv().await.unwrap();
    assert_eq!(event.status(), MessageStatus::Sent);
    assert_eq!(event.message.method.as_deref(), Some("secondary"));
    assert_eq!(event.message.attempts, 0);
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);

    worker.abort();
}

#[tokio::test(start_paused = true)]
async fn sends_are_spaced_by_the_rate_limit() {
    let channel = ScriptedChannel::succeeding("recording");
    let app = app_with(vec![channel.clone() as Arc<dyn ChannelAdapter>]);
    let mut completions = app.subscribe();

    for n in 0..5 {
        app.submit_message
            .execute(text_request("919876543210", &format!("message {n}")))
            .await
            .unwrap();
    }

    let started = Instant::now();
    let worker = app.start();
    for _ in 0..5 {
        let event = completions.recv().await.unwrap();
        assert_eq!(event.status(), MessageStatus::Sent);
    }

    assert!(started.elapsed() >= Duration::from_secs(8));
    let starts = channel.send_starts();
    assert_eq!(starts.len(), 5);
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(2000));
    }

    worker.abort();
}

#[tokio::test(start_paused = true)]
async fn high_priority_messages_jump_ahead_of_normal_ones() {
    let app = app_with(vec![Arc::new(MockChannel::new(true)) as Arc<dyn ChannelAdapter>]);
    let mut completions = app.subscribe();

    let first = app
        .submit_message
        .execute(text_request("919876543210", "first"))
        .await
        .unwrap();
    let second = app
        .submit_message
        .execute(text_request("919876543210", "second"))
        .await
        .unwrap();
    let urgent = app
        .submit_message
        .execute(SubmitMessageRequest {
            options: DeliveryOptions {
                priority: Priority::High,
                preferred_channel: None,
            },
            ..text_request("919876543210", "urgent")
        })
        .await
        .unwrap();
    assert_eq!(urgent.queue_position, 1);

    let worker = app.start();
    let mut order = Vec::new();
    for _ in 0..3 {
        order.push(completions.recv().await.unwrap().message.id);
    }
    assert_eq!(
        order,
        vec![urgent.message_id, first.message_id, second.message_id]
    );

    worker.abort();
}

#[tokio::test(start_paused = true)]
async fn preferred_channel_is_tried_first() {
    let primary = ScriptedChannel::succeeding("primary");
    let secondary = ScriptedChannel::succeeding("secondary");
    let app = app_with(vec![
        primary.clone() as Arc<dyn ChannelAdapter>,
        secondary.clone(),
    ]);
    let mut completions = app.subscribe();
    let worker = app.start();

    app.submit_message
        .execute(SubmitMessageRequest {
            options: DeliveryOptions {
                priority: Priority::Normal,
                preferred_channel: Some("secondary".to_string()),
            },
            ..text_request("919876543210", "Hello")
        })
        .await
        .unwrap();

    let event = completions.recv().await.unwrap();
    assert_eq!(event.message.method.as_deref(), Some("secondary"));
    assert_eq!(primary.calls(), 0);

    worker.abort();
}

#[tokio::test]
async fn concurrent_drains_send_each_message_once() {
    let channel = ScriptedChannel::slow("slow");
    let app = app_with(vec![channel.clone() as Arc<dyn ChannelAdapter>]);

    app.submit_message
        .execute(text_request("919876543210", "Hello"))
        .await
        .unwrap();

    let (first, second) = tokio::join!(app.worker.drain(), app.worker.drain());

    assert_eq!(first + second, 1);
    assert_eq!(channel.calls(), 1);
    assert!(!app.get_status.execute().await.processing);
}

#[tokio::test]
async fn finalized_message_is_not_sent_again() {
    let channel = ScriptedChannel::succeeding("primary");
    let repo = Arc::new(InMemoryMessageRepository::new());
    let handler = MessageDispatchHandler::new(
        DeliveryOrchestrator::new(ChannelRegistry::new(vec![
            channel.clone() as Arc<dyn ChannelAdapter>,
        ])),
        RetryPolicy::default(),
        repo.clone(),
        Arc::new(InMemoryAuditLog::new()),
        LocalQueue::new(),
        Arc::new(DeliveryStats::default()),
        CompletionFeed::default(),
    );

    let message = Message::new(
        Recipient::parse("919876543210", "91").unwrap(),
        Payload::Text {
            body: "Hello".to_string(),
        },
        DeliveryOptions::default(),
        3,
    );
    let message_id = message.id;
    repo.insert(&message).await.unwrap();
    let stale_copy = message.clone();

    let outcome = handler.handle(message).await;
    assert_eq!(
        outcome,
        DispatchOutcome::Sent {
            method: "primary".to_string()
        }
    );

    let outcome = handler.handle(stale_copy).await;
    assert_eq!(outcome, DispatchOutcome::Skipped);
    assert_eq!(channel.calls(), 1);

    let stored = repo.get(message_id).await.unwrap().unwrap();
    assert_eq!(stored.status, MessageStatus::Sent);
}

#[tokio::test]
async fn malformed_submissions_are_rejected_before_queueing() {
    let app = app_with(vec![Arc::new(MockChannel::new(true)) as Arc<dyn ChannelAdapter>]);

    let err = app
        .submit_message
        .execute(text_request("not-a-number", "Hello"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::Validation(_))
    ));

    let err = app
        .submit_message
        .execute(text_request("919876543210", "   "))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::Validation(_))
    ));

    let status = app.get_status.execute().await;
    assert_eq!(status.queue_length, 0);
    assert_eq!(status.stats.queued, 0);
}

#[tokio::test]
async fn unknown_message_is_not_found() {
    let app = app_with(vec![]);

    let err = app.get_message.execute(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::NotFound(_))
    ));
}

#[tokio::test]
async fn status_reports_channels_and_backlog() {
    let app = app_with(vec![
        Arc::new(MockChannel::new(false)) as Arc<dyn ChannelAdapter>,
        ScriptedChannel::succeeding("primary"),
    ]);

    for _ in 0..2 {
        app.submit_message
            .execute(text_request("919876543210", "Hello"))
            .await
            .unwrap();
    }

    let status = app.get_status.execute().await;
    assert_eq!(status.queue_length, 2);
    assert!(!status.processing);
    assert_eq!(status.stats.queued, 2);
    assert_eq!(
        status
            .channels
            .iter()
            .map(|channel| (channel.name.as_str(), channel.available))
            .collect::<Vec<_>>(),
        vec![("mock", false), ("primary", true)]
    );
}

#[tokio::test]
async fn audit_log_rejects_malformed_dates() {
    let app = app_with(vec![]);

    let err = app.read_audit_log.execute("19-10-2026").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::Validation(_))
    ));
}
