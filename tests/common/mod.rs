#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use anyhow::bail;
use async_trait::async_trait;
use courier::{
    app::DeliveryApp,
    application::{services::channel::ChannelAdapter, usecases::submit_message::SubmitMessageRequest},
    config::DeliverySettings,
    domain::{
        models::{DeliveryOptions, Message, Payload, SendOutcome},
        repositories::MessageRepository,
    },
    infrastructure::repositories::{InMemoryAuditLog, InMemoryMessageRepository},
};
use tokio::time::Instant;
use uuid::Uuid;

/// Adapter with a fixed answer that records when each send started.
pub struct ScriptedChannel {
    name: &'static str,
    succeed: bool,
    yield_before_reply: bool,
    calls: AtomicUsize,
    started: Mutex<Vec<Instant>>,
}

impl ScriptedChannel {
    pub fn succeeding(name: &'static str) -> Arc<Self> {
        Arc::new(Self::build(name, true))
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self::build(name, false))
    }

    /// Succeeds, but yields to the scheduler first so concurrent callers can interleave.
    pub fn slow(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            yield_before_reply: true,
            ..Self::build(name, true)
        })
    }

    fn build(name: &'static str, succeed: bool) -> Self {
        Self {
            name,
            succeed,
            yield_before_reply: false,
            calls: AtomicUsize::new(0),
            started: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn send_starts(&self) -> Vec<Instant> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelAdapter for ScriptedChannel {
    fn name(&self) -> &str {
        self.name
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn send(&self, message: &Message) -> SendOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.lock().unwrap().push(Instant::now());
        if self.yield_before_reply {
            tokio::task::yield_now().await;
        }
        if self.succeed {
            SendOutcome::delivered(Some(format!("{}-{}", self.name, message.id)))
        } else {
            SendOutcome::failed(format!("{} is down", self.name))
        }
    }
}

/// Adapter whose send panics.
pub struct PanickingChannel;

#[async_trait]
impl ChannelAdapter for PanickingChannel {
    fn name(&self) -> &str {
        "panicking"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn send(&self, _message: &Message) -> SendOutcome {
        panic!("adapter bug");
    }
}

/// In-memory store whose `update` fails on the listed calls (1-based).
pub struct FlakyMessageRepository {
    inner: InMemoryMessageRepository,
    failing_updates: Vec<usize>,
    updates: AtomicUsize,
}

impl FlakyMessageRepository {
    pub fn failing_updates(calls: &[usize]) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryMessageRepository::new(),
            failing_updates: calls.to_vec(),
            updates: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl MessageRepository for FlakyMessageRepository {
    async fn insert(&self, message: &Message) -> anyhow::Result<()> {
        self.inner.insert(message).await
    }

    async fn update(&self, message: &Message) -> anyhow::Result<()> {
        let call = self.updates.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_updates.contains(&call) {
            bail!("store unavailable");
        }
        self.inner.update(message).await
    }

    async fn get(&self, message_id: Uuid) -> anyhow::Result<Option<Message>> {
        self.inner.get(message_id).await
    }
}

pub fn settings() -> DeliverySettings {
    DeliverySettings {
        rate_limit: Duration::from_millis(2000),
        ..DeliverySettings::default()
    }
}

pub fn app_with(channels: Vec<Arc<dyn ChannelAdapter>>) -> DeliveryApp {
    DeliveryApp::build(&settings(), channels, Arc::new(InMemoryAuditLog::new()))
}

pub fn app_with_repository(
    channels: Vec<Arc<dyn ChannelAdapter>>,
    repository: Arc<dyn MessageRepository>,
) -> DeliveryApp {
    DeliveryApp::with_message_repository(
        &settings(),
        channels,
        Arc::new(InMemoryAuditLog::new()),
        repository,
    )
}

pub fn text_request(recipient: &str, body: &str) -> SubmitMessageRequest {
    SubmitMessageRequest {
        recipient: recipient.to_string(),
        payload: Payload::Text {
            body: body.to_string(),
        },
        options: DeliveryOptions::default(),
    }
}
