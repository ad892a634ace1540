//! In-process delivery queue and its single drain worker.

use std::{
    future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use anyhow::Context;
use async_trait::async_trait;
use tokio::{
    sync::{Mutex, Notify},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval, sleep_until},
};
use tokio_stream::{StreamExt, wrappers::IntervalStream};
use tracing::{debug, info};

use crate::{
    application::{
        handlers::message_dispatcher::MessageDispatchHandler,
        services::{
            delivery_queue::DeliveryQueue,
            event_bus::{MessageBus, QueueMonitor},
            rate_limiter::RateLimiter,
        },
    },
    domain::models::Message,
};

const MIN_TICK: Duration = Duration::from_millis(1);
const MAX_TICK: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Default)]
pub struct LocalQueue {
    queue: Mutex<DeliveryQueue>,
    wake: Notify,
    processing: AtomicBool,
}

impl LocalQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    async fn has_ready(&self) -> bool {
        let queue = self.queue.lock().await;
        queue.ready_len() > 0 || queue.next_ready_at().is_some_and(|at| at <= Instant::now())
    }

    async fn pop_ready(&self) -> Option<Message> {
        self.queue.lock().await.pop_ready(Instant::now())
    }

    async fn next_ready_at(&self) -> Option<Instant> {
        self.queue.lock().await.next_ready_at()
    }
}

#[async_trait]
impl MessageBus for LocalQueue {
    async fn publish(&self, message: Message) -> anyhow::Result<usize> {
        let position = self.queue.lock().await.push(message);
        self.wake.notify_one();
        Ok(position)
    }

    async fn publish_after(&self, message: Message, delay: Duration) -> anyhow::Result<()> {
        let ready_at = Instant::now()
            .checked_add(delay)
            .context("retry delay is out of range")?;
        self.queue.lock().await.push_delayed(message, ready_at);
        // the worker may be sleeping towards a later deadline
        self.wake.notify_one();
        Ok(())
    }
}

#[async_trait]
impl QueueMonitor for LocalQueue {
    async fn depth(&self) -> usize {
        self.queue.lock().await.len()
    }

    fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }
}

struct ProcessingGuard<'a>(&'a AtomicBool);

impl<'a> ProcessingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct LocalQueueWorker {
    queue: Arc<LocalQueue>,
    handler: Arc<MessageDispatchHandler>,
    limiter: Mutex<RateLimiter>,
    tick: Duration,
}

impl LocalQueueWorker {
    pub fn new(
        queue: Arc<LocalQueue>,
        handler: Arc<MessageDispatchHandler>,
        rate_limit: Duration,
        tick: Duration,
    ) -> Self {
        Self {
            queue,
            handler,
            limiter: Mutex::new(RateLimiter::new(rate_limit)),
            tick: tick.clamp(MIN_TICK, MAX_TICK),
        }
    }

    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(&self) {
        info!(
            tick_ms = self.tick.as_millis() as u64,
            "delivery worker started"
        );
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(ticker);

        loop {
            self.drain().await;

            let next_retry = self.queue.next_ready_at().await;
            let retry_due = async {
                match next_retry {
                    Some(at) => sleep_until(at).await,
                    None => future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = self.queue.wake.notified() => {}
                _ = ticks.next() => {}
                _ = retry_due => {}
            }
        }
    }

    /// Processes ready messages until none is left and returns how many were
    /// handled. Returns 0 immediately if another drain is already running.
    pub async fn drain(&self) -> usize {
        let Some(_guard) = ProcessingGuard::acquire(&self.queue.processing) else {
            debug!("drain already in progress");
            return 0;
        };

        let mut limiter = self.limiter.lock().await;
        let mut handled = 0;

        while self.queue.has_ready().await {
            limiter.wait_turn().await;
            let Some(message) = self.queue.pop_ready().await else {
                break;
            };
            limiter.mark_start();

            let message_id = message.id;
            let outcome = self.handler.handle(message).await;
            debug!(%message_id, ?outcome, "message dispatched");
            handled += 1;
        }

        handled
    }
}
