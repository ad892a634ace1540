use std::{sync::Arc, time::Duration};

use tracing::{error, info, warn};

use crate::{
    application::services::{
        event_bus::{CompletionFeed, MessageBus},
        orchestrator::DeliveryOrchestrator,
        retry::{RetryDecision, RetryPolicy},
        stats::DeliveryStats,
    },
    domain::{
        events::MessageFinalizedEvent,
        models::{AttemptOutcome, Message, MessageStatus},
        repositories::{AuditLogRepository, MessageRepository},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent { method: String },
    Retrying { attempts: u32, delay: Duration },
    Failed { attempts: u32 },
    /// The message had already reached a terminal state.
    Skipped,
}

pub struct MessageDispatchHandler {
    orchestrator: DeliveryOrchestrator,
    retry_policy: RetryPolicy,
    message_repo: Arc<dyn MessageRepository>,
    audit_log: Arc<dyn AuditLogRepository>,
    bus: Arc<dyn MessageBus>,
    stats: Arc<DeliveryStats>,
    completions: CompletionFeed,
}

impl MessageDispatchHandler {
    pub fn new(
        orchestrator: DeliveryOrchestrator,
        retry_policy: RetryPolicy,
        message_repo: Arc<dyn MessageRepository>,
        audit_log: Arc<dyn AuditLogRepository>,
        bus: Arc<dyn MessageBus>,
        stats: Arc<DeliveryStats>,
        completions: CompletionFeed,
    ) -> Self {
        Self {
            orchestrator,
            retry_policy,
            message_repo,
            audit_log,
            bus,
            stats,
            completions,
        }
    }

    /// Runs one delivery attempt for a message popped off the queue.
    ///
    /// A message handed to this method always ends up either back on the bus
    /// or finalized. Storage and bus errors met along the way settle it with
    /// whatever state it reached instead of dropping it.
    pub async fn handle(&self, mut message: Message) -> DispatchOutcome {
        match self.process(&mut message).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    message_id = %message.id,
                    status = message.status.as_str(),
                    error = %format!("{err:#}"),
                    "dispatch interrupted, settling message"
                );
                self.settle(message, err).await
            }
        }
    }

    async fn process(&self, message: &mut Message) -> anyhow::Result<DispatchOutcome> {
        if let Some(stored) = self.message_repo.get(message.id).await? {
            if stored.status.is_terminal() {
                warn!(
                    message_id = %message.id,
                    status = stored.status.as_str(),
                    "ignoring message that is already finalized"
                );
                return Ok(DispatchOutcome::Skipped);
            }
        }

        message.begin_attempt()?;
        self.message_repo.update(message).await?;

        match self.orchestrator.attempt_send(message).await {
            AttemptOutcome::Delivered {
                method,
                channel_message_id,
            } => {
                message.mark_sent(method.clone(), channel_message_id)?;
                self.message_repo.update(message).await?;
                self.stats.record_sent();
                self.finalize(message.clone()).await;
                Ok(DispatchOutcome::Sent { method })
            }
            AttemptOutcome::Exhausted { error } => {
                let attempts = message.record_failure(error)?;
                match self.retry_policy.decide(attempts, message.max_attempts) {
                    RetryDecision::Retry { delay } => {
                        message.requeue()?;
                        self.message_repo.update(message).await?;
                        info!(
                            message_id = %message.id,
                            attempt = attempts,
                            max_attempts = message.max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = message.last_error.as_deref().unwrap_or_default(),
                            "delivery attempt failed, scheduling retry"
                        );
                        self.bus.publish_after(message.clone(), delay).await?;
                        self.stats.record_retry();
                        Ok(DispatchOutcome::Retrying { attempts, delay })
                    }
                    RetryDecision::GiveUp => {
                        message.mark_failed()?;
                        self.message_repo.update(message).await?;
                        error!(
                            message_id = %message.id,
                            attempts,
                            error = message.last_error.as_deref().unwrap_or_default(),
                            "message permanently failed"
                        );
                        self.stats.record_failed();
                        self.finalize(message.clone()).await;
                        Ok(DispatchOutcome::Failed { attempts })
                    }
                }
            }
        }
    }

    /// Finalizes a message whose dispatch was cut short. A message already
    /// delivered stays sent; anything else is failed with the interruption as
    /// its last error.
    async fn settle(&self, mut message: Message, err: anyhow::Error) -> DispatchOutcome {
        let outcome = match message.status {
            MessageStatus::Sent => {
                self.stats.record_sent();
                DispatchOutcome::Sent {
                    method: message.method.clone().unwrap_or_default(),
                }
            }
            status => {
                if status != MessageStatus::Failed {
                    message.abandon(format!("{err:#}"));
                }
                self.stats.record_failed();
                DispatchOutcome::Failed {
                    attempts: message.attempts,
                }
            }
        };

        if let Err(err) = self.message_repo.update(&message).await {
            warn!(
                message_id = %message.id,
                error = %err,
                "could not store settled message"
            );
        }
        self.finalize(message).await;
        outcome
    }

    async fn finalize(&self, message: Message) {
        let event = MessageFinalizedEvent::new(message);
        if let Err(err) = self.audit_log.append(&event).await {
            error!(
                message_id = %event.message.id,
                error = %err,
                "failed to append audit log entry"
            );
        }
        self.completions.publish(event);
    }
}
