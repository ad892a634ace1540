//! Composition root: wires one delivery pipeline from its collaborators.

use std::sync::Arc;

use tokio::{sync::broadcast, task::JoinHandle};

use crate::{
    application::{
        handlers::message_dispatcher::MessageDispatchHandler,
        services::{
            channel::{ChannelAdapter, ChannelRegistry},
            event_bus::{CompletionFeed, MessageBus, QueueMonitor},
            orchestrator::DeliveryOrchestrator,
            stats::DeliveryStats,
        },
        usecases::{
            get_message::GetMessageUseCase,
            get_status::GetDeliveryStatusUseCase,
            read_audit_log::ReadAuditLogUseCase,
            submit_message::{SubmitMessageConfig, SubmitMessageUseCase},
        },
    },
    config::DeliverySettings,
    domain::{
        events::MessageFinalizedEvent,
        repositories::{AuditLogRepository, MessageRepository},
    },
    infrastructure::{
        messaging::{LocalQueue, LocalQueueWorker},
        repositories::InMemoryMessageRepository,
    },
};

/// Handles to a fully wired pipeline. Build once at startup and share.
pub struct DeliveryApp {
    pub submit_message: Arc<SubmitMessageUseCase>,
    pub get_status: Arc<GetDeliveryStatusUseCase>,
    pub get_message: Arc<GetMessageUseCase>,
    pub read_audit_log: Arc<ReadAuditLogUseCase>,
    pub worker: Arc<LocalQueueWorker>,
    completions: CompletionFeed,
}

impl DeliveryApp {
    pub fn build(
        settings: &DeliverySettings,
        channels: Vec<Arc<dyn ChannelAdapter>>,
        audit_log: Arc<dyn AuditLogRepository>,
    ) -> Self {
        Self::with_message_repository(
            settings,
            channels,
            audit_log,
            Arc::new(InMemoryMessageRepository::new()),
        )
    }

    pub fn with_message_repository(
        settings: &DeliverySettings,
        channels: Vec<Arc<dyn ChannelAdapter>>,
        audit_log: Arc<dyn AuditLogRepository>,
        message_repo: Arc<dyn MessageRepository>,
    ) -> Self {
        let registry = ChannelRegistry::new(channels);
        let queue = LocalQueue::new();
        let stats = Arc::new(DeliveryStats::default());
        let completions = CompletionFeed::default();

        let handler = Arc::new(MessageDispatchHandler::new(
            DeliveryOrchestrator::new(registry.clone()),
            settings.retry.clone(),
            message_repo.clone(),
            audit_log.clone(),
            queue.clone() as Arc<dyn MessageBus>,
            stats.clone(),
            completions.clone(),
        ));
        let worker = Arc::new(LocalQueueWorker::new(
            queue.clone(),
            handler,
            settings.rate_limit,
            settings.tick,
        ));

        let submit_message = Arc::new(SubmitMessageUseCase::new(
            message_repo.clone(),
            queue.clone() as Arc<dyn MessageBus>,
            stats.clone(),
            SubmitMessageConfig {
                max_attempts: settings.retry.max_attempts,
                default_country_code: settings.default_country_code.clone(),
            },
        ));
        let get_status = Arc::new(GetDeliveryStatusUseCase::new(
            registry,
            queue as Arc<dyn QueueMonitor>,
            stats,
        ));

        Self {
            submit_message,
            get_status,
            get_message: Arc::new(GetMessageUseCase::new(message_repo)),
            read_audit_log: Arc::new(ReadAuditLogUseCase::new(audit_log)),
            worker,
            completions,
        }
    }

    /// Starts the background drain loop.
    pub fn start(&self) -> JoinHandle<()> {
        self.worker.clone().spawn()
    }

    /// Receives every terminal outcome produced after subscribing.
    pub fn subscribe(&self) -> broadcast::Receiver<MessageFinalizedEvent> {
        self.completions.subscribe()
    }
}
