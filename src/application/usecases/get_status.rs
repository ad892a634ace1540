use std::sync::Arc;

use crate::{
    application::services::{
        channel::ChannelRegistry,
        event_bus::QueueMonitor,
        stats::{DeliveryStats, StatsSnapshot},
    },
    domain::models::ChannelAvailability,
};

#[derive(Debug, Clone)]
pub struct DeliveryStatus {
    pub channels: Vec<ChannelAvailability>,
    pub stats: StatsSnapshot,
    pub queue_length: usize,
    pub processing: bool,
}

pub struct GetDeliveryStatusUseCase {
    registry: ChannelRegistry,
    queue: Arc<dyn QueueMonitor>,
    stats: Arc<DeliveryStats>,
}

impl GetDeliveryStatusUseCase {
    pub fn new(
        registry: ChannelRegistry,
        queue: Arc<dyn QueueMonitor>,
        stats: Arc<DeliveryStats>,
    ) -> Self {
        Self {
            registry,
            queue,
            stats,
        }
    }

    pub async fn execute(&self) -> DeliveryStatus {
        DeliveryStatus {
            channels: self.registry.availability(),
            stats: self.stats.snapshot(),
            queue_length: self.queue.depth().await,
            processing: self.queue.is_processing(),
        }
    }
}
