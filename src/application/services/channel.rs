use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::models::{ChannelAvailability, Message, SendOutcome};

/// One delivery mechanism behind the uniform send contract.
///
/// Implementations map the message onto their own wire format and report
/// every transport problem through the returned [`SendOutcome`].
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the adapter's configuration (credentials, endpoint) is present.
    fn is_available(&self) -> bool;

    async fn send(&self, message: &Message) -> SendOutcome;
}

struct RegisteredChannel {
    adapter: Arc<dyn ChannelAdapter>,
    available: bool,
}

/// Adapters in fixed priority order, with availability captured once at
/// construction.
#[derive(Clone)]
pub struct ChannelRegistry {
    channels: Arc<Vec<RegisteredChannel>>,
}

impl ChannelRegistry {
    pub fn new(adapters: Vec<Arc<dyn ChannelAdapter>>) -> Self {
        let channels = adapters
            .into_iter()
            .map(|adapter| {
                let available = adapter.is_available();
                RegisteredChannel { adapter, available }
            })
            .collect();
        Self {
            channels: Arc::new(channels),
        }
    }

    /// Available adapters in the order they should be tried. A preferred
    /// channel, when available, is moved to the front.
    pub fn delivery_order(&self, preferred: Option<&str>) -> Vec<Arc<dyn ChannelAdapter>> {
        let mut ordered: Vec<Arc<dyn ChannelAdapter>> = self
            .channels
            .iter()
            .filter(|channel| channel.available)
            .map(|channel| channel.adapter.clone())
            .collect();

        if let Some(name) = preferred {
            if let Some(position) = ordered.iter().position(|adapter| adapter.name() == name) {
                let adapter = ordered.remove(position);
                ordered.insert(0, adapter);
            }
        }

        ordered
    }

    pub fn availability(&self) -> Vec<ChannelAvailability> {
        self.channels
            .iter()
            .map(|channel| ChannelAvailability {
                name: channel.adapter.name().to_string(),
                available: channel.available,
            })
            .collect()
    }
}
