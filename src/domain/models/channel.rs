use serde::{Deserialize, Serialize};

/// Uniform result of handing a message to one channel adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    pub success: bool,
    pub channel_message_id: Option<String>,
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn delivered(channel_message_id: Option<String>) -> Self {
        Self {
            success: true,
            channel_message_id,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            channel_message_id: None,
            error: Some(error.into()),
        }
    }

    /// Collapses an adapter's internal result into the boundary outcome.
    pub fn from_result(result: anyhow::Result<Option<String>>) -> Self {
        match result {
            Ok(id) => Self::delivered(id),
            Err(err) => Self::failed(format!("{err:#}")),
        }
    }
}

/// Result of one orchestrated delivery attempt across all channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Delivered {
        method: String,
        channel_message_id: Option<String>,
    },
    Exhausted {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAvailability {
    pub name: String,
    pub available: bool,
}
