pub mod channel;
pub mod message;

pub use channel::{AttemptOutcome, ChannelAvailability, SendOutcome};
pub use message::{
    DEFAULT_MAX_ATTEMPTS, DeliveryOptions, Message, MessageStatus, Payload, Priority,
};
