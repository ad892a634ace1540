pub mod channel;
pub mod delivery_queue;
pub mod event_bus;
pub mod orchestrator;
pub mod rate_limiter;
pub mod retry;
pub mod stats;
