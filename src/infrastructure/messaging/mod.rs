pub mod local_queue;

pub use local_queue::{LocalQueue, LocalQueueWorker};
