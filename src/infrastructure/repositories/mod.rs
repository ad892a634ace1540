pub mod audit_file;
pub mod in_memory;

pub use audit_file::FileAuditLog;
pub use in_memory::{InMemoryAuditLog, InMemoryMessageRepository};
