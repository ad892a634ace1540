pub mod get_message;
pub mod get_status;
pub mod read_audit_log;
pub mod submit_message;
