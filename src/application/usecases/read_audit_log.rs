use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::{
    errors::DomainError, events::MessageFinalizedEvent, repositories::AuditLogRepository,
};

pub struct ReadAuditLogUseCase {
    audit_log: Arc<dyn AuditLogRepository>,
}

impl ReadAuditLogUseCase {
    pub fn new(audit_log: Arc<dyn AuditLogRepository>) -> Self {
        Self { audit_log }
    }

    /// `day` is a `YYYY-MM-DD` UTC date.
    pub async fn execute(&self, day: &str) -> anyhow::Result<Vec<MessageFinalizedEvent>> {
        let day = NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|_| DomainError::Validation(format!("invalid date '{day}', expected YYYY-MM-DD")))?;
        self.audit_log.read_day(day).await
    }
}
