//! Content Command Handlers

use std::sync::Arc;

use crate::application::commands::{RecordVisit, SubmitContact};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ContactRecord, ContactRepositoryPort, VisitCount, VisitCounterPort,
};
use crate::domain::content::ContactMessage;

// ============================================================================
// SubmitContact
// ============================================================================

/// SubmitContact Handler
pub struct SubmitContactHandler {
    contact_repo: Arc<dyn ContactRepositoryPort>,
}

impl SubmitContactHandler {
    pub fn new(contact_repo: Arc<dyn ContactRepositoryPort>) -> Self {
        Self { contact_repo }
    }

    pub async fn handle(&self, command: SubmitContact) -> Result<ContactRecord, ApplicationError> {
        let message = ContactMessage::new(&command.name, &command.email, &command.message)?;
        let record = self.contact_repo.save(&message).await?;

        tracing::info!(contact_id = record.id, "Contact message stored");

        Ok(record)
    }
}

// ============================================================================
// RecordVisit
// ============================================================================

/// RecordVisit Handler
pub struct RecordVisitHandler {
    visit_counter: Arc<dyn VisitCounterPort>,
}

impl RecordVisitHandler {
    pub fn new(visit_counter: Arc<dyn VisitCounterPort>) -> Self {
        Self { visit_counter }
    }

    pub async fn handle(&self, _command: RecordVisit) -> Result<VisitCount, ApplicationError> {
        let count = self.visit_counter.increment().await?;
        tracing::debug!(count = count.count, "Visit recorded");
        Ok(count)
    }
}
