//! Narration Query Handlers

use std::sync::Arc;

use crate::application::narration::{NarrationStatus, Narrator};
use crate::application::queries::GetNarrationStatus;

/// GetNarrationStatus Handler
pub struct GetNarrationStatusHandler {
    narrator: Arc<Narrator>,
}

impl GetNarrationStatusHandler {
    pub fn new(narrator: Arc<Narrator>) -> Self {
        Self { narrator }
    }

    pub fn handle(&self, _query: GetNarrationStatus) -> NarrationStatus {
        self.narrator.status()
    }
}
