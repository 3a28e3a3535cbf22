//! Sound Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::queries::GetSoundWav;
use crate::application::sound_bank::SoundBank;

/// GetSoundWav Handler
pub struct GetSoundWavHandler {
    sounds: Arc<SoundBank>,
}

impl GetSoundWavHandler {
    pub fn new(sounds: Arc<SoundBank>) -> Self {
        Self { sounds }
    }

    pub fn handle(&self, query: GetSoundWav) -> Result<Vec<u8>, ApplicationError> {
        Ok(self.sounds.render_wav(query.effect)?)
    }
}
