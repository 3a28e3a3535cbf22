//! Sound Command Handlers

use std::sync::Arc;

use crate::application::commands::{PlaySound, UpdateSoundSettings};
use crate::application::sound_bank::{SoundBank, SoundSettings};

/// PlaySound Handler
pub struct PlaySoundHandler {
    sounds: Arc<SoundBank>,
}

impl PlaySoundHandler {
    pub fn new(sounds: Arc<SoundBank>) -> Self {
        Self { sounds }
    }

    /// 即发即忘；失败只记录日志
    pub fn handle(&self, command: PlaySound) {
        self.sounds.play(command.effect, command.volume);
    }
}

/// UpdateSoundSettings Handler
pub struct UpdateSoundSettingsHandler {
    sounds: Arc<SoundBank>,
}

impl UpdateSoundSettingsHandler {
    pub fn new(sounds: Arc<SoundBank>) -> Self {
        Self { sounds }
    }

    pub fn handle(&self, command: UpdateSoundSettings) -> SoundSettings {
        if let Some(volume) = command.volume {
            self.sounds.set_volume(volume);
        }
        if let Some(enabled) = command.enabled {
            self.sounds.set_enabled(enabled);
        }

        let settings = self.sounds.settings();
        tracing::info!(
            enabled = settings.enabled,
            volume = settings.volume,
            "Sound settings updated"
        );
        settings
    }
}
