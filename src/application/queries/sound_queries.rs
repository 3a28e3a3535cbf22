//! Sound Queries

use crate::domain::audio::SoundEffect;

/// 以 WAV 获取提示音
#[derive(Debug, Clone)]
pub struct GetSoundWav {
    pub effect: SoundEffect,
}
