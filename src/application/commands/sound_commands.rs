//! Sound Commands

use crate::domain::audio::SoundEffect;

/// 播放提示音
#[derive(Debug, Clone)]
pub struct PlaySound {
    pub effect: SoundEffect,
    pub volume: Option<f32>,
}

/// 修改提示音设置
#[derive(Debug, Clone, Default)]
pub struct UpdateSoundSettings {
    pub volume: Option<f32>,
    pub enabled: Option<bool>,
}
