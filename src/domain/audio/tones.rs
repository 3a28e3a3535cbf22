//! Audio Context - 程序化提示音合成
//!
//! 所有音色都是单声道 f32 样本：正弦波 + 指数衰减或钟形包络，
//! 部分叠加次谐波或低幅噪声。

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ToneError {
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("Tone {0} produced non-finite samples")]
    NonFinite(&'static str),
}

/// 界面提示音
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundEffect {
    Click,
    Hover,
    Success,
    Error,
    Voice,
    Download,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 6] = [
        Self::Click,
        Self::Hover,
        Self::Success,
        Self::Error,
        Self::Voice,
        Self::Download,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Hover => "hover",
            Self::Success => "success",
            Self::Error => "error",
            Self::Voice => "voice",
            Self::Download => "download",
        }
    }

    /// 时长（秒）
    pub fn duration_secs(&self) -> f32 {
        match self {
            Self::Click => 0.1,
            Self::Hover => 0.05,
            Self::Success => 0.3,
            Self::Error => 0.2,
            Self::Voice => 0.15,
            Self::Download => 0.4,
        }
    }

    /// 调用方未指定音量时使用的覆盖值
    pub fn default_volume_override(&self) -> Option<f32> {
        match self {
            Self::Hover => Some(0.1),
            _ => None,
        }
    }

    /// 按给定采样率渲染样本
    pub fn render(&self, sample_rate: u32) -> Result<Vec<f32>, ToneError> {
        if sample_rate == 0 {
            return Err(ToneError::InvalidSampleRate(sample_rate));
        }
        let sr = sample_rate as f32;
        let len = (sr * self.duration_secs()) as usize;
        let duration = self.duration_secs();

        let samples: Vec<f32> = match self {
            Self::Click => (0..len)
                .map(|i| {
                    let t = i as f32 / sr;
                    (2.0 * PI * 800.0 * t).sin() * (-t * 30.0).exp() * 0.3
                })
                .collect(),
            Self::Hover => (0..len)
                .map(|i| {
                    let t = i as f32 / sr;
                    (2.0 * PI * 1200.0 * t).sin() * (-t * 50.0).exp() * 0.15
                })
                .collect(),
            Self::Success => (0..len)
                .map(|i| {
                    let t = i as f32 / sr;
                    // C5 → E5 → G5，每个音 100ms
                    let freq = if t < 0.1 {
                        523.0
                    } else if t < 0.2 {
                        659.0
                    } else {
                        784.0
                    };
                    (2.0 * PI * freq * t).sin() * (-t * 3.0).exp() * 0.2
                })
                .collect(),
            Self::Error => (0..len)
                .map(|i| {
                    let t = i as f32 / sr;
                    let freq = 300.0 - t * 100.0;
                    (2.0 * PI * freq * t).sin() * (-t * 8.0).exp() * 0.25
                })
                .collect(),
            Self::Voice => (0..len)
                .map(|i| {
                    let t = i as f32 / sr;
                    let warmth = (2.0 * PI * 220.0 * t).sin() * 0.3;
                    ((2.0 * PI * 440.0 * t).sin() + warmth) * (-t * 15.0).exp() * 0.2
                })
                .collect(),
            Self::Download => {
                let mut rng = rand::rng();
                (0..len)
                    .map(|i| {
                        let t = i as f32 / sr;
                        let freq = 200.0 + t * 400.0;
                        let envelope = (PI * t / duration).sin();
                        let noise = (rng.random::<f32>() - 0.5) * 0.1;
                        ((2.0 * PI * freq * t).sin() + noise) * envelope * 0.15
                    })
                    .collect()
            }
        };

        if samples.iter().any(|s| !s.is_finite()) {
            return Err(ToneError::NonFinite(self.name()));
        }
        Ok(samples)
    }
}

impl std::fmt::Display for SoundEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SoundEffect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|effect| effect.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown sound effect: {}", s))
    }
}

/// 兜底通知音：A4 + C#5 叠加，`exp(-2t)·sin(πt/d)` 包络
pub fn notification_tone(sample_rate: u32, duration_secs: f32) -> Result<Vec<f32>, ToneError> {
    if sample_rate == 0 {
        return Err(ToneError::InvalidSampleRate(sample_rate));
    }
    let sr = sample_rate as f32;
    let duration = duration_secs.clamp(1.0, 3.0);
    let len = (sr * duration) as usize;

    Ok((0..len)
        .map(|i| {
            let t = i as f32 / sr;
            let envelope = (-t * 2.0).exp() * (PI * t / duration).sin();
            ((2.0 * PI * 440.0 * t).sin() * 0.3 + (2.0 * PI * 554.0 * t).sin() * 0.2) * envelope
        })
        .collect())
}
