//! Sound Bank - 界面提示音
//!
//! 首次使用时打开输出上下文，预先渲染全部音色；之后每次播放都是
//! 即发即忘，互相叠加。任何失败只记录日志，不向调用方返回错误。

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::{debug, info, warn};

use crate::application::ports::{ToneOutputFactory, ToneOutputPort};
use crate::domain::audio::{encode_wav, SoundEffect, ToneError};

/// 提示音配置
#[derive(Debug, Clone)]
pub struct SoundBankConfig {
    pub enabled: bool,
    pub volume: f32,
    /// 没有输出设备时的渲染采样率
    pub sample_rate: u32,
}

impl Default for SoundBankConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.3,
            sample_rate: 44100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoundSettings {
    pub enabled: bool,
    pub volume: f32,
}

struct PreparedBank {
    sample_rate: u32,
    tones: HashMap<SoundEffect, Arc<[f32]>>,
}

pub struct SoundBank {
    factory: Arc<dyn ToneOutputFactory>,
    output: OnceLock<Option<Arc<dyn ToneOutputPort>>>,
    bank: RwLock<Option<PreparedBank>>,
    default_rate: u32,
    /// f32 位模式
    volume: AtomicU32,
    enabled: AtomicBool,
}

impl SoundBank {
    pub fn new(config: SoundBankConfig, factory: Arc<dyn ToneOutputFactory>) -> Self {
        Self {
            factory,
            output: OnceLock::new(),
            bank: RwLock::new(None),
            default_rate: config.sample_rate,
            volume: AtomicU32::new(config.volume.clamp(0.0, 1.0).to_bits()),
            enabled: AtomicBool::new(config.enabled),
        }
    }

    /// 打开输出上下文，幂等；没有设备时静默降级
    pub fn warm_up(&self) -> Option<Arc<dyn ToneOutputPort>> {
        self.output
            .get_or_init(|| match self.factory.open() {
                Ok(output) => {
                    info!(sample_rate = output.sample_rate(), "Sound output opened");
                    Some(output)
                }
                Err(e) => {
                    warn!(error = %e, "Sound output unavailable, effects disabled");
                    None
                }
            })
            .clone()
    }

    /// 渲染全部音色；单个音色失败只跳过该音色
    pub fn prepare_bank(&self) {
        let sample_rate = self
            .warm_up()
            .map(|output| output.sample_rate())
            .unwrap_or(self.default_rate);

        let mut tones = HashMap::new();
        for effect in SoundEffect::ALL {
            match effect.render(sample_rate) {
                Ok(samples) => {
                    tones.insert(effect, Arc::from(samples));
                }
                Err(e) => warn!(effect = %effect, error = %e, "Failed to render sound effect"),
            }
        }

        debug!(sample_rate, prepared = tones.len(), "Sound bank prepared");
        *self.bank.write().unwrap_or_else(PoisonError::into_inner) = Some(PreparedBank {
            sample_rate,
            tones,
        });
    }

    fn prepared(&self, effect: SoundEffect) -> Option<(Arc<[f32]>, u32)> {
        let bank = self.bank.read().unwrap_or_else(PoisonError::into_inner);
        let bank = bank.as_ref()?;
        bank.tones
            .get(&effect)
            .map(|samples| (samples.clone(), bank.sample_rate))
    }

    /// 即发即忘播放
    ///
    /// 实际音量 = (覆盖值 ?? 主音量) × 主音量
    pub fn play(&self, effect: SoundEffect, volume_override: Option<f32>) {
        if !self.is_enabled() {
            return;
        }
        let Some(output) = self.warm_up() else {
            return;
        };
        if self.bank.read().unwrap_or_else(PoisonError::into_inner).is_none() {
            self.prepare_bank();
        }
        let Some((samples, sample_rate)) = self.prepared(effect) else {
            debug!(effect = %effect, "Sound effect not prepared");
            return;
        };

        let volume = self.volume();
        let base = volume_override
            .or_else(|| effect.default_volume_override())
            .unwrap_or(volume);
        let gain = base * volume;

        if let Err(e) = output.play_samples(samples, sample_rate, gain) {
            warn!(effect = %effect, error = %e, "Sound effect playback failed");
        }
    }

    /// 以 WAV 字节返回音色
    pub fn render_wav(&self, effect: SoundEffect) -> Result<Vec<u8>, ToneError> {
        if let Some((samples, sample_rate)) = self.prepared(effect) {
            return Ok(encode_wav(&samples, sample_rate, 1));
        }
        let samples = effect.render(self.default_rate)?;
        Ok(encode_wav(&samples, self.default_rate, 1))
    }

    pub fn set_volume(&self, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.volume.store(volume.to_bits(), Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn settings(&self) -> SoundSettings {
        SoundSettings {
            enabled: self.is_enabled(),
            volume: self.volume(),
        }
    }
}
