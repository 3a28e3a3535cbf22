//! Audio Context - 音频限界上下文
//!
//! 职责:
//! - 可播放音频资源及其来源
//! - 容器格式识别
//! - 提示音与兜底通知音的样本合成
//! - PCM16 WAV 编码

mod format;
mod resource;
mod tones;
mod wav;

pub use format::AudioFormat;
pub use resource::{AudioOrigin, AudioResource, SourceHandle};
pub use tones::{notification_tone, SoundEffect, ToneError};
pub use wav::{encode_wav, mono_duration_secs};
