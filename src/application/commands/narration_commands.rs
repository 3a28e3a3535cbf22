//! Narration Commands

use std::path::PathBuf;

use crate::domain::narration::Section;

/// 播放旁白命令
#[derive(Debug, Clone)]
pub struct PlayNarration {
    pub text: String,
    /// 决定音色预设；缺省使用默认音色
    pub section: Option<Section>,
    /// 覆盖配置中的 voice id
    pub voice_id: Option<String>,
    /// 资源目录下的自定义兜底音频
    pub fallback_asset: Option<PathBuf>,
}

/// 只合成音频，不在服务端播放
#[derive(Debug, Clone)]
pub struct SynthesizeNarration {
    pub text: String,
    pub section: Option<Section>,
}

/// 停止旁白
#[derive(Debug, Clone)]
pub struct StopNarration;

/// 清除错误并丢弃上一次旁白的缓存
#[derive(Debug, Clone)]
pub struct RetryNarration;
