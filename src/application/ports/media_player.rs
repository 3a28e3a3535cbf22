//! Media Player Port - 播放器抽象
//!
//! 控制器通过该端口创建播放器实例；实例通过事件通道报告
//! 就绪、播放结束和错误。

use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::audio::{AudioFormat, SourceHandle};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Audio resource has been released")]
    Released,

    #[error("Audio loading timed out after {0}ms")]
    Timeout(u64),

    #[error("Audio playback failed: {0}")]
    Playback(String),

    #[error("Audio output unavailable: {0}")]
    OutputUnavailable(String),
}

/// 播放器事件
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// 可以开始播放
    Ready { duration_secs: Option<f64> },
    /// 自然播放结束
    Ended,
    /// 加载或播放失败
    Failed(String),
}

/// 已加载的播放器及其事件流
pub struct LoadedPlayer {
    pub player: Box<dyn PlayerInstance>,
    pub events: mpsc::UnboundedReceiver<PlayerEvent>,
}

/// 单个播放器实例
///
/// 所有方法都是同步的，可以在持锁状态下调用。
pub trait PlayerInstance: Send + Sync {
    /// 开始或恢复播放
    fn play(&self) -> Result<(), PlaybackError>;

    fn pause(&self);

    /// 回到开头
    fn rewind(&self);

    /// 释放解码器和输出；之后不再发送任何事件
    fn release(&self);

    /// 播放器的真实暂停状态（加载中、结束、释放后均为 true）
    fn is_paused(&self) -> bool;

    /// 当前位置（秒）
    fn current_time(&self) -> f64;

    /// 总时长（秒），未知时为 None
    fn duration(&self) -> Option<f64>;
}

/// Media Player Port
pub trait MediaPlayerPort: Send + Sync {
    /// 创建播放器并开始异步加载
    fn load(
        &self,
        source: SourceHandle,
        format: Option<AudioFormat>,
    ) -> Result<LoadedPlayer, PlaybackError>;
}
