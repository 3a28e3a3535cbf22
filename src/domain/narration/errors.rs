//! Narration Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum NarrationError {
    #[error("旁白文本不能为空")]
    EmptyText,

    #[error("旁白文本过长: {len} 字符（上限 {max}）")]
    TextTooLong { len: usize, max: usize },

    #[error("无效的语音参数: {0}")]
    InvalidVoiceSettings(String),
}
