//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Audio Context: 音频资源与合成
//! - Narration Context: 旁白请求与音色
//! - Content Context: 作品集内容

pub mod audio;
pub mod content;
pub mod narration;
