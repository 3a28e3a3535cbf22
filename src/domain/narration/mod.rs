//! Narration Context - 旁白限界上下文
//!
//! 职责:
//! - 旁白文本校验
//! - 分区音色预设
//! - 旁白请求与缓存 key 推导

mod errors;
mod value_objects;

pub use errors::NarrationError;
pub use value_objects::{
    narration_cache_key, NarrationRequest, NarrationText, Section, VoiceProfile, VoiceSettings,
    DEFAULT_MODEL_ID, MAX_NARRATION_CHARS,
};
