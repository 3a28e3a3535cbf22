//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod content_handlers;
mod narration_handlers;
mod sound_handlers;

pub use content_handlers::*;
pub use narration_handlers::*;
pub use sound_handlers::*;
