//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod content_commands;
mod narration_commands;
mod sound_commands;

pub mod handlers;

pub use content_commands::*;
pub use narration_commands::*;
pub use sound_commands::*;
