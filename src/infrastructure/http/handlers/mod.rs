//! HTTP Handlers

mod content;
mod narration;
mod ping;
mod sound;

pub use content::*;
pub use narration::*;
pub use ping::*;
pub use sound::*;
