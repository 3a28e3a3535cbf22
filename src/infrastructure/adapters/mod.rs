//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod audio;
pub mod fallback;
pub mod playback;
pub mod tts;

pub use audio::*;
pub use fallback::*;
pub use playback::*;
pub use tts::*;
