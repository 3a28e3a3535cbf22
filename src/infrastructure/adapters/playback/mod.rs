//! Playback Adapter - 播放器与提示音输出

mod clocked_player;
mod headless_tone;
#[cfg(feature = "speaker")]
mod rodio_output;

pub use clocked_player::{ClockedPlayer, ClockedPlayerPort};
pub use headless_tone::HeadlessToneFactory;
#[cfg(feature = "speaker")]
pub use rodio_output::{open_default_output, RodioPlayerPort, RodioToneFactory};
