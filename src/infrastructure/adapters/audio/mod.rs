//! Audio Adapter - 解码探测与校验

mod decoder;
mod validator;

pub use decoder::{probe_source, ProbedAudio};
pub use validator::SymphoniaValidator;
