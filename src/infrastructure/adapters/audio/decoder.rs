//! Audio Decoder - 基于 symphonia 的无界面探测
//!
//! 同步阻塞实现，调用方负责放到 `spawn_blocking` 中执行

use std::io::Cursor;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::ValidationError;
use crate::domain::audio::{AudioFormat, SourceHandle};

/// 探测结果
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProbedAudio {
    pub duration_secs: Option<f64>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    /// 首个数据包是否成功解码
    pub first_packet_decoded: bool,
}

impl ProbedAudio {
    /// 可以播放：首包可解码或元数据给出正时长
    pub fn is_playable(&self) -> bool {
        self.first_packet_decoded || self.duration_secs.is_some_and(|d| d > 0.0)
    }
}

fn open_source(handle: &SourceHandle) -> Result<Box<dyn MediaSource>, ValidationError> {
    match handle {
        SourceHandle::Buffer(data) => Ok(Box::new(Cursor::new(data.clone()))),
        SourceHandle::File(path) => std::fs::File::open(path)
            .map(|file| Box::new(file) as Box<dyn MediaSource>)
            .map_err(|e| ValidationError::Unreadable(format!("{}: {}", path.display(), e))),
    }
}

/// 探测音频
///
/// `scan_duration` 为 true 且容器未给出帧数时，遍历数据包累计时长（不解码）。
pub fn probe_source(
    handle: &SourceHandle,
    format: Option<AudioFormat>,
    scan_duration: bool,
) -> Result<ProbedAudio, ValidationError> {
    let source = open_source(handle)?;
    let mss = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    if let Some(format) = format {
        hint.with_extension(format.extension());
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ValidationError::Undecodable(format!("Probe failed: {}", e)))?;

    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ValidationError::Undecodable("No audio track found".to_string()))?;

    let track_id = track.id;
    let params = track.codec_params.clone();
    let sample_rate = params.sample_rate;
    let channels = params.channels.map(|c| c.count() as u16);

    let mut duration_secs = match (params.n_frames, sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => Some(frames as f64 / rate as f64),
        _ => None,
    };

    let mut decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| ValidationError::Undecodable(format!("Decoder creation failed: {}", e)))?;

    let mut first_packet_decoded = false;
    let mut scanned_ts: u64 = 0;
    let mut seen_packet = false;

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => {
                if !seen_packet {
                    return Err(ValidationError::Undecodable(format!("Packet read error: {}", e)));
                }
                tracing::debug!(error = %e, "Stopped scanning packets");
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        if !seen_packet {
            seen_packet = true;
            match decoder.decode(&packet) {
                Ok(_) => first_packet_decoded = true,
                Err(e) => tracing::debug!(error = %e, "First packet failed to decode"),
            }
        }

        if !scan_duration || duration_secs.is_some() {
            break;
        }
        scanned_ts = scanned_ts.saturating_add(packet.dur);
    }

    if duration_secs.is_none() && scanned_ts > 0 {
        if let Some(time_base) = params.time_base {
            let time = time_base.calc_time(scanned_ts);
            duration_secs = Some(time.seconds as f64 + time.frac);
        } else if let Some(rate) = sample_rate.filter(|r| *r > 0) {
            duration_secs = Some(scanned_ts as f64 / rate as f64);
        }
    }

    Ok(ProbedAudio {
        duration_secs,
        sample_rate,
        channels,
        first_packet_decoded,
    })
}
