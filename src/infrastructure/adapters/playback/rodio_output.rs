//! Rodio Output - 本机扬声器输出（`speaker` feature）
//!
//! `OutputStream` 不能跨线程移动，放在专用线程上常驻；
//! 播放器和提示音只持有可共享的 `OutputStreamHandle`。

use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::io::{BufReader, Cursor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::application::ports::{
    LoadedPlayer, MediaPlayerPort, PlaybackError, PlayerEvent, PlayerInstance, ToneOutputError,
    ToneOutputFactory, ToneOutputPort,
};
use crate::domain::audio::{AudioFormat, SourceHandle};

trait ReadSeek: std::io::Read + std::io::Seek + Send + Sync {}
impl<T: std::io::Read + std::io::Seek + Send + Sync> ReadSeek for T {}

/// 打开默认输出设备
pub fn open_default_output() -> Result<OutputStreamHandle, String> {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::Builder::new()
        .name("audio-output".to_string())
        .spawn(move || match OutputStream::try_default() {
            Ok((_stream, handle)) => {
                let _ = tx.send(Ok(handle));
                loop {
                    std::thread::park();
                }
            }
            Err(e) => {
                let _ = tx.send(Err(format!("Failed to open audio output: {}", e)));
            }
        })
        .map_err(|e| e.to_string())?;

    rx.recv().map_err(|e| e.to_string())?
}

fn open_sink(
    handle: &OutputStreamHandle,
    source: SourceHandle,
) -> Result<(Sink, Option<f64>), String> {
    let reader: Box<dyn ReadSeek> = match source {
        SourceHandle::Buffer(data) => Box::new(Cursor::new(data)),
        SourceHandle::File(path) => Box::new(BufReader::new(
            std::fs::File::open(&path).map_err(|e| format!("{}: {}", path.display(), e))?,
        )),
    };

    let decoder = Decoder::new(reader).map_err(|e| format!("Decode failed: {}", e))?;
    let duration = decoder.total_duration().map(|d| d.as_secs_f64());

    let sink = Sink::try_new(handle).map_err(|e| format!("Failed to create audio sink: {}", e))?;
    sink.pause();
    sink.append(decoder);
    Ok((sink, duration))
}

// ============================================================================
// Narration player
// ============================================================================

struct LoadedSink {
    sink: Sink,
    duration: Option<f64>,
}

#[derive(Default)]
struct PlayerShared {
    sink: Mutex<Option<Arc<LoadedSink>>>,
    released: AtomicBool,
    started: AtomicBool,
}

impl PlayerShared {
    fn current(&self) -> Option<Arc<LoadedSink>> {
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// 单个扬声器播放器
pub struct RodioPlayer {
    shared: Arc<PlayerShared>,
    events: mpsc::UnboundedSender<PlayerEvent>,
}

impl PlayerInstance for RodioPlayer {
    fn play(&self) -> Result<(), PlaybackError> {
        if self.shared.released.load(Ordering::SeqCst) {
            return Err(PlaybackError::Released);
        }
        let loaded = self
            .shared
            .current()
            .ok_or_else(|| PlaybackError::Playback("player is not ready".to_string()))?;
        loaded.sink.play();

        if !self.shared.started.swap(true, Ordering::SeqCst) {
            let runtime = tokio::runtime::Handle::try_current()
                .map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?;
            let shared = self.shared.clone();
            let events = self.events.clone();
            runtime.spawn(async move {
                let mut tick = tokio::time::interval(Duration::from_millis(50));
                loop {
                    tick.tick().await;
                    if shared.released.load(Ordering::SeqCst) {
                        return;
                    }
                    if loaded.sink.empty() {
                        let _ = events.send(PlayerEvent::Ended);
                        return;
                    }
                }
            });
        }
        Ok(())
    }

    fn pause(&self) {
        if let Some(loaded) = self.shared.current() {
            loaded.sink.pause();
        }
    }

    fn rewind(&self) {
        if let Some(loaded) = self.shared.current() {
            if let Err(e) = loaded.sink.try_seek(Duration::ZERO) {
                tracing::debug!(error = %e, "Seek to start not supported");
            }
        }
    }

    fn release(&self) {
        self.shared.released.store(true, Ordering::SeqCst);
        let taken = self
            .shared
            .sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(loaded) = taken {
            loaded.sink.stop();
        }
    }

    fn is_paused(&self) -> bool {
        self.shared
            .current()
            .map_or(true, |loaded| loaded.sink.is_paused() || loaded.sink.empty())
    }

    fn current_time(&self) -> f64 {
        self.shared
            .current()
            .map_or(0.0, |loaded| loaded.sink.get_pos().as_secs_f64())
    }

    fn duration(&self) -> Option<f64> {
        self.shared.current().and_then(|loaded| loaded.duration)
    }
}

/// 扬声器播放器工厂
pub struct RodioPlayerPort {
    handle: OutputStreamHandle,
}

impl RodioPlayerPort {
    pub fn new(handle: OutputStreamHandle) -> Self {
        Self { handle }
    }
}

impl MediaPlayerPort for RodioPlayerPort {
    fn load(
        &self,
        source: SourceHandle,
        _format: Option<AudioFormat>,
    ) -> Result<LoadedPlayer, PlaybackError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?;

        let (tx, events) = mpsc::unbounded_channel();
        let shared = Arc::new(PlayerShared::default());

        let load_shared = shared.clone();
        let load_events = tx.clone();
        let handle = self.handle.clone();
        runtime.spawn(async move {
            let opened = tokio::task::spawn_blocking(move || open_sink(&handle, source)).await;
            let event = match opened {
                Ok(Ok((sink, duration))) => {
                    let mut slot = load_shared
                        .sink
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    if load_shared.released.load(Ordering::SeqCst) {
                        sink.stop();
                        return;
                    }
                    *slot = Some(Arc::new(LoadedSink { sink, duration }));
                    PlayerEvent::Ready {
                        duration_secs: duration,
                    }
                }
                Ok(Err(message)) => PlayerEvent::Failed(message),
                Err(e) => PlayerEvent::Failed(format!("load task failed: {}", e)),
            };
            let _ = load_events.send(event);
        });

        Ok(LoadedPlayer {
            player: Box::new(RodioPlayer { shared, events: tx }),
            events,
        })
    }
}

// ============================================================================
// Tone output
// ============================================================================

/// 扬声器提示音输出
pub struct RodioToneOutput {
    handle: OutputStreamHandle,
    sample_rate: u32,
}

impl ToneOutputPort for RodioToneOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn play_samples(
        &self,
        samples: Arc<[f32]>,
        sample_rate: u32,
        gain: f32,
    ) -> Result<(), ToneOutputError> {
        let source = SamplesBuffer::new(1, sample_rate, samples.to_vec()).amplify(gain);
        self.handle
            .play_raw(source)
            .map_err(|e| ToneOutputError::PlaybackFailed(e.to_string()))
    }
}

/// 延迟打开扬声器
pub struct RodioToneFactory {
    sample_rate: u32,
}

impl RodioToneFactory {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

impl ToneOutputFactory for RodioToneFactory {
    fn open(&self) -> Result<Arc<dyn ToneOutputPort>, ToneOutputError> {
        let handle = open_default_output().map_err(ToneOutputError::DeviceUnavailable)?;
        Ok(Arc::new(RodioToneOutput {
            handle,
            sample_rate: self.sample_rate,
        }))
    }
}
