//! 旁白服务单元测试共用的替身实现

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::application::ports::{
    AudioProbe, AudioValidatorPort, FallbackProvider, LoadedPlayer, MediaPlayerPort,
    PlaybackError, PlayerEvent, PlayerInstance, SpeechEnginePort, Strategy, SynthesisError,
    SynthesizedAudio, ValidationError,
};
use crate::domain::audio::{
    encode_wav, notification_tone, AudioFormat, AudioOrigin, AudioResource, SourceHandle,
};
use crate::domain::narration::{NarrationRequest, NarrationText, VoiceProfile};

pub fn wav_bytes() -> Vec<u8> {
    let samples = notification_tone(8000, 1.0).unwrap();
    encode_wav(&samples, 8000, 1)
}

pub fn wav_resource(origin: AudioOrigin) -> AudioResource {
    AudioResource::new(
        SourceHandle::buffer(wav_bytes()),
        origin,
        Some(AudioFormat::Wav),
    )
}

// ============================================================================
// Speech engine
// ============================================================================

pub enum EngineBehavior {
    Audio(Vec<u8>),
    Fail(fn() -> SynthesisError),
    Hang,
}

pub struct FakeEngine {
    pub calls: AtomicUsize,
    pub credentials_ok: bool,
    behavior: EngineBehavior,
}

impl FakeEngine {
    pub fn new(behavior: EngineBehavior) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            credentials_ok: true,
            behavior,
        }
    }

    pub fn without_credentials(mut self) -> Self {
        self.credentials_ok = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechEnginePort for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn check_credentials(&self, _voice: &VoiceProfile) -> Result<(), SynthesisError> {
        if self.credentials_ok {
            Ok(())
        } else {
            Err(SynthesisError::Config("api key missing".to_string()))
        }
    }

    async fn synthesize(
        &self,
        _text: &NarrationText,
        _voice: &VoiceProfile,
    ) -> Result<SynthesizedAudio, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            EngineBehavior::Audio(data) => Ok(SynthesizedAudio {
                audio_data: data.clone(),
                content_type: "audio/wav".to_string(),
                format: Some(AudioFormat::Wav),
            }),
            EngineBehavior::Fail(make) => Err(make()),
            EngineBehavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

// ============================================================================
// Validator
// ============================================================================

/// 已释放的资源校验失败，其余通过；`reject_all` 打开后全部失败
#[derive(Default)]
pub struct FakeValidator {
    pub calls: AtomicUsize,
    pub reject_all: AtomicBool,
}

impl FakeValidator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reject_all(&self, reject: bool) {
        self.reject_all.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl AudioValidatorPort for FakeValidator {
    async fn validate(&self, resource: &AudioResource) -> Result<AudioProbe, ValidationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if resource.is_released() {
            return Err(ValidationError::Released);
        }
        if self.reject_all.load(Ordering::SeqCst) {
            return Err(ValidationError::Undecodable("rejected".to_string()));
        }
        Ok(AudioProbe {
            duration_secs: Some(1.0),
            sample_rate: Some(8000),
            channels: Some(1),
        })
    }
}

// ============================================================================
// Fallback provider
// ============================================================================

pub struct FixedProvider {
    pub strategy: Strategy,
    pub available: bool,
    pub origin: AudioOrigin,
    pub calls: AtomicUsize,
}

impl FixedProvider {
    pub fn new(strategy: Strategy, origin: AudioOrigin, available: bool) -> Self {
        Self {
            strategy,
            available,
            origin,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FallbackProvider for FixedProvider {
    fn strategy(&self) -> Strategy {
        self.strategy
    }

    async fn try_resolve(&self, _request: &NarrationRequest) -> Option<AudioResource> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.available.then(|| wav_resource(self.origin))
    }
}

// ============================================================================
// Media player
// ============================================================================

pub struct ScriptedState {
    tx: mpsc::UnboundedSender<PlayerEvent>,
    pub paused: AtomicBool,
    pub released: AtomicBool,
    pub plays: AtomicUsize,
    auto_end: bool,
}

impl ScriptedState {
    pub fn emit(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

struct ScriptedInstance {
    state: Arc<ScriptedState>,
}

impl PlayerInstance for ScriptedInstance {
    fn play(&self) -> Result<(), PlaybackError> {
        self.state.plays.fetch_add(1, Ordering::SeqCst);
        self.state.paused.store(false, Ordering::SeqCst);
        if self.state.auto_end {
            self.state.paused.store(true, Ordering::SeqCst);
            self.state.emit(PlayerEvent::Ended);
        }
        Ok(())
    }

    fn pause(&self) {
        self.state.paused.store(true, Ordering::SeqCst);
    }

    fn rewind(&self) {}

    fn release(&self) {
        self.state.paused.store(true, Ordering::SeqCst);
        self.state.released.store(true, Ordering::SeqCst);
    }

    fn is_paused(&self) -> bool {
        self.state.paused.load(Ordering::SeqCst)
    }

    fn current_time(&self) -> f64 {
        0.5
    }

    fn duration(&self) -> Option<f64> {
        Some(1.0)
    }
}

/// 由测试脚本驱动的播放器
pub struct ScriptedPlayerPort {
    pub auto_ready: bool,
    pub auto_end: bool,
    players: Mutex<Vec<Arc<ScriptedState>>>,
}

impl ScriptedPlayerPort {
    pub fn new(auto_ready: bool, auto_end: bool) -> Self {
        Self {
            auto_ready,
            auto_end,
            players: Mutex::new(Vec::new()),
        }
    }

    pub fn loaded(&self) -> usize {
        self.players.lock().unwrap().len()
    }

    pub fn player(&self, index: usize) -> Arc<ScriptedState> {
        self.players.lock().unwrap()[index].clone()
    }

    /// 未释放的播放器数量
    pub fn live_players(&self) -> usize {
        self.players
            .lock()
            .unwrap()
            .iter()
            .filter(|p| !p.is_released())
            .count()
    }
}

impl MediaPlayerPort for ScriptedPlayerPort {
    fn load(
        &self,
        _source: SourceHandle,
        _format: Option<AudioFormat>,
    ) -> Result<LoadedPlayer, PlaybackError> {
        let (tx, events) = mpsc::unbounded_channel();
        let state = Arc::new(ScriptedState {
            tx,
            paused: AtomicBool::new(true),
            released: AtomicBool::new(false),
            plays: AtomicUsize::new(0),
            auto_end: self.auto_end,
        });
        if self.auto_ready {
            state.emit(PlayerEvent::Ready {
                duration_secs: Some(1.0),
            });
        }
        self.players.lock().unwrap().push(state.clone());
        Ok(LoadedPlayer {
            player: Box::new(ScriptedInstance { state }),
            events,
        })
    }
}
