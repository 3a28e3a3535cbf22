//! Clocked Player - 无音频设备的播放器
//!
//! 用 symphonia 探测时长后报告就绪，播放时按真实时间计时并在结束时
//! 发送 `Ended`。服务端没有扬声器时的默认实现。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::ports::{
    LoadedPlayer, MediaPlayerPort, PlaybackError, PlayerEvent, PlayerInstance,
};
use crate::domain::audio::{AudioFormat, SourceHandle};
use crate::infrastructure::adapters::audio::probe_source;

#[derive(Default)]
struct Clock {
    ready: bool,
    released: bool,
    duration: Option<f64>,
    /// 暂停时的位置（秒）
    position: f64,
    started_at: Option<Instant>,
    end_timer: Option<JoinHandle<()>>,
}

impl Clock {
    fn elapsed(&self) -> f64 {
        let running = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let position = self.position + running;
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.end_timer.take() {
            timer.abort();
        }
    }
}

struct ClockState {
    clock: Mutex<Clock>,
    events: mpsc::UnboundedSender<PlayerEvent>,
}

impl ClockState {
    fn lock(&self) -> MutexGuard<'_, Clock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_probed(&self, result: Result<Option<f64>, String>) {
        let mut clock = self.lock();
        if clock.released {
            return;
        }
        let event = match result {
            Ok(duration) => {
                clock.ready = true;
                clock.duration = duration;
                PlayerEvent::Ready {
                    duration_secs: duration,
                }
            }
            Err(message) => PlayerEvent::Failed(message),
        };
        let _ = self.events.send(event);
    }

    fn on_timer(&self) {
        let mut clock = self.lock();
        if clock.released || clock.started_at.is_none() {
            return;
        }
        clock.position = clock.duration.unwrap_or(clock.position);
        clock.started_at = None;
        clock.end_timer = None;
        let _ = self.events.send(PlayerEvent::Ended);
    }
}

/// 单个计时播放器
pub struct ClockedPlayer {
    state: Arc<ClockState>,
}

impl ClockedPlayer {
    fn start_timer(&self, clock: &mut Clock) -> Result<(), PlaybackError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?;
        let remaining = clock
            .duration
            .map(|d| (d - clock.position).max(0.0))
            .unwrap_or(0.0);

        clock.cancel_timer();
        clock.started_at = Some(Instant::now());

        let state = self.state.clone();
        clock.end_timer = Some(runtime.spawn(async move {
            tokio::time::sleep(Duration::from_secs_f64(remaining)).await;
            state.on_timer();
        }));
        Ok(())
    }
}

impl PlayerInstance for ClockedPlayer {
    fn play(&self) -> Result<(), PlaybackError> {
        let mut clock = self.state.lock();
        if clock.released {
            return Err(PlaybackError::Released);
        }
        if !clock.ready {
            return Err(PlaybackError::Playback("player is not ready".to_string()));
        }
        if clock.started_at.is_some() {
            return Ok(());
        }
        if clock.duration.is_some_and(|d| clock.position >= d) {
            clock.position = 0.0;
        }
        self.start_timer(&mut clock)
    }

    fn pause(&self) {
        let mut clock = self.state.lock();
        clock.position = clock.elapsed();
        clock.started_at = None;
        clock.cancel_timer();
    }

    fn rewind(&self) {
        let mut clock = self.state.lock();
        clock.position = 0.0;
        if clock.started_at.is_some() && !clock.released {
            if let Err(e) = self.start_timer(&mut clock) {
                tracing::warn!(error = %e, "Failed to restart playback clock");
            }
        }
    }

    fn release(&self) {
        let mut clock = self.state.lock();
        clock.released = true;
        clock.started_at = None;
        clock.cancel_timer();
    }

    fn is_paused(&self) -> bool {
        self.state.lock().started_at.is_none()
    }

    fn current_time(&self) -> f64 {
        self.state.lock().elapsed()
    }

    fn duration(&self) -> Option<f64> {
        self.state.lock().duration
    }
}

/// 计时播放器工厂
#[derive(Debug, Clone, Default)]
pub struct ClockedPlayerPort;

impl ClockedPlayerPort {
    pub fn new() -> Self {
        Self
    }
}

impl MediaPlayerPort for ClockedPlayerPort {
    fn load(
        &self,
        source: SourceHandle,
        format: Option<AudioFormat>,
    ) -> Result<LoadedPlayer, PlaybackError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?;

        let (tx, events) = mpsc::unbounded_channel();
        let state = Arc::new(ClockState {
            clock: Mutex::new(Clock::default()),
            events: tx,
        });

        let probe_state = state.clone();
        runtime.spawn(async move {
            let probed =
                tokio::task::spawn_blocking(move || probe_source(&source, format, true)).await;
            let result = match probed {
                Ok(Ok(probed)) if probed.is_playable() => Ok(probed.duration_secs),
                Ok(Ok(_)) => Err("audio has no playable data".to_string()),
                Ok(Err(e)) => Err(e.to_string()),
                Err(e) => Err(format!("probe task failed: {}", e)),
            };
            probe_state.on_probed(result);
        });

        Ok(LoadedPlayer {
            player: Box::new(ClockedPlayer { state }),
            events,
        })
    }
}
