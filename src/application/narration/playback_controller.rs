//! Playback Controller - 单一播放会话
//!
//! 任意时刻最多一个活动播放器。新的 `play` 先同步拆除上一个会话，
//! 然后才创建新的播放器；被取代或停止的会话以 `Stopped` 结束。

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::ports::{
    LoadedPlayer, MediaPlayerPort, PlaybackError, PlayerEvent, PlayerInstance,
};
use crate::domain::audio::AudioResource;

/// 播放结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackOutcome {
    /// 自然播放结束
    Finished,
    /// 被 stop 或新的 play 中断
    Stopped,
}

/// 播放状态快照
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlaybackStatus {
    pub playing: bool,
    pub session_id: Option<Uuid>,
    pub resource_id: Option<Uuid>,
    pub position_secs: Option<f64>,
    pub duration_secs: Option<f64>,
}

struct ActiveSession {
    id: Uuid,
    resource: AudioResource,
    player: Box<dyn PlayerInstance>,
    stopped: CancellationToken,
}

impl ActiveSession {
    fn teardown(self, reason: &str) {
        self.player.pause();
        self.player.rewind();
        self.player.release();
        self.stopped.cancel();
        debug!(
            session_id = %self.id,
            resource_id = %self.resource.id(),
            reason,
            "Playback session torn down"
        );
    }
}

pub struct PlaybackController {
    player_port: Arc<dyn MediaPlayerPort>,
    load_timeout: Duration,
    session: Mutex<Option<ActiveSession>>,
}

impl PlaybackController {
    pub fn new(player_port: Arc<dyn MediaPlayerPort>, load_timeout: Duration) -> Self {
        Self {
            player_port,
            load_timeout,
            session: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 播放资源直到结束、被中断或出错
    pub async fn play(&self, resource: &AudioResource) -> Result<PlaybackOutcome, PlaybackError> {
        let (session_id, stopped, mut events) = {
            let mut session = self.lock();
            if let Some(previous) = session.take() {
                previous.teardown("superseded");
            }

            let handle = resource.handle().ok_or(PlaybackError::Released)?;
            let LoadedPlayer { player, events } =
                self.player_port.load(handle, resource.format())?;

            let id = Uuid::new_v4();
            let stopped = CancellationToken::new();
            *session = Some(ActiveSession {
                id,
                resource: resource.clone(),
                player,
                stopped: stopped.clone(),
            });
            (id, stopped, events)
        };

        debug!(session_id = %session_id, resource_id = %resource.id(), "Player loading");

        let ready = tokio::select! {
            biased;
            _ = stopped.cancelled() => return Ok(PlaybackOutcome::Stopped),
            ready = tokio::time::timeout(self.load_timeout, wait_ready(&mut events)) => ready,
        };

        match ready {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.finish(session_id, "load failed");
                warn!(session_id = %session_id, error = %e, "Audio failed to load");
                return Err(e);
            }
            Err(_) => {
                self.finish(session_id, "load timed out");
                let millis = self.load_timeout.as_millis() as u64;
                warn!(session_id = %session_id, timeout_ms = millis, "Audio load timed out");
                return Err(PlaybackError::Timeout(millis));
            }
        }

        let started = {
            let session = self.lock();
            match session.as_ref() {
                Some(active) if active.id == session_id => Some(active.player.play()),
                _ => None,
            }
        };
        match started {
            None => return Ok(PlaybackOutcome::Stopped),
            Some(Err(e)) => {
                self.finish(session_id, "start failed");
                return Err(e);
            }
            Some(Ok(())) => info!(session_id = %session_id, "Playback started"),
        }

        let ended = tokio::select! {
            biased;
            _ = stopped.cancelled() => return Ok(PlaybackOutcome::Stopped),
            ended = wait_end(&mut events) => ended,
        };

        self.finish(session_id, "ended");
        match ended {
            Ok(()) => {
                info!(session_id = %session_id, "Playback finished");
                Ok(PlaybackOutcome::Finished)
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Playback failed");
                Err(e)
            }
        }
    }

    /// 只清理仍属于 `session_id` 的会话
    fn finish(&self, session_id: Uuid, reason: &str) {
        let mut session = self.lock();
        if session.as_ref().is_some_and(|s| s.id == session_id) {
            if let Some(active) = session.take() {
                active.teardown(reason);
            }
        }
    }

    /// 停止当前播放；空闲时无操作
    pub fn stop(&self) {
        if let Some(active) = self.lock().take() {
            info!(session_id = %active.id, "Playback stopped");
            active.teardown("stopped");
        }
    }

    /// 查询播放器的真实状态
    pub fn is_playing(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|active| !active.player.is_paused())
    }

    pub fn status(&self) -> PlaybackStatus {
        match self.lock().as_ref() {
            Some(active) => PlaybackStatus {
                playing: !active.player.is_paused(),
                session_id: Some(active.id),
                resource_id: Some(active.resource.id()),
                position_secs: Some(active.player.current_time()),
                duration_secs: active
                    .player
                    .duration()
                    .or_else(|| active.resource.duration_hint()),
            },
            None => PlaybackStatus::default(),
        }
    }
}

async fn wait_ready(events: &mut mpsc::UnboundedReceiver<PlayerEvent>) -> Result<(), PlaybackError> {
    loop {
        match events.recv().await {
            Some(PlayerEvent::Ready { .. }) => return Ok(()),
            Some(PlayerEvent::Failed(message)) => return Err(PlaybackError::Playback(message)),
            Some(PlayerEvent::Ended) => continue,
            None => {
                return Err(PlaybackError::Playback(
                    "player closed before it was ready".to_string(),
                ))
            }
        }
    }
}

async fn wait_end(events: &mut mpsc::UnboundedReceiver<PlayerEvent>) -> Result<(), PlaybackError> {
    loop {
        match events.recv().await {
            Some(PlayerEvent::Ended) => return Ok(()),
            Some(PlayerEvent::Failed(message)) => return Err(PlaybackError::Playback(message)),
            Some(PlayerEvent::Ready { .. }) => continue,
            None => {
                return Err(PlaybackError::Playback(
                    "player closed during playback".to_string(),
                ))
            }
        }
    }
}
