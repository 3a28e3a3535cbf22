//! Sound HTTP Handlers

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::application::{GetSoundWav, PlaySound, SoundSettings, UpdateSoundSettings};
use crate::domain::audio::SoundEffect;
use crate::infrastructure::http::dto::{ApiResponse, Empty, PlaySoundRequest, SoundSettingsRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

fn parse_effect(name: &str) -> Result<SoundEffect, ApiError> {
    name.parse::<SoundEffect>().map_err(ApiError::NotFound)
}

/// 以 WAV 返回提示音
pub async fn sound_wav(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let effect = parse_effect(&name)?;
    let wav = state.sound_wav_handler.handle(GetSoundWav { effect })?;

    let mut response = Response::new(Body::from(wav));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/wav"));
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=86400"),
    );
    Ok(response)
}

/// 在服务端输出设备上播放提示音
pub async fn play_sound(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Option<Json<PlaySoundRequest>>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let effect = parse_effect(&name)?;
    let Json(req) = body.unwrap_or_default();

    state.play_sound_handler.handle(PlaySound {
        effect,
        volume: req.volume,
    });
    Ok(Json(ApiResponse::ok()))
}

pub async fn sound_settings(State(state): State<Arc<AppState>>) -> Json<ApiResponse<SoundSettings>> {
    let settings = state.update_sound_settings_handler.handle(UpdateSoundSettings {
        volume: None,
        enabled: None,
    });
    Json(ApiResponse::success(settings))
}

pub async fn update_sound_settings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SoundSettingsRequest>,
) -> Json<ApiResponse<SoundSettings>> {
    let settings = state.update_sound_settings_handler.handle(UpdateSoundSettings {
        volume: req.volume,
        enabled: req.enabled,
    });
    Json(ApiResponse::success(settings))
}
