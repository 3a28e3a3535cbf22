//! Narration HTTP Handlers

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue},
    response::Response,
    Json,
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::{
    GetNarrationStatus, NarrationStatus, PlayNarration, PlayNarrationResponse, RetryNarration,
    StopNarration, SynthesizeNarration,
};
use crate::infrastructure::http::dto::{
    ApiResponse, Empty, PlayNarrationRequest, SynthesizeNarrationRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 合成并在服务端播放，播放结束（或被停止）后返回
pub async fn play_narration(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlayNarrationRequest>,
) -> Result<Json<ApiResponse<PlayNarrationResponse>>, ApiError> {
    let command = PlayNarration {
        text: req.text,
        section: req.section,
        voice_id: req.voice_id,
        fallback_asset: req.fallback_asset.map(PathBuf::from),
    };

    let response = state.play_narration_handler.handle(command).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// 返回合成音频字节
pub async fn narration_audio(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SynthesizeNarrationRequest>,
) -> Result<Response, ApiError> {
    let command = SynthesizeNarration {
        text: req.text,
        section: req.section,
    };

    let audio = state.synthesize_narration_handler.handle(command).await?;

    let mut response = Response::new(Body::from(audio.data));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(audio.content_type),
    );
    headers.insert(
        "x-narration-strategy",
        HeaderValue::from_static(audio.strategy.as_str()),
    );
    Ok(response)
}

pub async fn stop_narration(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Empty>> {
    state.stop_narration_handler.handle(StopNarration);
    Json(ApiResponse::ok())
}

pub async fn retry_narration(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Empty>> {
    state.retry_narration_handler.handle(RetryNarration).await;
    Json(ApiResponse::ok())
}

pub async fn narration_status(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<NarrationStatus>> {
    Json(ApiResponse::success(
        state.narration_status_handler.handle(GetNarrationStatus),
    ))
}
