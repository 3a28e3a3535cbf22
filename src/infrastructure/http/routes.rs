//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                    GET   健康检查
//! - /api/narration/play          POST  合成并在服务端播放旁白
//! - /api/narration/audio         POST  返回旁白音频字节
//! - /api/narration/stop          POST  停止旁白
//! - /api/narration/retry         POST  清除错误并丢弃上一次缓存
//! - /api/narration/status        GET   播放状态、策略、通知和错误
//! - /api/sound/settings          GET   提示音设置
//! - /api/sound/settings          POST  更新音量 / 开关
//! - /api/sound/:name             GET   提示音 WAV
//! - /api/sound/:name/play        POST  在服务端播放提示音
//! - /api/projects                GET   ?featured&category
//! - /api/skills                  GET
//! - /api/experience              GET   ?kind
//! - /api/contact                 POST  提交联系表单
//! - /api/visits                  POST  访问计数加一

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/narration", narration_routes())
        .nest("/sound", sound_routes())
        .route("/projects", get(handlers::list_projects))
        .route("/skills", get(handlers::list_skills))
        .route("/experience", get(handlers::list_experience))
        .route("/contact", post(handlers::submit_contact))
        .route("/visits", post(handlers::record_visit))
}

/// Narration 路由
fn narration_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/play", post(handlers::play_narration))
        .route("/audio", post(handlers::narration_audio))
        .route("/stop", post(handlers::stop_narration))
        .route("/retry", post(handlers::retry_narration))
        .route("/status", get(handlers::narration_status))
}

/// Sound 路由
fn sound_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/settings",
            get(handlers::sound_settings).post(handlers::update_sound_settings),
        )
        .route("/:name", get(handlers::sound_wav))
        .route("/:name/play", post(handlers::play_sound))
}
