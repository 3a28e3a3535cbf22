//! HTTP Server
//!
//! Axum HTTP 服务器启动和配置；可选托管前端静态文件

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use http::header::{ACCEPT, CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::middleware::status_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 前端构建产物目录；未知路径回落到 index.html
    pub static_dir: Option<PathBuf>,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: None,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// 构建 Router
    pub(crate) fn build_router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([ACCEPT, CONTENT_TYPE])
            .expose_headers(Any)
            .max_age(std::time::Duration::from_secs(3600));

        let mut router = create_routes();
        if let Some(dir) = &self.config.static_dir {
            let spa = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
            router = router.fallback_service(spa);
        }

        router
            .layer(DefaultBodyLimit::max(self.config.body_limit_bytes))
            .layer(middleware::from_fn(status_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// 启动服务器（带优雅关闭）
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let addr = self.config.addr();

        info!(
            addr = %addr,
            static_dir = ?self.config.static_dir,
            "Starting HTTP server"
        );

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use std::time::Duration;
    use tower::util::ServiceExt;

    use crate::application::ports::FallbackProvider;
    use crate::application::{
        Narrator, PlaybackController, SoundBank, SoundBankConfig, SpeechCache, SpeechCacheConfig,
        SpeechSynthesisClient,
    };
    use crate::infrastructure::adapters::{
        ClockedPlayerPort, ElevenLabsClient, ElevenLabsConfig, HeadlessToneFactory,
        SymphoniaValidator, SyntheticToneProvider,
    };
    use crate::infrastructure::persistence::sqlite::{
        create_pool, fixtures, run_migrations, DatabaseConfig, SqliteContactRepository,
        SqlitePortfolioRepository, SqliteVisitCounter,
    };

    /// 未配置凭据的引擎 + 通知音兜底 + 内存数据库
    async fn test_state() -> AppState {
        let validator = Arc::new(SymphoniaValidator::default());
        let engine = Arc::new(ElevenLabsClient::new(ElevenLabsConfig::default()).unwrap());
        let synthetic: Arc<dyn FallbackProvider> = Arc::new(SyntheticToneProvider::new(8000, 1.0));
        let client = Arc::new(SpeechSynthesisClient::new(
            engine,
            validator.clone(),
            vec![synthetic],
        ));
        let cache = Arc::new(SpeechCache::new(
            SpeechCacheConfig {
                ttl: Duration::from_secs(300),
                persist: false,
            },
            validator,
        ));
        let controller = Arc::new(PlaybackController::new(
            Arc::new(ClockedPlayerPort::new()),
            Duration::from_secs(5),
        ));
        let narrator = Arc::new(Narrator::new(client, cache, controller));
        let sounds = Arc::new(SoundBank::new(
            SoundBankConfig::default(),
            Arc::new(HeadlessToneFactory),
        ));

        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let portfolio = SqlitePortfolioRepository::new(pool.clone());
        portfolio.import(&fixtures::seed()).await.unwrap();

        AppState::new(
            narrator,
            sounds,
            Arc::new(portfolio),
            Arc::new(SqliteContactRepository::new(pool.clone())),
            Arc::new(SqliteVisitCounter::new(pool)),
        )
    }

    async fn app(config: ServerConfig) -> Router {
        HttpServer::new(config, test_state().await).build_router()
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> serde_json::Value {
        let (status, bytes) = send(app, method, uri, body).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let json = send_json(app(ServerConfig::default()).await, Method::GET, "/api/ping", None).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_projects_and_filters() {
        let app = app(ServerConfig::default()).await;

        let json = send_json(app.clone(), Method::GET, "/api/projects", None).await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
        assert_eq!(json["data"][0]["category"], "AI");

        let json = send_json(
            app.clone(),
            Method::GET,
            "/api/projects?featured=true&category=Backend",
            None,
        )
        .await;
        assert_eq!(json["data"].as_array().unwrap().len(), 1);

        let json = send_json(app, Method::GET, "/api/projects?category=Mobile", None).await;
        assert_eq!(json["errno"], 400);
    }

    #[tokio::test]
    async fn test_experience_kind_filter() {
        let json = send_json(
            app(ServerConfig::default()).await,
            Method::GET,
            "/api/experience?kind=certification",
            None,
        )
        .await;
        let items = json["data"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["type"], "certification");
    }

    #[tokio::test]
    async fn test_contact_validation_and_visits() {
        let app = app(ServerConfig::default()).await;

        let bad = serde_json::json!({"name": "Ada", "email": "not-an-email", "message": "hi"});
        let json = send_json(app.clone(), Method::POST, "/api/contact", Some(bad)).await;
        assert_eq!(json["errno"], 400);

        let good = serde_json::json!({"name": "Ada", "email": "ada@example.com", "message": "hi"});
        let json = send_json(app.clone(), Method::POST, "/api/contact", Some(good)).await;
        assert_eq!(json["errno"], 0);
        assert!(json["data"]["id"].as_i64().unwrap() > 0);

        let json = send_json(app.clone(), Method::POST, "/api/visits", None).await;
        assert_eq!(json["data"]["count"], 1);
        let json = send_json(app, Method::POST, "/api/visits", None).await;
        assert_eq!(json["data"]["count"], 2);
    }

    #[tokio::test]
    async fn test_sound_routes() {
        let app = app(ServerConfig::default()).await;

        let (status, wav) = send(app.clone(), Method::GET, "/api/sound/click", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&wav[0..4], b"RIFF");

        let json = send_json(app.clone(), Method::GET, "/api/sound/boom", None).await;
        assert_eq!(json["errno"], 404);

        // 无设备时播放静默成功
        let json = send_json(app.clone(), Method::POST, "/api/sound/success/play", None).await;
        assert_eq!(json["errno"], 0);

        let json = send_json(
            app,
            Method::POST,
            "/api/sound/settings",
            Some(serde_json::json!({"volume": 2.0, "enabled": false})),
        )
        .await;
        assert_eq!(json["data"]["volume"], 1.0);
        assert_eq!(json["data"]["enabled"], false);
    }

    #[tokio::test]
    async fn test_narration_audio_falls_back_to_tone() {
        let app = app(ServerConfig::default()).await;

        let (status, bytes) = send(
            app.clone(),
            Method::POST,
            "/api/narration/audio",
            Some(serde_json::json!({"text": "Welcome to my portfolio", "section": "hero"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&bytes[0..4], b"RIFF");

        let json = send_json(
            app,
            Method::POST,
            "/api/narration/audio",
            Some(serde_json::json!({"text": "   "})),
        )
        .await;
        assert_eq!(json["errno"], 400);
    }

    #[tokio::test]
    async fn test_narration_play_reports_configuration_notice() {
        let app = app(ServerConfig::default()).await;

        let json = send_json(
            app.clone(),
            Method::POST,
            "/api/narration/play",
            Some(serde_json::json!({"text": "About me", "section": "about"})),
        )
        .await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["outcome"], "finished");
        assert_eq!(json["data"]["strategy"], "synthetic_tone");
        assert_eq!(json["data"]["notice"]["kind"], "configuration");

        let json = send_json(app, Method::GET, "/api/narration/status", None).await;
        assert_eq!(json["data"]["playback"]["playing"], false);
    }

    #[tokio::test]
    async fn test_static_dir_serves_spa_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>folio</html>").unwrap();

        let app = app(ServerConfig::default().with_static_dir(dir.path())).await;

        let (status, body) = send(app.clone(), Method::GET, "/projects/42", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<html>folio</html>");

        let json = send_json(app, Method::GET, "/api/ping", None).await;
        assert_eq!(json["status"], "ok");
    }
}
