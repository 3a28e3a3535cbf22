//! Folio - 作品集站点后端
//!
//! 组合根：按配置装配语音合成、兜底链、缓存、播放器、提示音和内容存储，
//! 然后启动 HTTP 服务。

use std::sync::Arc;
use std::time::Duration;

use folio::application::ports::{
    FallbackProvider, MediaPlayerPort, SpeechEnginePort, ToneOutputFactory,
};
use folio::application::{
    Narrator, PlaybackController, SoundBank, SoundBankConfig, SpeechCache, SpeechCacheConfig,
    SpeechSynthesisClient,
};
use folio::config::{load_config, print_config, AppConfig, SpeechEngineKind};
use folio::domain::narration::VoiceProfile;
use folio::infrastructure::adapters::{
    AssetFallbackProvider, ClockedPlayerPort, ElevenLabsClient, ElevenLabsConfig,
    FixedSpeechEngine, FixedSpeechEngineConfig, SymphoniaValidator, SyntheticToneProvider,
};
use folio::infrastructure::http::{AppState, HttpServer, ServerConfig};
use folio::infrastructure::persistence::sled::{SledSpeechStore, SledStoreConfig};
use folio::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, ContentSeed, DatabaseConfig, SqliteContactRepository,
    SqlitePortfolioRepository, SqliteVisitCounter,
};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},folio={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_engine(config: &AppConfig) -> anyhow::Result<Arc<dyn SpeechEnginePort>> {
    let speech = &config.speech;
    let engine: Arc<dyn SpeechEnginePort> = match speech.engine {
        SpeechEngineKind::ElevenLabs => {
            let engine_config = ElevenLabsConfig {
                base_url: speech.base_url.clone(),
                api_key: speech.api_key.clone(),
                voice_id: speech.voice_id.clone(),
                timeout_secs: speech.timeout_secs,
            };
            let client = ElevenLabsClient::new(engine_config)?;
            if let Err(e) = client.check_credentials(&VoiceProfile::default()) {
                tracing::warn!(error = %e, "Narration without a voice override will use fallback audio");
            }
            Arc::new(client)
        }
        SpeechEngineKind::Fixed => Arc::new(FixedSpeechEngine::new(FixedSpeechEngineConfig {
            audio_file_path: speech.fixed_audio_path.clone(),
            latency_ms: speech.fixed_latency_ms,
        })?),
    };
    Ok(engine)
}

#[cfg(feature = "speaker")]
fn build_outputs(config: &AppConfig) -> (Arc<dyn MediaPlayerPort>, Arc<dyn ToneOutputFactory>) {
    use folio::infrastructure::adapters::{open_default_output, RodioPlayerPort, RodioToneFactory};

    let tones: Arc<dyn ToneOutputFactory> = Arc::new(RodioToneFactory::new(config.sounds.sample_rate));
    match open_default_output() {
        Ok(handle) => (Arc::new(RodioPlayerPort::new(handle)), tones),
        Err(e) => {
            tracing::warn!(error = %e, "No audio output device, narration playback is clocked only");
            (Arc::new(ClockedPlayerPort::new()), tones)
        }
    }
}

#[cfg(not(feature = "speaker"))]
fn build_outputs(_config: &AppConfig) -> (Arc<dyn MediaPlayerPort>, Arc<dyn ToneOutputFactory>) {
    use folio::infrastructure::adapters::HeadlessToneFactory;

    (
        Arc::new(ClockedPlayerPort::new()),
        Arc::new(HeadlessToneFactory),
    )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    tracing::info!("Folio - portfolio backend v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    if let Some(parent) = config.storage.cache_dir.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 内容存储
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    let portfolio_repo = Arc::new(SqlitePortfolioRepository::new(pool.clone()));
    if let Some(seed_path) = &config.database.seed_path {
        let seed = ContentSeed::load(seed_path).await?;
        portfolio_repo.import(&seed).await?;
    }
    let contact_repo = Arc::new(SqliteContactRepository::new(pool.clone()));
    let visit_counter = Arc::new(SqliteVisitCounter::new(pool));

    // 语音合成与兜底链
    let validator = Arc::new(SymphoniaValidator::new(Duration::from_millis(
        config.narration.validation_timeout_ms,
    )));
    let engine = build_engine(&config)?;

    let fallback = &config.fallback;
    let fallbacks: Vec<Arc<dyn FallbackProvider>> = vec![
        Arc::new(AssetFallbackProvider::custom(
            &fallback.assets_dir,
            validator.clone(),
        )),
        Arc::new(AssetFallbackProvider::defaults(
            &fallback.assets_dir,
            fallback.candidates.clone(),
            validator.clone(),
        )),
        Arc::new(SyntheticToneProvider::new(
            fallback.sample_rate,
            fallback.synthetic_duration_secs,
        )),
    ];
    let client = Arc::new(SpeechSynthesisClient::new(
        engine,
        validator.clone(),
        fallbacks,
    ));

    // 语音缓存
    let mut cache = SpeechCache::new(
        SpeechCacheConfig {
            ttl: Duration::from_secs(config.narration.cache_ttl_secs),
            persist: config.narration.persist_cache,
        },
        validator,
    );
    if config.narration.persist_cache {
        let store = SledSpeechStore::new(&SledStoreConfig {
            db_path: config.storage.cache_dir.to_string_lossy().to_string(),
            max_size_bytes: config.storage.cache_max_bytes,
        })?;
        cache = cache.with_store(store.arc());
    }

    // 播放与提示音输出
    let (player_port, tone_factory) = build_outputs(&config);
    let controller = Arc::new(PlaybackController::new(
        player_port,
        Duration::from_millis(config.narration.load_timeout_ms),
    ));
    let narrator = Arc::new(Narrator::new(client, Arc::new(cache), controller));

    let sounds = Arc::new(SoundBank::new(
        SoundBankConfig {
            enabled: config.sounds.enabled,
            volume: config.sounds.volume,
            sample_rate: config.sounds.sample_rate,
        },
        tone_factory,
    ));
    let warm = sounds.clone();
    tokio::task::spawn_blocking(move || warm.prepare_bank());

    // HTTP 服务器
    let mut server_config = ServerConfig::new(&config.server.host, config.server.port);
    server_config.body_limit_bytes = config.server.body_limit_bytes;
    if config.server.static_files.enabled {
        server_config = server_config.with_static_dir(&config.server.static_files.dir);
    }

    let state = AppState::new(
        narrator.clone(),
        sounds,
        portfolio_repo,
        contact_repo,
        visit_counter,
    );
    let server = HttpServer::new(server_config, state);

    tracing::info!("Server ready at http://{}", config.server.addr());
    server.run_with_shutdown(shutdown_signal()).await?;

    narrator.stop();
    tracing::info!("Server stopped");
    Ok(())
}
