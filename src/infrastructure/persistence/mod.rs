//! Persistence Layer - 数据持久化
//!
//! SQLite（作品集内容）和 Sled（语音缓存）存储实现

pub mod sled;
pub mod sqlite;

pub use self::sled::{SledSpeechStore, SledStoreConfig};
pub use self::sqlite::{
    create_pool, run_migrations, ContentSeed, DatabaseConfig, DbPool, SqliteContactRepository,
    SqlitePortfolioRepository, SqliteVisitCounter,
};
