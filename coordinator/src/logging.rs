//! ロギング初期化ユーティリティ

use crate::error::{CoordinatorResult, WarmupError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログレベルを指定する環境変数
pub const LOG_LEVEL_ENV: &str = "SERVICE_WARMUP_LOG_LEVEL";

const DEFAULT_LOG_LEVEL: &str = "info";

/// ログフィルタ文字列を決定する
///
/// `SERVICE_WARMUP_LOG_LEVEL` → `RUST_LOG` → `info` の順。
pub fn log_filter() -> String {
    std::env::var(LOG_LEVEL_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
}

/// グローバルなtracingサブスクライバーを設定する
///
/// 既に設定済みの場合はエラーを返す。
pub fn init() -> CoordinatorResult<()> {
    let filter = EnvFilter::try_new(log_filter())
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_LEVEL))
        .map_err(|e| WarmupError::Logging(e.to_string()))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .map_err(|e| WarmupError::Logging(e.to_string()))
}
