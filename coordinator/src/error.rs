//! エラー型定義
//!
//! コーディネーター構築時のエラー。ウォームアップ処理自体は失敗を
//! StatusRecordのデータとして返すため、ここには現れない。

use service_warmup_common::error::CommonError;
use thiserror::Error;

/// Warmup coordinator error type
#[derive(Debug, Error)]
pub enum WarmupError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Logging initialization error
    #[error("Logging error: {0}")]
    Logging(String),
}

/// Warmup coordinator result type
pub type CoordinatorResult<T> = Result<T, WarmupError>;
