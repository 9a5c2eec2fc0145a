//! Service warmup common
//!
//! ウォームアップ対象サービスの定義・進捗レコード・設定の共通型

#![warn(missing_docs)]

/// 設定管理
pub mod config;

/// エラー型定義
pub mod error;

/// 共通型定義
pub mod types;
