//! Service warmup coordinator
//!
//! クライアント起動前に依存リモートサービスを並列にプローブし、
//! 各サービスの進捗を通知しながら期限内の起動を待つ。

#![warn(missing_docs)]

/// CLIインターフェース
pub mod cli;

/// エラー型定義
pub mod error;

/// ロギング初期化ユーティリティ
pub mod logging;

/// ステータスオブザーバー
pub mod observer;

/// サービスごとのリトライループ
pub mod prober;

/// HTTPトランスポート
pub mod transport;

/// 起動通知のセッション状態
pub mod wake;

/// ウォームアップコーディネーター
pub mod warmup;


pub use observer::{SharedObserver, StatusObserver};
pub use prober::{ProbeSettings, Prober};
pub use transport::{HttpTransport, ProbeResponse, ReqwestTransport, TransportError};
pub use wake::WakeNoticeTracker;
pub use warmup::{warmup_services, WarmupCoordinator, WarmupOptions};
