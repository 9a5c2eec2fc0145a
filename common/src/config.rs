//! 設定管理
//!
//! WarmupConfigの定義と、設定ファイル・環境変数からの読み込み

use crate::error::{CommonError, CommonResult};
use crate::types::{default_services, ServiceDescriptor, ServiceRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 環境変数のプレフィックス（例: `SERVICE_WARMUP_TIMEOUT_MS`）
pub const ENV_PREFIX: &str = "SERVICE_WARMUP";

/// ウォームアップ全体の既定タイムアウト（ミリ秒）
pub const DEFAULT_TIMEOUT_MS: u64 = 90_000;

/// 1リクエストあたりのタイムアウト上限（ミリ秒）
pub const REQUEST_TIMEOUT_MS: u64 = 12_000;

/// リトライ間隔（ミリ秒）
pub const RETRY_DELAY_MS: u64 = 3_000;

/// ウォームアップ設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WarmupConfig {
    /// 全体の期限までの時間（ミリ秒）(デフォルト: 90000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// 1リクエストのタイムアウト上限（ミリ秒）(デフォルト: 12000)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// リトライ間隔（ミリ秒）(デフォルト: 3000)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// ネットワークアクセスを省略するバイパスモード (デフォルト: false)
    #[serde(default)]
    pub bypass: bool,

    /// クライアントアプリが動作しているホスト名
    ///
    /// ローカルホストの場合は依存サービスが常に起動済みとみなしバイパスする。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_host: Option<String>,

    /// ウォームアップ対象サービス
    #[serde(default = "default_services")]
    pub services: Vec<ServiceDescriptor>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_request_timeout_ms() -> u64 {
    REQUEST_TIMEOUT_MS
}

fn default_retry_delay_ms() -> u64 {
    RETRY_DELAY_MS
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            bypass: false,
            app_host: None,
            services: default_services(),
        }
    }
}

impl WarmupConfig {
    /// 設定を読み込む
    ///
    /// 既定値 → 設定ファイル（任意） → `SERVICE_WARMUP_*` 環境変数 の順に上書きする。
    pub fn load(path: Option<&Path>) -> CommonResult<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: WarmupConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 設定値を検証する
    pub fn validate(&self) -> CommonResult<()> {
        if self.timeout_ms == 0 {
            return Err(CommonError::Validation(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        ServiceRegistry::new(self.services.clone())?;
        Ok(())
    }

    /// 検証済みのサービスレジストリ
    pub fn registry(&self) -> CommonResult<ServiceRegistry> {
        ServiceRegistry::new(self.services.clone())
    }

    /// 全体のタイムアウト
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// 1リクエストのタイムアウト上限
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// リトライ間隔
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// バイパスモードが有効か
    pub fn bypass_enabled(&self) -> bool {
        self.bypass || self.app_host.as_deref().is_some_and(is_local_host)
    }
}

/// ローカル実行を示すホスト名か
pub fn is_local_host(host: &str) -> bool {
    matches!(host.trim(), "localhost" | "127.0.0.1")
}
