//! CLI module for service-warmup
//!
//! 起動前にリモートサービスを1回ウォームアップする。

use clap::Parser;
use service_warmup_common::config::WarmupConfig;
use std::path::PathBuf;

/// Service warmup - wake remote dependency services before the client starts
#[derive(Parser, Debug, Default)]
#[command(name = "service-warmup")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    SERVICE_WARMUP_TIMEOUT_MS          Overall deadline in milliseconds (default: 90000)
    SERVICE_WARMUP_REQUEST_TIMEOUT_MS  Per-request timeout ceiling (default: 12000)
    SERVICE_WARMUP_RETRY_DELAY_MS      Delay between attempts (default: 3000)
    SERVICE_WARMUP_BYPASS              Skip network probing (default: false)
    SERVICE_WARMUP_APP_HOST            Client host name; localhost implies bypass
    SERVICE_WARMUP_LOG_LEVEL           Log level (default: info)
"#)]
pub struct Cli {
    /// 設定ファイル（TOML/JSON）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 全体の期限（ミリ秒）
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// ネットワークアクセスを省略する
    #[arg(long)]
    pub bypass: bool,

    /// クライアントのホスト名（localhostならバイパス）
    #[arg(long)]
    pub app_host: Option<String>,

    /// 結果をJSONで出力する
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// コマンドライン引数で設定を上書きする
    pub fn apply(&self, config: &mut WarmupConfig) {
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if self.bypass {
            config.bypass = true;
        }
        if let Some(host) = &self.app_host {
            config.app_host = Some(host.clone());
        }
    }
}
