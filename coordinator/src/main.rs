//! Service warmup entry point

use clap::Parser;
use service_warmup::cli::Cli;
use service_warmup::{logging, WakeNoticeTracker, WarmupCoordinator, WarmupOptions};
use service_warmup_common::config::WarmupConfig;
use service_warmup_common::types::{StatusRecord, WarmupResult};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info, warn};

/// 1つ以上のサービスが期限内に起動しなかった場合の終了コード
const EXIT_TIMED_OUT: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Service warmup v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match WarmupConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut config);
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let coordinator = match WarmupCoordinator::from_config(&config) {
        Ok(coordinator) => coordinator,
        Err(e) => {
            error!("Failed to create warmup coordinator: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // 未応答のサービスにはセッション中1回だけ起動中の案内を出す
    let wake_notices = Mutex::new(WakeNoticeTracker::new(
        coordinator.services(),
        !coordinator.is_bypass(),
    ));
    let options = WarmupOptions::with_timeout(config.timeout()).observer(
        move |status: &StatusRecord| {
            info!(
                service_id = %status.id,
                attempts = status.attempts,
                ok = status.ok,
                status_code = ?status.status_code,
                error = ?status.error,
                "Service status"
            );
            if !status.completed {
                let first_notice = wake_notices
                    .lock()
                    .map(|mut tracker| tracker.consume(&status.id))
                    .unwrap_or(false);
                if first_notice {
                    warn!(
                        service = %status.label,
                        "Service is waking up; this may take up to a minute"
                    );
                }
            }
        },
    );

    let result = coordinator.warmup(options).await;

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize result: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_summary(&result);
    }

    if result.timed_out {
        ExitCode::from(EXIT_TIMED_OUT)
    } else {
        ExitCode::SUCCESS
    }
}

fn print_summary(result: &WarmupResult) {
    for status in &result.statuses {
        let state = if status.completed {
            "ready"
        } else if status.timed_out {
            "timed out"
        } else {
            "not ready"
        };
        println!(
            "{:<24} {:<10} attempts={:<3} {}",
            status.label,
            state,
            status.attempts,
            status.error.as_deref().unwrap_or("")
        );
    }
    if result.timed_out {
        println!("Some services did not respond in time; continuing in degraded mode");
    }
}
