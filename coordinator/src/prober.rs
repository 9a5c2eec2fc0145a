//! サービスプローバー
//!
//! 1サービス分のリトライループ。共有の期限までに成功するか、
//! 期限を過ぎるまでGETを繰り返し、試行ごとにスナップショットを通知する。
//!
//! 失敗（ネットワークエラー、非2xx、試行タイムアウト）はすべて
//! StatusRecordのデータとして記録され、呼び出し元へは伝播しない。

use crate::observer::StatusObserver;
use crate::transport::{HttpTransport, ProbeResponse, TransportError};
use service_warmup_common::config::{WarmupConfig, REQUEST_TIMEOUT_MS, RETRY_DELAY_MS};
use service_warmup_common::types::{ServiceDescriptor, StatusRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

/// 試行タイムアウト時のエラー
pub const TIMED_OUT_ERROR: &str = "Request timed out";

/// エラー内容が取れなかった失敗
pub const REQUEST_FAILED_ERROR: &str = "Request failed";

/// 一度も試行せずに終わった場合のエラー
pub const NO_RESPONSE_ERROR: &str = "No response received";

/// リトライループのタイミング設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    /// 1リクエストのタイムアウト上限
    pub request_timeout: Duration,
    /// 失敗後の待機時間
    pub retry_delay: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        }
    }
}

impl ProbeSettings {
    /// 設定から作成
    pub fn from_config(config: &WarmupConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            retry_delay: config.retry_delay(),
        }
    }
}

/// サービスプローバー
#[derive(Clone)]
pub struct Prober {
    transport: Arc<dyn HttpTransport>,
    settings: ProbeSettings,
}

impl Prober {
    /// 新しいプローバーを作成
    pub fn new(transport: Arc<dyn HttpTransport>, settings: ProbeSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// 共有トランスポート
    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        self.transport.clone()
    }

    /// タイミング設定
    pub fn settings(&self) -> ProbeSettings {
        self.settings
    }

    /// 今回の試行に使うタイムアウト
    ///
    /// 上限値と期限までの残り時間の小さい方。最終試行が期限を越えて
    /// 長引かないよう、残り時間で頭打ちにする。
    pub fn attempt_timeout(&self, deadline: Instant) -> Duration {
        let remaining = deadline.saturating_duration_since(Instant::now());
        self.settings.request_timeout.min(remaining)
    }

    /// 成功するか期限を過ぎるまでサービスをプローブする
    pub async fn run(
        &self,
        service: &ServiceDescriptor,
        deadline: Instant,
        observer: &dyn StatusObserver,
    ) -> StatusRecord {
        let mut status = StatusRecord::new(service);

        while Instant::now() < deadline && !status.completed {
            status.attempts += 1;
            let attempt_timeout = self.attempt_timeout(deadline);

            debug!(
                service_id = %status.id,
                url = %status.url,
                attempt = status.attempts,
                timeout_ms = attempt_timeout.as_millis() as u64,
                "Requesting service"
            );

            match self.send(&status.url, attempt_timeout).await {
                Ok(response) => {
                    debug!(
                        service_id = %status.id,
                        status = response.status,
                        ok = response.is_success(),
                        "Received response"
                    );
                    apply_response(&mut status, response);
                }
                Err(err) => {
                    debug!(
                        service_id = %status.id,
                        attempt = status.attempts,
                        error = %err,
                        "Request failed"
                    );
                    status.error = Some(failure_message(&err));
                }
            }

            observer.on_status(&status);

            if !status.completed && Instant::now() < deadline {
                // 期限を跨いでも待機は打ち切らない。次のループ判定で止まる。
                sleep(self.settings.retry_delay).await;
            }
        }

        status.timed_out = !status.completed && Instant::now() >= deadline;
        if !status.has_responded && status.error.is_none() {
            status.error = Some(NO_RESPONSE_ERROR.to_string());
        }

        // 成功時は最終試行のスナップショットがそのまま終端状態になる
        if !status.completed {
            observer.on_status(&status);
        }

        if status.completed {
            info!(
                service_id = %status.id,
                attempts = status.attempts,
                "Service is ready"
            );
        } else {
            warn!(
                service_id = %status.id,
                attempts = status.attempts,
                error = ?status.error,
                "Service did not become ready before the deadline"
            );
        }

        status
    }

    async fn send(
        &self,
        url: &str,
        attempt_timeout: Duration,
    ) -> Result<ProbeResponse, TransportError> {
        match timeout(attempt_timeout, self.transport.get(url, attempt_timeout)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        }
    }
}

fn apply_response(status: &mut StatusRecord, response: ProbeResponse) {
    let ok = response.is_success();
    status.has_responded = true;
    status.status_code = Some(response.status);
    status.ok = ok;
    status.completed = ok;
    status.error = if ok {
        None
    } else {
        Some(format!("Unexpected status: {}", response.status))
    };
}

fn failure_message(err: &TransportError) -> String {
    match err {
        TransportError::Timeout => TIMED_OUT_ERROR.to_string(),
        TransportError::Request(message) if message.trim().is_empty() => {
            REQUEST_FAILED_ERROR.to_string()
        }
        TransportError::Request(message) => message.clone(),
    }
}
