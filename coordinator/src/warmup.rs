//! ウォームアップコーディネーター
//!
//! 全サービスのプローバーを並列に起動し、共有の期限で束ねて結果を集約する。
//! 全体としてのリトライは行わない。

use crate::error::CoordinatorResult;
use crate::observer::{NoopObserver, SharedObserver, StatusObserver};
use crate::prober::{ProbeSettings, Prober};
use crate::transport::{HttpTransport, ReqwestTransport};
use service_warmup_common::config::{WarmupConfig, DEFAULT_TIMEOUT_MS};
use service_warmup_common::types::{
    ServiceDescriptor, ServiceRegistry, StatusRecord, WarmupResult,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// 1回のウォームアップ呼び出しのオプション
#[derive(Clone)]
pub struct WarmupOptions {
    /// 全体の期限までの時間
    pub timeout: Duration,
    /// スナップショットの通知先
    pub on_status: Option<SharedObserver>,
}

impl Default for WarmupOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            on_status: None,
        }
    }
}

impl WarmupOptions {
    /// 期限を指定して作成
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            on_status: None,
        }
    }

    /// オブザーバーを設定
    pub fn observer(mut self, observer: impl StatusObserver + 'static) -> Self {
        self.on_status = Some(Arc::new(observer));
        self
    }
}

/// ウォームアップコーディネーター
#[derive(Clone)]
pub struct WarmupCoordinator {
    services: Arc<[ServiceDescriptor]>,
    prober: Prober,
    bypass: bool,
}

impl WarmupCoordinator {
    /// 新しいコーディネーターを作成
    pub fn new(registry: ServiceRegistry, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            services: registry.into_services().into(),
            prober: Prober::new(transport, ProbeSettings::default()),
            bypass: false,
        }
    }

    /// 設定からreqwestトランスポート付きで作成
    pub fn from_config(config: &WarmupConfig) -> CoordinatorResult<Self> {
        let registry = config.registry()?;
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::new(registry, transport)
            .with_settings(ProbeSettings::from_config(config))
            .with_bypass(config.bypass_enabled()))
    }

    /// タイミング設定を変更
    pub fn with_settings(mut self, settings: ProbeSettings) -> Self {
        self.prober = Prober::new(self.prober.transport(), settings);
        self
    }

    /// バイパスモードを設定
    pub fn with_bypass(mut self, bypass: bool) -> Self {
        self.bypass = bypass;
        self
    }

    /// 対象サービス
    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    /// バイパスモードか
    pub fn is_bypass(&self) -> bool {
        self.bypass
    }

    /// 全サービスをウォームアップする
    ///
    /// 期限は呼び出し時点から`options.timeout`後。全プローバーの終了を待ち、
    /// レジストリ順に結果を返す。
    pub async fn warmup(&self, options: WarmupOptions) -> WarmupResult {
        let observer: SharedObserver = options
            .on_status
            .unwrap_or_else(|| Arc::new(NoopObserver));

        if self.bypass {
            return self.bypass_all(observer.as_ref());
        }

        let deadline = Instant::now() + options.timeout;

        info!(
            count = self.services.len(),
            timeout_ms = options.timeout.as_millis() as u64,
            "Starting service warmup"
        );

        let mut handles = Vec::with_capacity(self.services.len());
        for service in self.services.iter().cloned() {
            let prober = self.prober.clone();
            let observer = observer.clone();
            handles.push(tokio::spawn(async move {
                prober.run(&service, deadline, observer.as_ref()).await
            }));
        }

        let mut statuses = Vec::with_capacity(handles.len());
        for (service, handle) in self.services.iter().zip(handles) {
            match handle.await {
                Ok(status) => statuses.push(status),
                Err(e) => {
                    error!(service_id = %service.id, "Probe task join error: {}", e);
                    let mut status = StatusRecord::new(service);
                    status.error = Some(format!("Probe task failed: {}", e));
                    status.timed_out = Instant::now() >= deadline;
                    statuses.push(status);
                }
            }
        }

        let result = WarmupResult::from_statuses(statuses);
        if result.timed_out {
            warn!(
                pending = ?result.pending_services(),
                "Service warmup finished with timed out services"
            );
        } else {
            info!(
                ready = result.statuses.iter().filter(|s| s.completed).count(),
                "Service warmup completed"
            );
        }
        result
    }

    fn bypass_all(&self, observer: &dyn StatusObserver) -> WarmupResult {
        info!(
            count = self.services.len(),
            "Bypass mode: skipping service warmup"
        );
        let statuses = self
            .services
            .iter()
            .map(|service| {
                let status = StatusRecord::bypassed(service);
                observer.on_status(&status);
                status
            })
            .collect();
        WarmupResult::from_statuses(statuses)
    }
}

/// 設定を読み込んでウォームアップを1回実行する
pub async fn warmup_services(
    config: &WarmupConfig,
    on_status: Option<SharedObserver>,
) -> CoordinatorResult<WarmupResult> {
    let coordinator = WarmupCoordinator::from_config(config)?;
    let options = WarmupOptions {
        timeout: config.timeout(),
        on_status,
    };
    Ok(coordinator.warmup(options).await)
}
