//! Integration Test: 実HTTPサーバーに対するウォームアップ
//!
//! wiremockのモックサーバーを相手に、ReqwestTransport経由でプローブする。

use service_warmup::{
    warmup_services, ProbeSettings, ReqwestTransport, StatusObserver, WarmupCoordinator,
    WarmupOptions,
};
use service_warmup_common::config::WarmupConfig;
use service_warmup_common::types::{ServiceDescriptor, ServiceRegistry, StatusRecord};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Recorder {
    records: Mutex<Vec<StatusRecord>>,
}

impl Recorder {
    fn all(&self) -> Vec<StatusRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl StatusObserver for Recorder {
    fn on_status(&self, status: &StatusRecord) {
        self.records.lock().unwrap().push(status.clone());
    }
}

fn fast_settings() -> ProbeSettings {
    ProbeSettings {
        request_timeout: Duration::from_millis(500),
        retry_delay: Duration::from_millis(50),
    }
}

fn coordinator(services: Vec<ServiceDescriptor>) -> WarmupCoordinator {
    let registry = ServiceRegistry::new(services).expect("valid registry");
    let transport = Arc::new(ReqwestTransport::new().expect("http client"));
    WarmupCoordinator::new(registry, transport).with_settings(fast_settings())
}

/// 正常系: 初回で200が返る
#[tokio::test]
async fn test_service_ready_on_first_attempt() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"ok"}"#))
        .expect(1)
        .mount(&mock)
        .await;

    let coordinator = coordinator(vec![ServiceDescriptor::new(
        "layout",
        "BPMN Layout Server",
        mock.uri(),
        "/",
    )]);
    let result = coordinator
        .warmup(WarmupOptions::with_timeout(Duration::from_secs(5)))
        .await;

    assert!(!result.timed_out);
    let status = &result.statuses[0];
    assert_eq!(status.attempts, 1);
    assert!(status.completed);
    assert!(status.ok);
    assert_eq!(status.status_code, Some(200));
    assert_eq!(status.url, format!("{}/", mock.uri()));
}

/// 503が2回続いた後に200
#[tokio::test]
async fn test_service_unavailable_then_ready() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock)
        .await;

    let coordinator = coordinator(vec![ServiceDescriptor::new(
        "assistant",
        "BPMN Assistant API",
        format!("{}/", mock.uri()),
        "/health",
    )]);
    let recorder = Arc::new(Recorder::default());
    let result = coordinator
        .warmup(WarmupOptions {
            timeout: Duration::from_secs(5),
            on_status: Some(recorder.clone()),
        })
        .await;

    let snapshots = recorder.all();
    assert_eq!(snapshots.len(), 3);
    for snapshot in &snapshots[..2] {
        assert!(!snapshot.ok);
        assert_eq!(snapshot.status_code, Some(503));
        assert_eq!(snapshot.error.as_deref(), Some("Unexpected status: 503"));
    }
    assert!(snapshots[2].ok);
    assert!(snapshots[2].completed);
    assert_eq!(snapshots[2].attempts, 3);
    assert!(!result.timed_out);
}

/// 応答が遅すぎる場合は試行タイムアウトになる
#[tokio::test]
async fn test_slow_service_times_out() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock)
        .await;

    let registry = ServiceRegistry::new(vec![ServiceDescriptor::new(
        "slow",
        "Slow Service",
        mock.uri(),
        "/",
    )])
    .unwrap();
    let transport = Arc::new(ReqwestTransport::new().unwrap());
    let coordinator = WarmupCoordinator::new(registry, transport).with_settings(ProbeSettings {
        request_timeout: Duration::from_millis(200),
        retry_delay: Duration::from_millis(100),
    });
    let recorder = Arc::new(Recorder::default());
    let started = Instant::now();

    let result = coordinator
        .warmup(WarmupOptions {
            timeout: Duration::from_millis(700),
            on_status: Some(recorder.clone()),
        })
        .await;

    // 期限 + 待機1回分を大きく超えない
    assert!(started.elapsed() < Duration::from_millis(1500));
    assert!(result.timed_out);

    let snapshots = recorder.all();
    assert!(!snapshots.is_empty());
    for snapshot in &snapshots {
        assert_eq!(snapshot.error.as_deref(), Some("Request timed out"));
    }
    let status = &result.statuses[0];
    assert!(!status.has_responded);
    assert!(!status.completed);
    assert!(status.attempts >= 1);
}

/// 接続できない場合はネットワークエラーとして記録される
#[tokio::test]
async fn test_unreachable_service() {
    // 空きポートを確保してすぐ閉じる
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let coordinator = coordinator(vec![ServiceDescriptor::new("down", "Down", uri, "/")]);
    let result = coordinator
        .warmup(WarmupOptions::with_timeout(Duration::from_millis(300)))
        .await;

    let status = &result.statuses[0];
    assert!(result.timed_out);
    assert!(status.timed_out);
    assert!(!status.has_responded);
    assert!(status.attempts >= 1);
    assert_eq!(status.status_code, None);
    assert!(status.error.as_deref().is_some_and(|e| !e.is_empty()));
}

/// 片方だけ起動した場合、全体はタイムアウト扱い
#[tokio::test]
async fn test_mixed_results_keep_registry_order() {
    let ready = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&ready)
        .await;
    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&broken)
        .await;

    let coordinator = coordinator(vec![
        ServiceDescriptor::new("broken", "Broken", broken.uri(), "/"),
        ServiceDescriptor::new("ready", "Ready", ready.uri(), "/"),
    ]);
    let result = coordinator
        .warmup(WarmupOptions::with_timeout(Duration::from_millis(400)))
        .await;

    assert!(result.timed_out);
    assert_eq!(result.statuses[0].id, "broken");
    assert_eq!(result.statuses[1].id, "ready");

    let broken_status = &result.statuses[0];
    assert!(broken_status.has_responded);
    assert!(broken_status.timed_out);
    assert!(broken_status.attempts > 1);
    assert_eq!(broken_status.error.as_deref(), Some("Unexpected status: 404"));

    let ready_status = &result.statuses[1];
    assert!(ready_status.completed);
    assert!(!ready_status.timed_out);
    assert_eq!(result.pending_services(), vec!["broken"]);
}

/// バイパスモードではネットワークに触れない
#[tokio::test]
async fn test_warmup_services_bypass_from_config() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock)
        .await;

    let config = WarmupConfig {
        app_host: Some("127.0.0.1".to_string()),
        services: vec![ServiceDescriptor::new("svc", "Service", mock.uri(), "/")],
        ..WarmupConfig::default()
    };
    let recorder = Arc::new(Recorder::default());
    let started = Instant::now();

    let result = warmup_services(&config, Some(recorder.clone()))
        .await
        .expect("warmup");

    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(!result.timed_out);
    assert_eq!(result.statuses[0].status_code, Some(200));
    assert!(result.statuses[0].completed);
    assert_eq!(recorder.all(), result.statuses);
}

/// 設定経由でも期限・間隔が反映される
#[tokio::test]
async fn test_warmup_services_uses_config_timing() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock)
        .await;

    let config = WarmupConfig {
        timeout_ms: 300,
        request_timeout_ms: 200,
        retry_delay_ms: 50,
        services: vec![ServiceDescriptor::new("svc", "Service", mock.uri(), "/")],
        ..WarmupConfig::default()
    };
    let started = Instant::now();

    let result = warmup_services(&config, None).await.expect("warmup");

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(result.timed_out);
    assert!(result.statuses[0].attempts > 1);
    assert_eq!(result.statuses[0].status_code, Some(502));
}
