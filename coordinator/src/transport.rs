//! HTTPトランスポート
//!
//! プローバーが使う「GETを送ってステータスかエラーを受け取る」境界。
//! 本番では`ReqwestTransport`、テストではスクリプト化した実装を差し込む。

use crate::error::{WarmupError, CoordinatorResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// 受信したHTTPレスポンス（ボディは見ない）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    /// ステータスコード
    pub status: u16,
}

impl ProbeResponse {
    /// 2xxか
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// レスポンスを受け取れなかった理由
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// 試行ごとのタイムアウトが発火した
    #[error("Request timed out")]
    Timeout,

    /// 接続・DNS等のネットワークエラー
    #[error("{0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// GETリクエストを1回送る
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// `url`へボディ無しのGETを送り、`timeout`以内のレスポンスを返す
    async fn get(&self, url: &str, timeout: Duration) -> Result<ProbeResponse, TransportError>;
}

/// reqwestによるトランスポート
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// 新しいトランスポートを作成
    pub fn new() -> CoordinatorResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| WarmupError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    /// 既存のクライアントを共有する
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<ProbeResponse, TransportError> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        Ok(ProbeResponse {
            status: response.status().as_u16(),
        })
    }
}
