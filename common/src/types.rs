//! 共通型定義
//!
//! ServiceDescriptor, StatusRecord, WarmupResult等のコアデータ型

use crate::error::{CommonError, CommonResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// ウォームアップ対象のリモートサービス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// 一意識別子
    pub id: String,
    /// 表示名
    pub label: String,
    /// ベースURL
    pub base_url: String,
    /// リクエストパス
    #[serde(default)]
    pub path: String,
}

impl ServiceDescriptor {
    /// 新しいサービス定義を作成
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        base_url: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            base_url: base_url.into(),
            path: path.into(),
        }
    }

    /// ベースURLとパスを連結したプローブ先URL
    pub fn full_url(&self) -> String {
        build_url(&self.base_url, &self.path)
    }
}

/// ベースURLとパスを区切り文字1つで連結する
///
/// ベースが`/`で終わるか、パスが`/`で始まるかに関係なく、
/// 区切りはちょうど1つになる。
pub fn build_url(base_url: &str, path: &str) -> String {
    let mut url = String::with_capacity(base_url.len() + path.len() + 1);
    url.push_str(base_url);
    if !base_url.ends_with('/') {
        url.push('/');
    }
    url.push_str(path.strip_prefix('/').unwrap_or(path));
    url
}

/// 検証済みのサービス一覧（登録順を保持）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRegistry {
    services: Vec<ServiceDescriptor>,
}

impl ServiceRegistry {
    /// サービス一覧からレジストリを作成
    ///
    /// `id`の重複と空のベースURLはエラー。
    pub fn new(services: Vec<ServiceDescriptor>) -> CommonResult<Self> {
        let mut seen = HashSet::with_capacity(services.len());
        for service in &services {
            if service.base_url.trim().is_empty() {
                return Err(CommonError::Validation(format!(
                    "service '{}' has an empty base_url",
                    service.id
                )));
            }
            if !seen.insert(service.id.as_str()) {
                return Err(CommonError::Validation(format!(
                    "duplicate service id: {}",
                    service.id
                )));
            }
        }
        Ok(Self { services })
    }

    /// 登録済みサービス
    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    /// IDでサービスを検索
    pub fn get(&self, id: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.id == id)
    }

    /// サービス数
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// サービスが1つも無いか
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// レジストリを分解してサービス一覧を返す
    pub fn into_services(self) -> Vec<ServiceDescriptor> {
        self.services
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self {
            services: default_services(),
        }
    }
}

/// ホスト版で起動時にウォームアップするリモートサービス
pub fn default_services() -> Vec<ServiceDescriptor> {
    vec![
        ServiceDescriptor::new(
            "assistant",
            "BPMN Assistant API",
            "https://bpmn-assistant-api.onrender.com",
            "/",
        ),
        ServiceDescriptor::new(
            "layout",
            "BPMN Layout Server",
            "https://bpmn-layout-server.onrender.com",
            "/",
        ),
    ]
}

/// サービスごとのプローブ進捗
///
/// 実行中は担当プローバーだけが更新し、オブザーバーには読み取り専用の
/// スナップショットとして渡される。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusRecord {
    /// サービスID
    pub id: String,
    /// 表示名
    pub label: String,
    /// プローブ先URL（開始時に一度だけ算出）
    pub url: String,
    /// 送信済みリクエスト数
    pub attempts: u32,
    /// 何らかのHTTPレスポンスを受信したか
    pub has_responded: bool,
    /// 直近のレスポンスが2xxだったか
    pub ok: bool,
    /// 直近のステータスコード
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// 直近のエラー内容
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 成功を確認済み（終端状態）
    pub completed: bool,
    /// 未完了のまま期限を過ぎた
    pub timed_out: bool,
}

impl StatusRecord {
    /// 初期状態のレコードを作成
    pub fn new(service: &ServiceDescriptor) -> Self {
        Self {
            id: service.id.clone(),
            label: service.label.clone(),
            url: service.full_url(),
            attempts: 0,
            has_responded: false,
            ok: false,
            status_code: None,
            error: None,
            completed: false,
            timed_out: false,
        }
    }

    /// バイパスモード用の成功済みレコードを作成
    pub fn bypassed(service: &ServiceDescriptor) -> Self {
        Self {
            has_responded: true,
            ok: true,
            completed: true,
            status_code: Some(200),
            ..Self::new(service)
        }
    }
}

/// ウォームアップ全体の結果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WarmupResult {
    /// サービスごとの最終状態（レジストリ順）
    pub statuses: Vec<StatusRecord>,
    /// いずれかのサービスがタイムアウトしたか
    pub timed_out: bool,
}

impl WarmupResult {
    /// 最終レコードから結果を組み立てる
    pub fn from_statuses(statuses: Vec<StatusRecord>) -> Self {
        let timed_out = statuses.iter().any(|s| s.timed_out);
        Self {
            statuses,
            timed_out,
        }
    }

    /// 全サービスが成功したか
    pub fn all_completed(&self) -> bool {
        self.statuses.iter().all(|s| s.completed)
    }

    /// 未完了サービスのID
    pub fn pending_services(&self) -> Vec<&str> {
        self.statuses
            .iter()
            .filter(|s| !s.completed)
            .map(|s| s.id.as_str())
            .collect()
    }
}
