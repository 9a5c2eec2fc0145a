//! 起動通知の表示状態
//!
//! ホスト版でサービスへ初めてアクセスしたときにだけ「起動中」通知を出すための
//! セッション状態。呼び出し側が所有し、明示的に受け渡す。

use service_warmup_common::types::ServiceDescriptor;
use std::collections::HashMap;

/// サービスごとの起動通知の消費状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeNoticeTracker {
    hosted: bool,
    shown: HashMap<String, bool>,
}

impl WakeNoticeTracker {
    /// サービス一覧から作成
    ///
    /// `hosted`がfalse（ローカル実行）の場合、通知は一切出さない。
    pub fn new(services: &[ServiceDescriptor], hosted: bool) -> Self {
        Self {
            hosted,
            shown: services.iter().map(|s| (s.id.clone(), false)).collect(),
        }
    }

    /// 通知を出すべきなら状態を消費してtrueを返す
    ///
    /// 同じサービスに対して2回目以降はfalse。未知のIDもfalse。
    pub fn consume(&mut self, service_id: &str) -> bool {
        if !self.hosted {
            return false;
        }
        match self.shown.get_mut(service_id) {
            Some(shown) if !*shown => {
                *shown = true;
                true
            }
            _ => false,
        }
    }

    /// 再度通知を出せるよう戻す
    pub fn reset(&mut self, service_id: &str) {
        if !self.hosted {
            return;
        }
        if let Some(shown) = self.shown.get_mut(service_id) {
            *shown = false;
        }
    }
}
