//! ステータスオブザーバー
//!
//! 各試行の後にスナップショットを受け取る単一メソッドのインターフェース。
//!
//! # 前提条件
//!
//! 複数のプローブタスクから同時に呼ばれるため`Send + Sync`であること。
//! また呼び出し元タスクの進行を止めないよう、すぐに戻ること。
//! 同一サービスの呼び出しは試行順に並ぶが、サービス間の順序は保証しない。

use service_warmup_common::types::StatusRecord;
use std::sync::Arc;

/// スナップショットの受け取り口
pub trait StatusObserver: Send + Sync {
    /// スナップショットを受け取る
    fn on_status(&self, status: &StatusRecord);
}

impl<F> StatusObserver for F
where
    F: Fn(&StatusRecord) + Send + Sync,
{
    fn on_status(&self, status: &StatusRecord) {
        self(status)
    }
}

/// タスク間で共有するオブザーバー
pub type SharedObserver = Arc<dyn StatusObserver>;

/// 何もしないオブザーバー
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StatusObserver for NoopObserver {
    fn on_status(&self, _status: &StatusRecord) {}
}
