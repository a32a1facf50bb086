/// 抽出したレビューの送り先
///
/// 現状の下流処理はログ出力のみ。
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::domain::ReviewRecord;

/// 下流処理のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SinkError {
    /// 下流への引き渡しに失敗
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),
}

/// 抽出済みレビューを下流へ渡すトレイト
#[async_trait]
pub trait ReviewSink: Send + Sync {
    /// 完全なレビュー1件を処理する
    async fn process(&self, record: &ReviewRecord) -> Result<(), SinkError>;
}

/// レビューをログに出力するだけのシンク
#[derive(Debug, Clone, Default)]
pub struct LoggingReviewSink;

impl LoggingReviewSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReviewSink for LoggingReviewSink {
    async fn process(&self, record: &ReviewRecord) -> Result<(), SinkError> {
        info!(
            reviewer_name = %record.reviewer_name,
            rating = record.rating,
            "Processed review from {}: {}, {}",
            record.reviewer_name,
            record.review_snippet,
            record.rating
        );
        Ok(())
    }
}
