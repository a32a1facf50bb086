/// レビュー通知メールから抽出したレビュー情報
///
/// 空文字列と評価0は「見つからなかった」ことを表し、有効な値としては扱わない。
use serde::{Deserialize, Serialize};

/// 1件のレビュー（レビュアー名・本文・星評価）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    /// レビュアー名
    pub reviewer_name: String,
    /// レビュー本文の抜粋
    pub review_snippet: String,
    /// 星評価（見つからない場合は0）
    pub rating: u8,
}

impl ReviewRecord {
    /// 新しいReviewRecordを作成
    pub fn new(
        reviewer_name: impl Into<String>,
        review_snippet: impl Into<String>,
        rating: u8,
    ) -> Self {
        Self {
            reviewer_name: reviewer_name.into(),
            review_snippet: review_snippet.into(),
            rating,
        }
    }

    /// 3つのフィールドがすべて揃っているか
    pub fn is_complete(&self) -> bool {
        !self.reviewer_name.is_empty() && !self.review_snippet.is_empty() && self.rating != 0
    }
}
