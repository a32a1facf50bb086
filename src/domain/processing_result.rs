/// 1回の呼び出しの処理結果
///
/// Lambda関数の戻り値として`{"statusCode": ..., "body": "<JSON文字列>"}`の形で返す。
/// bodyはReviewRecordまたはメッセージ文字列をJSONシリアライズしたもの。
use serde::{Deserialize, Serialize};

use super::review_record::ReviewRecord;

/// 処理成功
pub const STATUS_OK: u16 = 200;
/// 想定内のスキップ（送信者不許可、HTMLなし）
pub const STATUS_BAD_REQUEST: u16 = 400;
/// 処理失敗
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// 処理結果（ステータスコードとJSONボディ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    /// HTTPステータスコード相当の値
    pub status_code: u16,
    /// JSONシリアライズ済みのボディ
    pub body: String,
}

impl ProcessingResult {
    /// 抽出したレビューをボディに持つ成功結果を作成
    pub fn success(record: &ReviewRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status_code: STATUS_OK,
            body: serde_json::to_string(record)?,
        })
    }

    /// メッセージ文字列をボディに持つ結果を作成
    pub fn message(status_code: u16, message: &str) -> Self {
        Self {
            status_code,
            body: serde_json::Value::String(message.to_string()).to_string(),
        }
    }

    /// 400の結果を作成
    pub fn bad_request(message: &str) -> Self {
        Self::message(STATUS_BAD_REQUEST, message)
    }

    /// 500の結果を作成
    pub fn internal_error(message: &str) -> Self {
        Self::message(STATUS_INTERNAL_ERROR, message)
    }
}
