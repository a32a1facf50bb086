/// S3イベント通知
///
/// Lambdaに渡されるS3オブジェクト作成通知を`S3Event`としてデコードし、
/// 処理に必要なバケット名とオブジェクトキーだけを取り出す。
use aws_lambda_events::event::s3::S3Event;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// イベント解釈のエラー型
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InboundEventError {
    /// イベントの形式が不正
    #[error("invalid S3 event: {0}")]
    InvalidFormat(String),
    /// Recordsが空
    #[error("S3 event contains no records")]
    NoRecords,
    /// 先頭レコードに必要なフィールドがない
    #[error("S3 event record is missing {0}")]
    MissingField(&'static str),
}

/// 取得対象のオブジェクト位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    /// デコード済みイベントの先頭レコードから取り出す
    ///
    /// 複数レコードのバッチには対応しておらず、2件目以降は読まない。
    pub fn from_event(event: &S3Event) -> Result<Self, InboundEventError> {
        let record = event.records.first().ok_or(InboundEventError::NoRecords)?;

        let bucket = record
            .s3
            .bucket
            .name
            .clone()
            .ok_or(InboundEventError::MissingField("s3.bucket.name"))?;
        let key = record
            .s3
            .object
            .key
            .clone()
            .ok_or(InboundEventError::MissingField("s3.object.key"))?;

        Ok(Self { bucket, key })
    }
}

/// LambdaペイロードをS3イベントとしてデコードする
pub fn decode_s3_event(event: &Value) -> Result<S3Event, InboundEventError> {
    S3Event::deserialize(event).map_err(|e| InboundEventError::InvalidFormat(e.to_string()))
}
