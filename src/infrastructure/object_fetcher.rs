/// S3からメールオブジェクトを取得するためのオブジェクトフェッチャー
///
/// 再試行やバックオフはAWS SDK側の責務とし、ここでは行わない。
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::error::DisplayErrorContext;
use thiserror::Error;
use tracing::{debug, warn};

/// オブジェクト取得のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    /// GetObject API呼び出しに失敗
    #[error("GetObject failed: {0}")]
    GetObjectFailed(String),

    /// レスポンスボディの読み取りに失敗
    #[error("Body read error: {0}")]
    BodyReadError(String),
}

/// ストレージからオブジェクトのバイト列を取得するトレイト
///
/// 実際のS3とテスト用モックを差し替えられるように抽象化する。
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// オブジェクトを取得する
    ///
    /// # 引数
    /// * `bucket` - バケット名
    /// * `key` - オブジェクトキー
    ///
    /// # 戻り値
    /// * `Ok(Some(bytes))` - 取得成功
    /// * `Ok(None)` - レスポンスにボディがない
    /// * `Err(FetchError)` - 取得失敗
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, FetchError>;
}

/// AWS S3 SDKを使用したオブジェクトフェッチャー
#[derive(Debug, Clone)]
pub struct S3ObjectFetcher {
    client: S3Client,
}

impl S3ObjectFetcher {
    /// 新しいS3ObjectFetcherを作成
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectFetcher for S3ObjectFetcher {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, FetchError> {
        debug!(bucket = %bucket, key = %key, "GetObject実行");

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                warn!(
                    bucket = %bucket,
                    key = %key,
                    error = %DisplayErrorContext(&err),
                    "GetObjectエラー"
                );
                FetchError::GetObjectFailed(DisplayErrorContext(&err).to_string())
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|err| FetchError::BodyReadError(err.to_string()))?
            .into_bytes();

        debug!(bucket = %bucket, key = %key, size = bytes.len(), "GetObject完了");

        Ok(Some(bytes.to_vec()))
    }
}
