/// メール処理ハンドラー
///
/// S3イベント1件につき1通のメールを処理する。
/// 取得 → パース → 送信者確認 → HTML正規化 → レビュー抽出 → 下流処理 の順に進み、
/// 各段階で失敗した時点で処理結果を返す。
///
/// 結果のステータスは200/400/500の3種類のみ。パース失敗や送信者欠落などの
/// 想定外のエラーはすべて同じ500「Error processing email」にまとめる。
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::inbound_event::{InboundEventError, ObjectLocation, decode_s3_event};
use crate::application::message_parser::{EmailParser, MessageParseError};
use crate::domain::{ProcessingResult, ReviewExtractor, SenderAllowList};
use crate::infrastructure::{FetchError, ObjectFetcher, ReviewSink, SinkError};

/// オブジェクトのボディがない場合のメッセージ
pub const BODY_UNDEFINED_MESSAGE: &str = "Response body is undefined";
/// 送信者が許可されていない場合のメッセージ
pub const SENDER_NOT_ALLOWED_MESSAGE: &str = "Email skipped - sender not allowed";
/// HTML本文がない場合のメッセージ
pub const NO_HTML_MESSAGE: &str = "Email skipped - body doesn't contain HTML";
/// 抽出結果が不完全な場合のメッセージ
pub const INCOMPLETE_EXTRACTION_MESSAGE: &str = "Failed to extract complete review information";
/// 想定外のエラー時のメッセージ
pub const PROCESSING_ERROR_MESSAGE: &str = "Error processing email";

/// メール処理中の想定外のエラー
///
/// 呼び出し元には区別せず500として返し、詳細はログにのみ残す。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmailHandlerError {
    /// S3イベントを解釈できない
    #[error(transparent)]
    InvalidEvent(#[from] InboundEventError),
    /// オブジェクト取得に失敗
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// メールのパースに失敗
    #[error(transparent)]
    Parse(#[from] MessageParseError),
    /// 下流処理に失敗
    #[error(transparent)]
    Sink(#[from] SinkError),
    /// 結果のシリアライズに失敗
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EmailHandlerError {
    fn from(err: serde_json::Error) -> Self {
        EmailHandlerError::Serialization(err.to_string())
    }
}

/// S3に届いたレビュー通知メールを処理するハンドラー
pub struct EmailHandler<F, S>
where
    F: ObjectFetcher,
    S: ReviewSink,
{
    /// オブジェクトフェッチャー
    fetcher: F,
    /// 抽出したレビューの送り先
    sink: S,
    /// 送信者許可リスト
    allow_list: SenderAllowList,
    /// レビュー抽出器
    extractor: ReviewExtractor,
}

impl<F, S> EmailHandler<F, S>
where
    F: ObjectFetcher,
    S: ReviewSink,
{
    /// 新しいEmailHandlerを作成
    pub fn new(fetcher: F, sink: S, allow_list: SenderAllowList, extractor: ReviewExtractor) -> Self {
        Self {
            fetcher,
            sink,
            allow_list,
            extractor,
        }
    }

    /// S3イベントを処理して結果を返す
    ///
    /// 失敗は常に`ProcessingResult`として表現し、この関数自体はエラーを返さない。
    pub async fn handle(&self, event: &Value) -> ProcessingResult {
        let result = match self.process(event).await {
            Ok(result) => result,
            Err(err) => {
                error!(error = %err, "Error processing email");
                ProcessingResult::internal_error(PROCESSING_ERROR_MESSAGE)
            }
        };

        info!(status_code = result.status_code, "メール処理完了");
        result
    }

    async fn process(&self, event: &Value) -> Result<ProcessingResult, EmailHandlerError> {
        let notification = decode_s3_event(event)?;
        if notification.records.len() > 1 {
            warn!(
                record_count = notification.records.len(),
                "複数レコードのイベントは先頭のみ処理"
            );
        }
        let location = ObjectLocation::from_event(&notification)?;

        info!(bucket = %location.bucket, key = %location.key, "メール取得開始");

        let Some(raw) = self.fetcher.fetch(&location.bucket, &location.key).await? else {
            error!(bucket = %location.bucket, key = %location.key, "Response body is undefined");
            return Ok(ProcessingResult::internal_error(BODY_UNDEFINED_MESSAGE));
        };

        let email = EmailParser::parse(&raw)?;

        if !self.allow_list.is_allowed(&email.sender) {
            info!(sender = %email.sender, "Skipping email from non-allowed sender");
            return Ok(ProcessingResult::bad_request(SENDER_NOT_ALLOWED_MESSAGE));
        }

        let Some(html) = email.normalized_html() else {
            info!(sender = %email.sender, "No HTML content found in the email");
            return Ok(ProcessingResult::bad_request(NO_HTML_MESSAGE));
        };

        let record = self.extractor.extract(&html);
        if !record.is_complete() {
            error!(
                reviewer_name_found = !record.reviewer_name.is_empty(),
                review_snippet_found = !record.review_snippet.is_empty(),
                rating = record.rating,
                "Failed to extract complete review information"
            );
            return Ok(ProcessingResult::internal_error(INCOMPLETE_EXTRACTION_MESSAGE));
        }

        self.sink.process(&record).await?;

        Ok(ProcessingResult::success(&record)?)
    }
}
