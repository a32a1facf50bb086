/// レビュー通知メール処理Lambda関数
///
/// S3へのメール保存イベントを受け取り、メールからレビュー情報を抽出する。
/// Lambda関数としても、ローカルスクリプトとしても実行可能。
///
/// # 環境変数
/// - RUST_LOG: ログレベル（デフォルト: info）
/// - S3_ENDPOINT_URL: S3互換ストレージのエンドポイント（任意）
///
/// # ローカル実行
/// ```bash
/// export AWS_REGION=eu-west-1
///
/// # S3イベントJSONを指定して1回だけ処理
/// cargo run --bin process_email -- --event event.json
/// ```
use clap::Parser;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use review_email_processor::application::{EmailHandler, PROCESSING_ERROR_MESSAGE};
use review_email_processor::domain::{
    ExtractionRules, ProcessingResult, ReviewExtractor, SenderAllowList,
};
use review_email_processor::infrastructure::{
    LoggingReviewSink, S3ObjectFetcher, StorageConfig, init_logging,
};
use serde_json::Value;
use std::path::PathBuf;
use tokio::sync::OnceCell;
use tracing::{error, info};

type ReviewEmailHandler = EmailHandler<S3ObjectFetcher, LoggingReviewSink>;

/// EmailHandlerの静的インスタンス
///
/// Lambda warm start時にS3クライアントを再利用するため、
/// 一度初期化したハンドラーを静的に保持する。
static HANDLER: OnceCell<ReviewEmailHandler> = OnceCell::const_new();

/// コマンドライン引数（ローカル実行用）
#[derive(Parser, Debug)]
#[command(name = "process_email")]
#[command(about = "S3イベントJSONを読み込み、レビュー通知メールを1件処理する")]
struct CliArgs {
    /// S3イベント通知のJSONファイル
    #[arg(long, short = 'e')]
    event: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // Lambda環境かどうかを判定
    if std::env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
        let func = service_fn(handler);
        lambda_runtime::run(func).await?;
    } else {
        info!("ローカルスクリプトとして起動");
        run_local().await?;
    }

    Ok(())
}

/// EmailHandlerを取得（初期化されていなければ初期化）
async fn get_handler() -> Result<&'static ReviewEmailHandler, Error> {
    HANDLER
        .get_or_try_init(|| async {
            let config = StorageConfig::from_env().await?;
            info!(endpoint_url = ?config.endpoint_url(), "S3クライアントを初期化");
            let extractor = ReviewExtractor::new(ExtractionRules::default())?;

            Ok::<_, Error>(EmailHandler::new(
                S3ObjectFetcher::new(config.client().clone()),
                LoggingReviewSink::new(),
                SenderAllowList::default(),
                extractor,
            ))
        })
        .await
}

/// Lambda関数のメインハンドラー
///
/// # 処理フロー
/// 1. EmailHandlerを取得（初回のみS3クライアントを初期化）
/// 2. S3イベントの先頭レコードのメールを処理
/// 3. 処理結果を`{statusCode, body}`として返却
async fn handler(event: LambdaEvent<Value>) -> Result<ProcessingResult, Error> {
    let request_id = event.context.request_id.clone();
    info!(request_id = %request_id, "S3イベントを受信");

    Ok(process(&event.payload).await)
}

async fn process(event: &Value) -> ProcessingResult {
    match get_handler().await {
        Ok(email_handler) => email_handler.handle(event).await,
        Err(err) => {
            error!(error = %err, "ハンドラー初期化失敗");
            ProcessingResult::internal_error(PROCESSING_ERROR_MESSAGE)
        }
    }
}

/// ローカル実行用関数
async fn run_local() -> Result<(), Error> {
    let args = CliArgs::parse();

    let contents = tokio::fs::read_to_string(&args.event).await.map_err(|e| {
        error!(error = %e, path = %args.event.display(), "イベントファイルの読み込みに失敗");
        Error::from(format!("Failed to read {}: {}", args.event.display(), e))
    })?;
    let event: Value = serde_json::from_str(&contents)?;

    let result = process(&event).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
