/// ログ基盤モジュール
///
/// 出力先ごとにフォーマットとデフォルトのログレベルを切り替える。
/// - Lambda: JSON形式で標準出力へ（CloudWatch Logs向け）
/// - 変換ツール: compact形式で標準エラー出力へ（標準出力は変換結果に使う）
///
/// どちらも`RUST_LOG`があればそれを優先する。
use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Lambdaの高度なログ設定で指定されるログレベル
pub const AWS_LAMBDA_LOG_LEVEL_VAR: &str = "AWS_LAMBDA_LOG_LEVEL";

/// ログサブスクライバー初期化用の同期プリミティブ
static INIT: Once = Once::new();

/// ログの出力先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Lambda関数（process_email）
    Lambda,
    /// ローカルの変換ツール（eml_to_html / html_to_eml）
    Cli,
}

impl LogTarget {
    /// `RUST_LOG`が未設定のときに使うフィルタ指定
    ///
    /// Lambdaでは`AWS_LAMBDA_LOG_LEVEL`（TRACE〜FATAL）を小文字にして使う。
    /// FATALはtracingにないためerrorに読み替える。
    pub fn default_directive(self) -> String {
        match self {
            LogTarget::Lambda => std::env::var(AWS_LAMBDA_LOG_LEVEL_VAR)
                .ok()
                .and_then(|level| lambda_level_directive(&level))
                .unwrap_or_else(|| "info".to_string()),
            LogTarget::Cli => "warn".to_string(),
        }
    }
}

fn lambda_level_directive(level: &str) -> Option<String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "fatal" => Some("error".to_string()),
        level @ ("trace" | "debug" | "info" | "warn" | "error") => Some(level.to_string()),
        _ => None,
    }
}

fn env_filter(target: LogTarget) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(target.default_directive()))
}

/// Lambda環境向けのログサブスクライバーを初期化する
///
/// 複数回呼び出しても最初の1回だけが有効。
///
/// # 使用例
/// ```ignore
/// use review_email_processor::infrastructure::init_logging;
///
/// init_logging();
/// tracing::info!("Lambda function started");
/// ```
pub fn init_logging() {
    init(LogTarget::Lambda);
}

/// 変換ツール向けのログサブスクライバーを初期化する
pub fn init_cli_logging() {
    init(LogTarget::Cli);
}

fn init(target: LogTarget) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(env_filter(target));

        match target {
            LogTarget::Lambda => {
                let json_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .flatten_event(true)
                    .with_current_span(false);
                registry.with(json_layer).init();
            }
            LogTarget::Cli => {
                let fmt_layer = tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact();
                registry.with(fmt_layer).init();
            }
        }
    });
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    });
}
