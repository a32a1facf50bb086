/// EMLファイルのHTML本文を整形して表示するツール
///
/// レビュー通知メールのテンプレートを調べるときに使う。
///
/// # ローカル実行
/// ```bash
/// cargo run --bin eml_to_html -- tests/fixtures/valid-email.eml
/// ```
use clap::Parser;
use review_email_processor::application::{HtmlPreviewError, preview_eml_html};
use review_email_processor::infrastructure::init_cli_logging;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::debug;

const NO_HTML_CONTENT_MESSAGE: &str = "No HTML content found in the email.";

/// コマンドライン引数
#[derive(Parser, Debug)]
#[command(name = "eml_to_html")]
#[command(about = "EMLファイルのHTML本文を整形して表示する")]
struct CliArgs {
    /// 読み込むEMLファイル
    path: PathBuf,
}

#[derive(Debug, Error)]
enum EmlToHtmlError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Preview(#[from] HtmlPreviewError),
}

fn main() -> ExitCode {
    init_cli_logging();

    let args = CliArgs::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), EmlToHtmlError> {
    let raw = std::fs::read(&args.path).map_err(|source| EmlToHtmlError::Read {
        path: args.path.display().to_string(),
        source,
    })?;
    debug!(path = %args.path.display(), bytes = raw.len(), "EMLファイルを読み込み");

    match preview_eml_html(&raw)? {
        Some(html) => print!("{}", html),
        None => println!("{}", NO_HTML_CONTENT_MESSAGE),
    }

    Ok(())
}
