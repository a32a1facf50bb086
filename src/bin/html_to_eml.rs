/// HTMLファイルからEMLファイルを生成するツール
///
/// 保存したレビュー通知HTMLを、処理関数のテスト入力になるメールとして書き出す。
///
/// # ローカル実行
/// ```bash
/// cargo run --bin html_to_eml -- \
///     owner@example.com businessprofile-noreply@google.com "New review" \
///     review.html review.eml
/// ```
use clap::Parser;
use review_email_processor::application::{EmlBuildError, EmlRequest};
use review_email_processor::infrastructure::init_cli_logging;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::info;

/// コマンドライン引数
#[derive(Parser, Debug)]
#[command(name = "html_to_eml")]
#[command(about = "HTMLファイルをtext/htmlメールとしてEMLファイルに書き出す")]
struct CliArgs {
    /// 宛先アドレス
    to: String,
    /// 差出人アドレス
    from: String,
    /// 件名
    subject: String,
    /// 本文にするHTMLファイル
    html_file: PathBuf,
    /// 出力先のEMLファイル
    output_file: PathBuf,
}

#[derive(Debug, Error)]
enum HtmlToEmlError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Build(#[from] EmlBuildError),
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

fn run(args: &CliArgs) -> Result<(), HtmlToEmlError> {
    // ファイルを読む前に引数を検証する
    let mut request = EmlRequest {
        to: &args.to,
        from: &args.from,
        subject: &args.subject,
        html: "",
    };
    request.validate()?;

    let html = std::fs::read_to_string(&args.html_file).map_err(|source| HtmlToEmlError::Read {
        path: args.html_file.display().to_string(),
        source,
    })?;
    request.html = &html;

    let eml = request.build()?;

    let output_path = std::path::absolute(&args.output_file).unwrap_or_else(|_| args.output_file.clone());
    std::fs::write(&output_path, eml).map_err(|source| HtmlToEmlError::Write {
        path: output_path.display().to_string(),
        source,
    })?;
    info!(path = %output_path.display(), "EMLファイルを書き出し");

    Ok(())
}
