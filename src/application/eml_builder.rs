//! HTMLファイルからテスト用のEMLを組み立てる
//!
//! 保存済みのレビュー通知HTMLを圧縮し、text/htmlの単一パートメールとして出力する。

use std::sync::LazyLock;

use lettre::Message;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use regex::Regex;
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("failed to compile email regex")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("failed to compile whitespace regex"));

static INTER_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("failed to compile inter-tag regex"));

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--[\s\S]*?-->").expect("failed to compile comment regex"));

/// EML組み立てのエラー型
#[derive(Debug, Error)]
pub enum EmlBuildError {
    #[error("Invalid email address provided")]
    InvalidAddress,

    #[error("Subject cannot be empty")]
    EmptySubject,

    #[error("failed to build message: {0}")]
    Build(String),
}

/// 宛先・差出人・件名・HTML本文の組
#[derive(Debug, Clone)]
pub struct EmlRequest<'a> {
    pub to: &'a str,
    pub from: &'a str,
    pub subject: &'a str,
    pub html: &'a str,
}

impl EmlRequest<'_> {
    /// 入力を検証する
    ///
    /// 両アドレスが形式に合わない場合は`InvalidAddress`、
    /// 件名が空白のみの場合は`EmptySubject`。
    pub fn validate(&self) -> Result<(), EmlBuildError> {
        if !is_valid_email(self.to) || !is_valid_email(self.from) {
            return Err(EmlBuildError::InvalidAddress);
        }
        if self.subject.trim().is_empty() {
            return Err(EmlBuildError::EmptySubject);
        }
        Ok(())
    }

    /// RFC 5322形式のメッセージを組み立てる
    pub fn build(&self) -> Result<Vec<u8>, EmlBuildError> {
        self.validate()?;

        let from: Mailbox = self
            .from
            .parse()
            .map_err(|_| EmlBuildError::InvalidAddress)?;
        let to: Mailbox = self.to.parse().map_err(|_| EmlBuildError::InvalidAddress)?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject)
            .header(ContentType::TEXT_HTML)
            .body(compress_html(self.html))
            .map_err(|e| EmlBuildError::Build(e.to_string()))?;

        Ok(message.formatted())
    }
}

/// 小文字化したアドレスが`local@domain.tld`の形をしているか
pub fn is_valid_email(address: &str) -> bool {
    EMAIL_RE.is_match(&address.to_lowercase())
}

/// 空白をまとめ、タグ間の空白とコメントを除去してtrimする
pub fn compress_html(html: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(html, " ");
    let joined = INTER_TAG_RE.replace_all(&collapsed, "><");
    COMMENT_RE.replace_all(&joined, "").trim().to_string()
}
