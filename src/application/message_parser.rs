/// メールパーサー
///
/// S3から取得した生のメールをMIMEとしてパースし、
/// 送信者アドレスとHTML本文を取り出す。
use std::sync::LazyLock;

use mail_parser::{Message, MessageParser, PartType};
use regex::Regex;
use thiserror::Error;

/// 連続する空白とゼロ幅接合子（U+200D）、BOM（U+FEFF）
static HTML_WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s\u{200D}\u{FEFF}]+").expect("failed to compile HTML whitespace regex")
});

/// メールパースエラー
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MessageParseError {
    /// MIMEメッセージとして解釈できない
    #[error("failed to parse message")]
    Unparseable,

    /// Fromヘッダーから送信者アドレスを取得できない
    #[error("sender address not found")]
    MissingSender,
}

/// パース済みのメール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEmail {
    /// 送信者アドレス（Fromヘッダーの最初のアドレス）
    pub sender: String,
    /// HTML本文（text/htmlパートがない場合はNone）
    pub html: Option<String>,
}

impl ParsedEmail {
    /// 正規化済みのHTML本文
    ///
    /// HTML本文がない場合、または正規化後に空になる場合はNone。
    pub fn normalized_html(&self) -> Option<String> {
        self.html
            .as_deref()
            .map(normalize_html)
            .filter(|html| !html.is_empty())
    }
}

/// メールパーサー
pub struct EmailParser;

impl EmailParser {
    /// 生のメールバイト列をパースする
    ///
    /// # 戻り値
    /// * `Ok(ParsedEmail)` - パース成功
    /// * `Err(MessageParseError)` - パース失敗、または送信者が見つからない
    pub fn parse(raw: &[u8]) -> Result<ParsedEmail, MessageParseError> {
        let message = MessageParser::default()
            .parse(raw)
            .ok_or(MessageParseError::Unparseable)?;

        let sender = message
            .from()
            .and_then(|from| from.first())
            .and_then(|addr| addr.address())
            .map(|address| address.to_string())
            .ok_or(MessageParseError::MissingSender)?;

        Ok(ParsedEmail {
            sender,
            html: html_body(&message),
        })
    }

    /// 送信者を問わずHTML本文だけを取り出す
    ///
    /// # 戻り値
    /// * `Ok(Some(html))` - HTML本文あり
    /// * `Ok(None)` - text/htmlパートなし
    /// * `Err(MessageParseError::Unparseable)` - パース失敗
    pub fn parse_html_body(raw: &[u8]) -> Result<Option<String>, MessageParseError> {
        let message = MessageParser::default()
            .parse(raw)
            .ok_or(MessageParseError::Unparseable)?;

        Ok(html_body(&message))
    }
}

/// 最初のtext/htmlパートの内容
///
/// HTML本文の一覧にはtext/plainのパートも並ぶ（text/plainのみのメールや、
/// multipart/mixedでインラインのテキストがHTMLより前にある場合）ため、種別を確認する。
fn html_body(message: &Message<'_>) -> Option<String> {
    message.html_bodies().find_map(|part| match &part.body {
        PartType::Html(html) => Some(html.to_string()),
        _ => None,
    })
}

/// 連続する空白とゼロ幅接合子を1つの空白にまとめ、前後をtrimする
pub fn normalize_html(html: &str) -> String {
    HTML_WHITESPACE_RE.replace_all(html, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML_EMAIL: &str = "From: Google Business Profile <businessprofile-noreply@google.com>\r\n\
        To: owner@example.com\r\n\
        Subject: New review\r\n\
        MIME-Version: 1.0\r\n\
        Content-Type: text/html; charset=UTF-8\r\n\
        \r\n\
        <html><body><p>Hello</p></body></html>\r\n";

    const MULTIPART_EMAIL: &str = "From: reviews@example.com\r\n\
        To: owner@example.com\r\n\
        Subject: Multipart\r\n\
        MIME-Version: 1.0\r\n\
        Content-Type: multipart/alternative; boundary=\"b1\"\r\n\
        \r\n\
        --b1\r\n\
        Content-Type: text/plain; charset=UTF-8\r\n\
        \r\n\
        Plain body\r\n\
        --b1\r\n\
        Content-Type: text/html; charset=UTF-8\r\n\
        \r\n\
        <p>Html body</p>\r\n\
        --b1--\r\n";

    const TEXT_ONLY_EMAIL: &str = "From: businessprofile-noreply@google.com\r\n\
        To: owner@example.com\r\n\
        Subject: Plain\r\n\
        Content-Type: text/plain; charset=UTF-8\r\n\
        \r\n\
        Just text.\r\n";

    #[test]
    fn test_parse_html_email() {
        let parsed = EmailParser::parse(HTML_EMAIL.as_bytes()).unwrap();

        assert_eq!(parsed.sender, "businessprofile-noreply@google.com");
        assert!(parsed.html.unwrap().contains("<p>Hello</p>"));
    }

    #[test]
    fn test_parse_multipart_prefers_html_part() {
        let parsed = EmailParser::parse(MULTIPART_EMAIL.as_bytes()).unwrap();

        assert_eq!(parsed.sender, "reviews@example.com");
        let html = parsed.html.unwrap();
        assert!(html.contains("Html body"));
        assert!(!html.contains("Plain body"));
    }

    #[test]
    fn test_parse_mixed_text_before_html() {
        let raw = "From: Ian Duffy <ian@ianduffy.ie>\r\n\
            To: reviews@example.com\r\n\
            Subject: Fwd: New review\r\n\
            MIME-Version: 1.0\r\n\
            Content-Type: multipart/mixed; boundary=\"m1\"\r\n\
            \r\n\
            --m1\r\n\
            Content-Type: text/plain; charset=UTF-8\r\n\
            \r\n\
            See the review below.\r\n\
            --m1\r\n\
            Content-Type: text/html; charset=UTF-8\r\n\
            \r\n\
            <p>Forwarded review</p>\r\n\
            --m1--\r\n";

        let parsed = EmailParser::parse(raw.as_bytes()).unwrap();

        assert_eq!(parsed.sender, "ian@ianduffy.ie");
        let html = parsed.html.unwrap();
        assert!(html.contains("<p>Forwarded review</p>"));
        assert!(!html.contains("See the review below."));
    }

    #[test]
    fn test_parse_mixed_alternative_with_attachment() {
        let raw = "From: ian@ianduffy.ie\r\n\
            Subject: Fwd: New review\r\n\
            MIME-Version: 1.0\r\n\
            Content-Type: multipart/mixed; boundary=\"m1\"\r\n\
            \r\n\
            --m1\r\n\
            Content-Type: multipart/alternative; boundary=\"a1\"\r\n\
            \r\n\
            --a1\r\n\
            Content-Type: text/plain; charset=UTF-8\r\n\
            \r\n\
            Plain body\r\n\
            --a1\r\n\
            Content-Type: text/html; charset=UTF-8\r\n\
            \r\n\
            <p>Html body</p>\r\n\
            --a1--\r\n\
            --m1\r\n\
            Content-Type: application/pdf\r\n\
            Content-Disposition: attachment; filename=\"review.pdf\"\r\n\
            Content-Transfer-Encoding: base64\r\n\
            \r\n\
            JVBERi0xLjQK\r\n\
            --m1--\r\n";

        let html = EmailParser::parse_html_body(raw.as_bytes()).unwrap().unwrap();

        assert!(html.contains("<p>Html body</p>"));
    }

    #[test]
    fn test_parse_text_only_email_has_no_html() {
        let parsed = EmailParser::parse(TEXT_ONLY_EMAIL.as_bytes()).unwrap();

        assert_eq!(parsed.html, None);
        assert_eq!(parsed.normalized_html(), None);
    }

    #[test]
    fn test_parse_html_body_ignores_sender() {
        let raw = "To: owner@example.com\r\nContent-Type: text/html\r\n\r\n<p>No sender</p>\r\n";

        let html = EmailParser::parse_html_body(raw.as_bytes()).unwrap();

        assert!(html.unwrap().contains("<p>No sender</p>"));
    }

    #[test]
    fn test_parse_html_body_text_only() {
        let html = EmailParser::parse_html_body(TEXT_ONLY_EMAIL.as_bytes()).unwrap();

        assert_eq!(html, None);
    }

    #[test]
    fn test_parse_missing_from_header() {
        let raw = "To: owner@example.com\r\nSubject: No sender\r\n\r\nBody\r\n";

        let result = EmailParser::parse(raw.as_bytes());

        assert_eq!(result, Err(MessageParseError::MissingSender));
    }

    #[test]
    fn test_parse_empty_input() {
        let result = EmailParser::parse(b"");

        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_html_collapses_whitespace() {
        let html = "  <p>\n\t Bob   Hope </p>\r\n\r\n<td>x</td>  ";

        assert_eq!(normalize_html(html), "<p> Bob Hope </p> <td>x</td>");
    }

    #[test]
    fn test_normalize_html_removes_zero_width_joiner() {
        let html = "<p>Bob\u{200D}\u{200D}Hope</p>\u{200D}";

        assert_eq!(normalize_html(html), "<p>Bob Hope</p>");
    }

    #[test]
    fn test_normalize_html_collapses_mixed_runs() {
        let html = "a \u{200D} \u{00A0}\u{200D}b";

        assert_eq!(normalize_html(html), "a b");
    }

    #[test]
    fn test_normalized_html_blank_body_is_none() {
        let parsed = ParsedEmail {
            sender: "a@example.com".to_string(),
            html: Some(" \n\u{200D} ".to_string()),
        };

        assert_eq!(parsed.normalized_html(), None);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            MessageParseError::Unparseable.to_string(),
            "failed to parse message"
        );
        assert_eq!(
            MessageParseError::MissingSender.to_string(),
            "sender address not found"
        );
    }
}
