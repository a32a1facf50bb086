//! EMLファイルのHTML本文プレビュー
//!
//! 保存されたメールのHTML本文をDOMとして読み直し、1ノード1行・
//! ネストごとに2スペースのインデントで整形する。テンプレート調査用のツール向け。

use scraper::{ElementRef, Html, Node};
use thiserror::Error;

use super::message_parser::{EmailParser, MessageParseError};

/// 終了タグを持たない要素
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// 中身をエスケープせずに出力する要素
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

const INDENT: &str = "  ";

/// プレビュー生成のエラー型
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HtmlPreviewError {
    /// メールとして解釈できない
    #[error("error parsing email: {0}")]
    Parse(#[from] MessageParseError),
}

/// EMLのHTML本文を整形して返す（HTML本文がなければNone）
pub fn preview_eml_html(raw: &[u8]) -> Result<Option<String>, HtmlPreviewError> {
    Ok(EmailParser::parse_html_body(raw)?.map(|html| format_html(&html)))
}

/// HTMLをパースし直して整形する
pub fn format_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();

    for child in document.tree.root().children() {
        match child.value() {
            Node::Doctype(doctype) => push_line(&mut out, 0, &format!("<!DOCTYPE {}>", doctype.name())),
            Node::Comment(comment) => push_line(&mut out, 0, &format!("<!--{}-->", &**comment)),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    write_element(element, 0, &mut out);
                }
            }
            _ => {}
        }
    }

    out
}

fn write_element(element: ElementRef<'_>, depth: usize, out: &mut String) {
    let name = element.value().name();
    let open_tag = open_tag(element);

    if VOID_ELEMENTS.contains(&name) {
        push_line(out, depth, &open_tag);
        return;
    }

    let raw_text = RAW_TEXT_ELEMENTS.contains(&name);

    // 子がテキスト1つだけなら1行にまとめる
    let mut children = element.children().filter(|child| match child.value() {
        Node::Text(text) => !text.trim().is_empty(),
        Node::Element(_) | Node::Comment(_) => true,
        _ => false,
    });
    let first = children.next();
    let has_more = children.next().is_some();

    match first {
        None => {
            push_line(out, depth, &format!("{}</{}>", open_tag, name));
            return;
        }
        Some(only) if !has_more => {
            if let Node::Text(text) = only.value() {
                let text = render_text(text.trim(), raw_text);
                push_line(out, depth, &format!("{}{}</{}>", open_tag, text, name));
                return;
            }
        }
        Some(_) => {}
    }

    push_line(out, depth, &open_tag);
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    push_line(out, depth + 1, &render_text(text, raw_text));
                }
            }
            Node::Comment(comment) => {
                push_line(out, depth + 1, &format!("<!--{}-->", &**comment));
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(child, depth + 1, out);
                }
            }
            _ => {}
        }
    }
    push_line(out, depth, &format!("</{}>", name));
}

fn open_tag(element: ElementRef<'_>) -> String {
    let mut tag = format!("<{}", element.value().name());

    // 属性は名前順
    let mut attrs: Vec<(&str, &str)> = element.value().attrs().collect();
    attrs.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in attrs {
        tag.push_str(&format!(r#" {}="{}""#, name, escape_attribute(value)));
    }
    tag.push('>');
    tag
}

fn render_text(text: &str, raw: bool) -> String {
    if raw { text.to_string() } else { escape_text(text) }
}

fn push_line(out: &mut String, depth: usize, line: &str) {
    out.push_str(&INDENT.repeat(depth));
    out.push_str(line);
    out.push('\n');
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
