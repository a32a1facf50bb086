//! レビュー抽出ルール
//!
//! ベンダーのメールテンプレートに依存する部分文字列をまとめた設定値。
//! テンプレートが変わった場合はここを差し替えるだけで追従できる。

use thiserror::Error;

/// レビューカード判定に使うstyle属性の部分文字列
pub const DEFAULT_CARD_STYLE_MARKER: &str = "border";

/// テキスト要素判定に使うstyle属性の部分文字列
pub const DEFAULT_TEXT_STYLE_MARKER: &str = "font-size";

/// テキスト要素として扱うタグ
pub const DEFAULT_TEXT_TAGS: &[&str] = &["p", "td"];

/// 全メールに含まれる返信ボタンの文言
pub const REPLY_BUTTON_LABEL: &str = "Reply to review";

/// 星評価画像のsrc属性に含まれる部分文字列
pub const DEFAULT_STAR_IMAGE_MARKER: &str = "-star-filled";

/// 星評価画像のsrcから評価値を取り出すパターン（1番目のキャプチャが評価値）
pub const DEFAULT_RATING_PATTERN: &str = r"gmb-([0-9])-star-filled";

/// 抽出ルールのエラー型
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionRulesError {
    /// CSSセレクターを構築できない
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
    /// 評価値パターンが正規表現として不正
    #[error("invalid rating pattern: {0}")]
    InvalidRatingPattern(String),
    /// テキスト要素のタグが指定されていない
    #[error("at least one text tag is required")]
    NoTextTags,
}

/// レビュー抽出に使う部分文字列の組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRules {
    /// レビューカードのstyle属性に含まれる文字列
    pub card_style_marker: String,
    /// テキスト要素のstyle属性に含まれる文字列
    pub text_style_marker: String,
    /// テキスト要素のタグ名
    pub text_tags: Vec<String>,
    /// 候補から除外するテキスト（trim後の完全一致）
    pub ignored_texts: Vec<String>,
    /// 星評価画像のsrc属性に含まれる文字列
    pub star_image_marker: String,
    /// 評価値を取り出す正規表現
    pub rating_pattern: String,
}

impl ExtractionRules {
    /// レビューカードのセレクター文字列
    pub fn card_selector(&self) -> String {
        attribute_contains("", "style", &self.card_style_marker)
    }

    /// テキスト要素のセレクター文字列
    pub fn text_selector(&self) -> Result<String, ExtractionRulesError> {
        if self.text_tags.is_empty() {
            return Err(ExtractionRulesError::NoTextTags);
        }

        Ok(self
            .text_tags
            .iter()
            .map(|tag| attribute_contains(tag, "style", &self.text_style_marker))
            .collect::<Vec<_>>()
            .join(", "))
    }

    /// 星評価画像のセレクター文字列
    pub fn star_image_selector(&self) -> String {
        attribute_contains("", "src", &self.star_image_marker)
    }

    /// 候補から除外するテキストか
    pub fn is_ignored_text(&self, text: &str) -> bool {
        self.ignored_texts.iter().any(|ignored| ignored == text)
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            card_style_marker: DEFAULT_CARD_STYLE_MARKER.to_string(),
            text_style_marker: DEFAULT_TEXT_STYLE_MARKER.to_string(),
            text_tags: DEFAULT_TEXT_TAGS.iter().map(|tag| tag.to_string()).collect(),
            ignored_texts: vec![REPLY_BUTTON_LABEL.to_string()],
            star_image_marker: DEFAULT_STAR_IMAGE_MARKER.to_string(),
            rating_pattern: DEFAULT_RATING_PATTERN.to_string(),
        }
    }
}

/// `tag[attr*="value"]` 形式の部分一致セレクター
fn attribute_contains(tag: &str, attribute: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!(r#"{}[{}*="{}"]"#, tag, attribute, escaped)
}
