//! レビュー抽出器
//!
//! レビュー通知メールのHTMLをDOMとしてパースし、インラインstyleの部分一致による
//! 構造的なヒューリスティックでレビュアー名・本文・星評価を取り出す。
//! 抽出は失敗しない。見つからないフィールドは空文字列または0になり、
//! 不完全なレコードをどう扱うかは呼び出し側が決める。

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::extraction_rules::{ExtractionRules, ExtractionRulesError};
use super::review_record::ReviewRecord;

/// レビュー抽出器
///
/// セレクターと正規表現は構築時にコンパイルし、抽出ごとには再構築しない。
#[derive(Debug, Clone)]
pub struct ReviewExtractor {
    rules: ExtractionRules,
    template_selector: Selector,
    card_selector: Selector,
    text_selector: Selector,
    star_image_selector: Selector,
    rating_pattern: Regex,
}

impl ReviewExtractor {
    /// 抽出ルールからReviewExtractorを作成
    ///
    /// # 戻り値
    /// * `Ok(ReviewExtractor)` - 作成成功
    /// * `Err(ExtractionRulesError)` - セレクターまたはパターンが不正
    pub fn new(rules: ExtractionRules) -> Result<Self, ExtractionRulesError> {
        let template_selector = parse_selector("template")?;
        let card_selector = parse_selector(&rules.card_selector())?;
        let text_selector = parse_selector(&rules.text_selector()?)?;
        let star_image_selector = parse_selector(&rules.star_image_selector())?;
        let rating_pattern = Regex::new(&rules.rating_pattern)
            .map_err(|e| ExtractionRulesError::InvalidRatingPattern(e.to_string()))?;

        Ok(Self {
            rules,
            template_selector,
            card_selector,
            text_selector,
            star_image_selector,
            rating_pattern,
        })
    }

    /// HTMLからレビュー情報を抽出する
    ///
    /// # 処理フロー
    /// 1. HTMLをDOMツリーにパース
    /// 2. `<template>`要素を取り除く（不活性な重複マークアップを含むため）
    /// 3. レビューカード内のテキスト要素を文書順に集める
    /// 4. 空文字列と除外テキストを取り除く
    /// 5. 最初の要素をレビュアー名、最後の要素を本文とする
    /// 6. 星評価画像のsrcから評価値を取り出す
    pub fn extract(&self, html: &str) -> ReviewRecord {
        let mut document = Html::parse_document(html);
        self.remove_templates(&mut document);

        let texts = self.candidate_texts(&document);
        let rating = self.extract_rating(&document);

        debug!(
            candidate_count = texts.len(),
            rating = rating,
            "レビュー候補要素を抽出"
        );

        // 候補が1つだけの場合は名前と本文が同じになるが、そのまま受け入れる
        ReviewRecord {
            reviewer_name: texts.first().cloned().unwrap_or_default(),
            review_snippet: texts.last().cloned().unwrap_or_default(),
            rating,
        }
    }

    fn remove_templates(&self, document: &mut Html) {
        let template_ids: Vec<_> = document
            .select(&self.template_selector)
            .map(|template| template.id())
            .collect();

        for id in template_ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    /// レビューカード配下のテキスト要素のtrim済みテキスト（文書順・重複なし）
    fn candidate_texts(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.text_selector)
            .filter(|element| self.is_inside_card(element))
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty() && !self.rules.is_ignored_text(text))
            .collect()
    }

    fn is_inside_card(&self, element: &ElementRef<'_>) -> bool {
        element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| self.card_selector.matches(&ancestor))
    }

    /// 文書中で最初の星評価画像から評価値を取り出す（見つからなければ0）
    fn extract_rating(&self, document: &Html) -> u8 {
        document
            .select(&self.star_image_selector)
            .next()
            .and_then(|image| image.value().attr("src"))
            .and_then(|src| self.rating_pattern.captures(src))
            .and_then(|captures| captures.get(1))
            .and_then(|digit| digit.as_str().parse::<u8>().ok())
            .unwrap_or(0)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractionRulesError> {
    Selector::parse(selector)
        .map_err(|e| ExtractionRulesError::InvalidSelector(format!("{}: {:?}", selector, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ReviewExtractor {
        ReviewExtractor::new(ExtractionRules::default()).unwrap()
    }

    /// ベンダーテンプレートのレビューカード部分を模したHTML
    fn review_card(name: &str, snippet: &str, stars: u8) -> String {
        format!(
            r#"<html><body>
            <table style="border: 1px solid #dadce0; border-radius: 8px;">
              <tr><td style="font-size: 16px; font-weight: 500;">{name}</td></tr>
              <tr><td><img src="https://www.gstatic.com/gmb/email/gmb-{stars}-star-filled.png" alt="stars"></td></tr>
              <tr><td><p style="font-size: 14px; color: #3c4043;">{snippet}</p></td></tr>
              <tr><td style="font-size: 14px;"><a href="https://business.google.com/reviews">Reply to review</a></td></tr>
            </table>
            </body></html>"#
        )
    }

    #[test]
    fn test_extract_complete_review() {
        let html = review_card("Bob Hope", "Really good place, would recommend.", 5);

        let record = extractor().extract(&html);

        assert_eq!(
            record,
            ReviewRecord::new("Bob Hope", "Really good place, would recommend.", 5)
        );
    }

    #[test]
    fn test_extract_is_idempotent() {
        let html = review_card("Alice", "Lovely staff.", 4);
        let extractor = extractor();

        assert_eq!(extractor.extract(&html), extractor.extract(&html));
    }

    #[test]
    fn test_extract_empty_input() {
        let record = extractor().extract("");

        assert_eq!(record, ReviewRecord::default());
    }

    #[test]
    fn test_extract_without_matching_elements() {
        let html = "<html><body><p>Hello</p><div>World</div></body></html>";

        let record = extractor().extract(html);

        assert_eq!(record, ReviewRecord::default());
    }

    #[test]
    fn test_extract_garbage_input_does_not_fail() {
        let record = extractor().extract("<<<>>> </td></p> <img src=\"gmb-\" <table style=");

        assert_eq!(record.rating, 0);
    }

    /// テキスト要素がカード外にある場合は候補にならない
    #[test]
    fn test_text_outside_card_ignored() {
        let html = r#"
            <p style="font-size: 12px;">Outside</p>
            <div style="border: 1px solid;"><p style="font-size: 12px;">Inside</p></div>
        "#;

        let record = extractor().extract(html);

        assert_eq!(record.reviewer_name, "Inside");
        assert_eq!(record.review_snippet, "Inside");
    }

    /// style属性にfont-sizeがない要素は候補にならない
    #[test]
    fn test_text_without_font_size_ignored() {
        let html = r#"
            <table style="border: 1px solid;">
              <tr><td style="color: red;">Plain</td></tr>
              <tr><td style="font-size: 12px;">Sized</td></tr>
              <tr><td><span style="font-size: 12px;">Span</span></td></tr>
            </table>
        "#;

        let record = extractor().extract(html);

        assert_eq!(record.reviewer_name, "Sized");
        assert_eq!(record.review_snippet, "Sized");
    }

    #[test]
    fn test_template_contents_never_chosen() {
        let html = r#"
            <template>
              <div style="border: 1px solid;">
                <p style="font-size: 12px;">Template Name</p>
                <img src="https://example.com/gmb-1-star-filled.png">
              </div>
            </template>
            <div style="border: 1px solid;">
              <p style="font-size: 12px;">Real Name</p>
              <img src="https://example.com/gmb-4-star-filled.png">
              <p style="font-size: 12px;">Real snippet</p>
            </div>
        "#;

        let record = extractor().extract(html);

        assert_eq!(record, ReviewRecord::new("Real Name", "Real snippet", 4));
    }

    #[test]
    fn test_template_only_document_yields_nothing() {
        let html = r#"
            <template>
              <div style="border: 1px solid;"><p style="font-size: 12px;">Hidden</p></div>
            </template>
        "#;

        let record = extractor().extract(html);

        assert_eq!(record, ReviewRecord::default());
    }

    #[test]
    fn test_reply_button_never_chosen() {
        let html = r#"
            <table style="border: 1px solid;">
              <tr><td style="font-size: 14px;">Reply to review</td></tr>
            </table>
        "#;

        let record = extractor().extract(html);

        assert_eq!(record.reviewer_name, "");
        assert_eq!(record.review_snippet, "");
    }

    #[test]
    fn test_whitespace_only_text_skipped() {
        let html = r#"
            <div style="border: 1px solid;">
              <p style="font-size: 12px;">   </p>
              <p style="font-size: 12px;">  Carol  </p>
              <p style="font-size: 12px;"></p>
            </div>
        "#;

        let record = extractor().extract(html);

        assert_eq!(record.reviewer_name, "Carol");
        assert_eq!(record.review_snippet, "Carol");
    }

    /// 入れ子のカード内の要素も1回だけ数える
    #[test]
    fn test_nested_cards_do_not_duplicate_elements() {
        let html = r#"
            <div style="border: 1px solid;">
              <div style="border-top: 1px solid;">
                <p style="font-size: 12px;">First</p>
              </div>
              <p style="font-size: 12px;">Last</p>
            </div>
        "#;

        let record = extractor().extract(html);

        assert_eq!(record.reviewer_name, "First");
        assert_eq!(record.review_snippet, "Last");
    }

    #[test]
    fn test_rating_values() {
        let extractor = extractor();

        for (src, expected) in [
            ("https://example.com/gmb-5-star-filled.png", 5),
            ("https://example.com/gmb-3-star-filled.png", 3),
            ("https://example.com/gmb-x-star-filled.png", 0),
            ("https://example.com/other-star-filled.png", 0),
        ] {
            let html = format!(r#"<img src="{}">"#, src);
            assert_eq!(extractor.extract(&html).rating, expected, "src: {}", src);
        }
    }

    #[test]
    fn test_rating_missing_image() {
        let html = r#"<img src="https://example.com/logo.png">"#;

        assert_eq!(extractor().extract(html).rating, 0);
    }

    /// 最初の星評価画像だけを見る
    #[test]
    fn test_rating_uses_first_star_image() {
        let html = r#"
            <img src="https://example.com/half-star-filled.png">
            <img src="https://example.com/gmb-5-star-filled.png">
        "#;

        assert_eq!(extractor().extract(html).rating, 0);
    }

    /// 星評価画像はカード外でも対象
    #[test]
    fn test_rating_found_anywhere_in_document() {
        let html = r#"
            <div style="border: 1px solid;"><p style="font-size: 12px;">Dave</p></div>
            <footer><img src="https://example.com/gmb-2-star-filled.png"></footer>
        "#;

        assert_eq!(extractor().extract(html).rating, 2);
    }

    #[test]
    fn test_custom_rules() {
        let rules = ExtractionRules {
            card_style_marker: "outline".to_string(),
            text_tags: vec!["span".to_string()],
            ..ExtractionRules::default()
        };
        let html = r#"
            <div style="outline: 1px;"><span style="font-size: 10px;">Eve</span></div>
            <div style="border: 1px;"><p style="font-size: 10px;">Ignored</p></div>
        "#;

        let record = ReviewExtractor::new(rules).unwrap().extract(html);

        assert_eq!(record.reviewer_name, "Eve");
    }

    #[test]
    fn test_invalid_rating_pattern_rejected() {
        let rules = ExtractionRules {
            rating_pattern: "gmb-(".to_string(),
            ..ExtractionRules::default()
        };

        let result = ReviewExtractor::new(rules);

        assert!(matches!(
            result,
            Err(ExtractionRulesError::InvalidRatingPattern(_))
        ));
    }
}
