// アプリケーション層モジュール
pub mod email_handler;
pub mod eml_builder;
pub mod html_preview;
pub mod inbound_event;
pub mod message_parser;

// 再エクスポート
pub use email_handler::{
    BODY_UNDEFINED_MESSAGE, EmailHandler, EmailHandlerError, INCOMPLETE_EXTRACTION_MESSAGE,
    NO_HTML_MESSAGE, PROCESSING_ERROR_MESSAGE, SENDER_NOT_ALLOWED_MESSAGE,
};
pub use eml_builder::{EmlBuildError, EmlRequest, compress_html, is_valid_email};
pub use html_preview::{HtmlPreviewError, format_html, preview_eml_html};
pub use inbound_event::{InboundEventError, ObjectLocation, decode_s3_event};
pub use message_parser::{EmailParser, MessageParseError, ParsedEmail, normalize_html};
