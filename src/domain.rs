// Domain layer modules
pub mod extraction_rules;
pub mod processing_result;
pub mod review_extractor;
pub mod review_record;
pub mod sender_filter;

// Re-exports
pub use extraction_rules::{ExtractionRules, ExtractionRulesError};
pub use processing_result::{
    ProcessingResult, STATUS_BAD_REQUEST, STATUS_INTERNAL_ERROR, STATUS_OK,
};
pub use review_extractor::ReviewExtractor;
pub use review_record::ReviewRecord;
pub use sender_filter::{DEFAULT_ALLOWED_SENDERS, SenderAllowList};
