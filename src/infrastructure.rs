// Infrastructure layer modules
pub mod config;
pub mod logging;
pub mod object_fetcher;
pub mod review_sink;

// Re-exports
pub use config::{S3_ENDPOINT_URL_VAR, StorageConfig, StorageConfigError};
pub use logging::{AWS_LAMBDA_LOG_LEVEL_VAR, LogTarget, init_cli_logging, init_logging};
pub use object_fetcher::{FetchError, ObjectFetcher, S3ObjectFetcher};
pub use review_sink::{LoggingReviewSink, ReviewSink, SinkError};
