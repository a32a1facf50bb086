/// S3接続設定
///
/// AWS認証情報とリージョンはaws-configが環境から読み込む。
/// 追加の環境変数:
/// - S3_ENDPOINT_URL: S3互換ストレージのエンドポイント（任意、ローカル検証用）
use aws_sdk_s3::Client as S3Client;
use thiserror::Error;

/// エンドポイント上書き用の環境変数名
pub const S3_ENDPOINT_URL_VAR: &str = "S3_ENDPOINT_URL";

/// S3設定のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageConfigError {
    #[error("Invalid environment variable {name}: {reason}")]
    InvalidEnvVar { name: String, reason: String },
}

/// S3クライアントを持つストレージ設定
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3クライアントインスタンス
    client: S3Client,
    /// 上書きされたエンドポイント
    endpoint_url: Option<String>,
}

impl StorageConfig {
    /// 環境からAWS設定を読み込み、新しいStorageConfigを作成
    ///
    /// S3_ENDPOINT_URLが設定されている場合はそのエンドポイントを使い、
    /// パススタイルのアドレッシングを有効にする。
    pub async fn from_env() -> Result<Self, StorageConfigError> {
        let endpoint_url = parse_endpoint_url(std::env::var(S3_ENDPOINT_URL_VAR).ok())?;

        // 環境からAWS設定を読み込み（認証情報、リージョンなど）
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let mut builder = aws_sdk_s3::config::Builder::from(&aws_config);
        if let Some(url) = &endpoint_url {
            builder = builder.endpoint_url(url).force_path_style(true);
        }
        let client = S3Client::from_conf(builder.build());

        Ok(Self {
            client,
            endpoint_url,
        })
    }

    /// S3クライアントへの参照を取得
    pub fn client(&self) -> &S3Client {
        &self.client
    }

    /// 上書きされたエンドポイントを取得
    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }
}

/// S3_ENDPOINT_URLの値を検証する（未設定・空文字列はNone）
fn parse_endpoint_url(value: Option<String>) -> Result<Option<String>, StorageConfigError> {
    let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(StorageConfigError::InvalidEnvVar {
            name: S3_ENDPOINT_URL_VAR.to_string(),
            reason: "must start with http:// or https://".to_string(),
        });
    }

    Ok(Some(value))
}
