//! 送信者許可リスト
//!
//! 送信元アドレスが許可リストに含まれるかを大文字小文字を区別せずに判定する。
//! リストはビルド時に固定され、変更には再デプロイが必要。

/// デフォルトで処理を許可する送信者アドレス
pub const DEFAULT_ALLOWED_SENDERS: &[&str] = &["businessprofile-noreply@google.com", "ian@ianduffy.ie"];

/// 処理を許可する送信者アドレスの不変リスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderAllowList {
    /// 小文字化済みのアドレス
    addresses: Vec<String>,
}

impl SenderAllowList {
    /// アドレスの一覧から許可リストを作成
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            addresses: addresses
                .into_iter()
                .map(|address| address.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// 送信者が許可されているか
    ///
    /// 一致しないことはエラーではなく通常の`false`として返す。
    pub fn is_allowed(&self, sender: &str) -> bool {
        let sender = sender.to_lowercase();
        self.addresses.iter().any(|address| *address == sender)
    }
}

impl Default for SenderAllowList {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_SENDERS)
    }
}
