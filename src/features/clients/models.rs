use crate::shared::errors::AppResult;
use crate::shared::validation::{validate_text, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// クライアント名の最大文字数
pub const CLIENT_NAME_MAX_CHARS: usize = 100;

/// クライアント（セッションの依頼元）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// ID（未登録なら0）
    pub id: i64,
    /// クライアント名（一意）
    pub name: String,
}

impl Client {
    /// 未登録のクライアントを作成する
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }
}

impl Validate for Client {
    const LABEL: &'static str = "クライアント";

    fn entity_id(&self) -> i64 {
        self.id
    }

    fn pre_insert_valid(&self) -> AppResult<()> {
        validate_text(Self::LABEL, "名前", &self.name, CLIENT_NAME_MAX_CHARS)
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
