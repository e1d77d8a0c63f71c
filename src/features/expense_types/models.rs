use crate::shared::errors::AppResult;
use crate::shared::validation::{validate_text, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 経費種別名の最大文字数
pub const EXPENSE_TYPE_NAME_MAX_CHARS: usize = 50;

/// 経費種別（交通費、宿泊費など）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseType {
    pub id: i64,
    /// 種別名（一意）
    pub name: String,
}

impl ExpenseType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }
}

impl Validate for ExpenseType {
    const LABEL: &'static str = "経費種別";

    fn entity_id(&self) -> i64 {
        self.id
    }

    fn pre_insert_valid(&self) -> AppResult<()> {
        validate_text(Self::LABEL, "名前", &self.name, EXPENSE_TYPE_NAME_MAX_CHARS)
    }
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
