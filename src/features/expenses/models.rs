use crate::features::receipts::ReceiptInspector;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::validation::{
    ensure_positive_id, validate_datetime_set, validate_optional_fk, validate_optional_text,
    validate_text, Validate,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 通貨コードの最大文字数
pub const CURRENCY_MAX_CHARS: usize = 10;
/// 領収書パスの最大文字数
pub const RECEIPT_PATH_MAX_CHARS: usize = 50;
/// メモの最大文字数
pub const NOTES_MAX_CHARS: usize = 150;

/// 経費
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    /// 紐づくセッションID（任意）
    pub session_id: Option<i64>,
    /// 経費種別ID
    pub type_id: i64,
    /// 通貨コード（例: JPY）
    pub currency: String,
    /// 領収書ディレクトリからの相対パス
    pub receipt_relative_path: Option<String>,
    pub notes: Option<String>,
    /// 支払日時
    pub date_time: DateTime<FixedOffset>,
}

impl Expense {
    pub fn new(
        type_id: i64,
        currency: impl Into<String>,
        date_time: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: 0,
            session_id: None,
            type_id,
            currency: currency.into(),
            receipt_relative_path: None,
            notes: None,
            date_time,
        }
    }

    /// レポート作成前の検証
    ///
    /// 完全な検証に加えて、領収書が存在し画像として読み込めることを要求する。
    pub fn pre_report_valid(&self, inspector: &ReceiptInspector) -> AppResult<()> {
        self.valid()?;
        let Some(receipt) = self.receipt_relative_path.as_deref() else {
            log::warn!("経費(ID: {}) の領収書が未設定です", self.id);
            return Err(AppError::validation(
                "経費: レポートには領収書が必要です",
            ));
        };
        inspector.check_receipt(receipt)?;
        Ok(())
    }
}

impl Validate for Expense {
    const LABEL: &'static str = "経費";

    fn entity_id(&self) -> i64 {
        self.id
    }

    fn pre_insert_valid(&self) -> AppResult<()> {
        ensure_positive_id(Self::LABEL, "経費種別ID", self.type_id)?;
        validate_text(Self::LABEL, "通貨", &self.currency, CURRENCY_MAX_CHARS)?;
        validate_datetime_set(Self::LABEL, "日時", &self.date_time)?;
        validate_optional_text(
            Self::LABEL,
            "領収書パス",
            self.receipt_relative_path.as_deref(),
            RECEIPT_PATH_MAX_CHARS,
        )?;
        validate_optional_text(Self::LABEL, "メモ", self.notes.as_deref(), NOTES_MAX_CHARS)?;
        validate_optional_fk(Self::LABEL, "セッションID", self.session_id)
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type: {} ({}) @ {}",
            self.type_id,
            self.currency,
            self.date_time.date_naive()
        )?;
        if let Some(receipt) = &self.receipt_relative_path {
            write!(f, "\n{receipt}")?;
        }
        if let Some(notes) = &self.notes {
            write!(f, "\nNotes: {notes}")?;
        }
        Ok(())
    }
}
