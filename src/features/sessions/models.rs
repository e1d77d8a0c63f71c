use crate::shared::errors::{AppError, AppResult};
use crate::shared::validation::{
    ensure_positive_id, validate_datetime_set, validate_optional_text, validate_text, Validate,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 場所フィールドの最大文字数
pub const LOCATION_MAX_CHARS: usize = 100;

/// 作業セッション（クライアント先での出張・作業の単位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// ID（未登録なら0）
    pub id: i64,
    /// クライアントID
    pub client_id: i64,
    /// 作業場所
    pub location: String,
    /// 移動の出発地
    pub trip_start_location: Option<String>,
    /// 移動の到着地
    pub trip_end_location: Option<String>,
    /// 開始日時
    pub start_at: Option<DateTime<FixedOffset>>,
    /// 終了日時
    pub end_at: Option<DateTime<FixedOffset>>,
}

impl Session {
    /// 必須フィールドだけを指定して未登録のセッションを作成する
    pub fn new(client_id: i64, location: impl Into<String>) -> Self {
        Self {
            id: 0,
            client_id,
            location: location.into(),
            trip_start_location: None,
            trip_end_location: None,
            start_at: None,
            end_at: None,
        }
    }

    /// レポート作成前の検証（開始・終了日時の両方が必要）
    pub fn pre_report_valid(&self) -> AppResult<()> {
        self.valid()?;
        if self.start_at.is_none() || self.end_at.is_none() {
            log::warn!("セッション(ID: {}) の開始・終了日時が未設定です", self.id);
            return Err(AppError::validation(
                "セッション: レポートには開始日時と終了日時の両方が必要です",
            ));
        }
        Ok(())
    }
}

impl Validate for Session {
    const LABEL: &'static str = "セッション";

    fn entity_id(&self) -> i64 {
        self.id
    }

    fn pre_insert_valid(&self) -> AppResult<()> {
        ensure_positive_id(Self::LABEL, "クライアントID", self.client_id)?;
        validate_text(Self::LABEL, "場所", &self.location, LOCATION_MAX_CHARS)?;
        validate_optional_text(
            Self::LABEL,
            "出発地",
            self.trip_start_location.as_deref(),
            LOCATION_MAX_CHARS,
        )?;
        validate_optional_text(
            Self::LABEL,
            "到着地",
            self.trip_end_location.as_deref(),
            LOCATION_MAX_CHARS,
        )?;
        if let Some(start) = &self.start_at {
            validate_datetime_set(Self::LABEL, "開始日時", start)?;
        }
        if let Some(end) = &self.end_at {
            validate_datetime_set(Self::LABEL, "終了日時", end)?;
        }
        if let (Some(start), Some(end)) = (&self.start_at, &self.end_at) {
            if start > end {
                log::warn!("セッションの開始日時が終了日時より後です: {start} > {end}");
                return Err(AppError::validation(
                    "セッション: 開始日時は終了日時以前である必要があります",
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = &self.trip_start_location {
            write!(f, "{start} > ")?;
        }
        write!(f, "[{}]", self.location)?;
        if let Some(end) = &self.trip_end_location {
            write!(f, " > {end}")?;
        }
        write!(f, "\n[ ")?;
        if let Some(start_at) = &self.start_at {
            write!(f, "{}", start_at.date_naive())?;
        }
        write!(f, " - ")?;
        if let Some(end_at) = &self.end_at {
            write!(f, "{}", end_at.date_naive())?;
        }
        write!(f, " ]")
    }
}
