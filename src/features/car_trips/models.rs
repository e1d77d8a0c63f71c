use crate::shared::errors::AppResult;
use crate::shared::validation::{
    validate_bounded_amount, validate_date_only, validate_optional_fk, Validate,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 車での移動記録（1日1件）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarTrip {
    pub id: i64,
    /// 紐づくセッションID（任意）
    pub session_id: Option<i64>,
    /// 走行距離（km）
    pub distance_km: f64,
    /// 走行日（YYYY-MM-DD、一意）
    pub date_only: String,
}

impl CarTrip {
    pub fn new(distance_km: f64, date_only: impl Into<String>) -> Self {
        Self {
            id: 0,
            session_id: None,
            distance_km,
            date_only: date_only.into(),
        }
    }
}

impl Validate for CarTrip {
    const LABEL: &'static str = "走行記録";

    fn entity_id(&self) -> i64 {
        self.id
    }

    fn pre_insert_valid(&self) -> AppResult<()> {
        validate_date_only(Self::LABEL, "走行日", &self.date_only)?;
        validate_optional_fk(Self::LABEL, "セッションID", self.session_id)?;
        validate_bounded_amount(Self::LABEL, "走行距離", self.distance_km)
    }
}

impl fmt::Display for CarTrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(session_id) = self.session_id {
            write!(f, "Session ID: {session_id} - ")?;
        }
        write!(f, "{} km @ {}", self.distance_km, self.date_only)
    }
}
