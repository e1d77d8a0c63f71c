use crate::features::expenses::CURRENCY_MAX_CHARS;
use crate::shared::config::MAX_AMOUNT;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::validation::{validate_bounded_amount, validate_text};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 通貨付きの金額
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub value: f64,
    pub currency: String,
}

impl Amount {
    pub fn new(value: f64, currency: impl Into<String>) -> Self {
        Self {
            value,
            currency: currency.into(),
        }
    }

    /// 通貨コードと金額の範囲を検証する
    pub fn validate(&self) -> AppResult<()> {
        validate_text("金額", "通貨", &self.currency, CURRENCY_MAX_CHARS)?;
        validate_bounded_amount("金額", "値", self.value)
    }

    /// 同じ通貨の金額を加算した新しい金額を返す
    ///
    /// 通貨が異なる場合や、合計が上限値を超える場合はエラー。
    pub fn add(&self, other: &Amount) -> AppResult<Amount> {
        self.validate()?;
        other.validate()?;

        if self.currency != other.currency {
            log::warn!(
                "異なる通貨の金額は加算できません: {} + {}",
                self.currency,
                other.currency
            );
            return Err(AppError::validation(format!(
                "異なる通貨の金額は加算できません（{} と {}）",
                self.currency, other.currency
            )));
        }

        let value = self.value + other.value;
        if value > MAX_AMOUNT {
            log::warn!("金額の合計が上限値を超えました: {self} + {other}");
            return Err(AppError::validation(format!(
                "金額の合計が上限値{MAX_AMOUNT}を超えています（{}）",
                self.currency
            )));
        }

        Ok(Amount {
            value,
            currency: self.currency.clone(),
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.currency)
    }
}

/// 複数通貨が混在しうる金額の一覧
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmountList(pub Vec<Amount>);

impl AmountList {
    pub fn new(amounts: Vec<Amount>) -> Self {
        Self(amounts)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 通貨ごとに合計する
    ///
    /// # 戻り値
    /// 通貨コード順に並んだ通貨ごとの合計。空の一覧、不正な金額、
    /// 上限値を超える合計はエラー。
    pub fn sum(&self) -> AppResult<Vec<Amount>> {
        if self.0.is_empty() {
            log::warn!("空の金額一覧は合計できません");
            return Err(AppError::validation("合計する金額がありません"));
        }

        let mut totals: BTreeMap<&str, Amount> = BTreeMap::new();
        for amount in &self.0 {
            amount.validate()?;
            let next = match totals.get(amount.currency.as_str()) {
                Some(current) => current.add(amount)?,
                None => amount.clone(),
            };
            totals.insert(amount.currency.as_str(), next);
        }

        Ok(totals.into_values().collect())
    }
}

impl FromIterator<Amount> for AmountList {
    fn from_iter<I: IntoIterator<Item = Amount>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
