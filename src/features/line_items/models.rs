use crate::shared::errors::AppResult;
use crate::shared::validation::{
    ensure_positive_id, validate_bounded_amount, validate_tax_rate, Validate,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 経費の明細（税率ごとの金額）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    pub expense_id: i64,
    /// 税率（パーセント、0〜60）
    pub tax_rate: f64,
    /// 税込金額
    pub total: f64,
}

impl LineItem {
    pub fn new(expense_id: i64, tax_rate: f64, total: f64) -> Self {
        Self {
            id: 0,
            expense_id,
            tax_rate,
            total,
        }
    }
}

impl Validate for LineItem {
    const LABEL: &'static str = "明細";

    fn entity_id(&self) -> i64 {
        self.id
    }

    fn pre_insert_valid(&self) -> AppResult<()> {
        ensure_positive_id(Self::LABEL, "経費ID", self.expense_id)?;
        validate_bounded_amount(Self::LABEL, "合計", self.total)?;
        validate_tax_rate(Self::LABEL, "税率", self.tax_rate)
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expense ID: {} - {:.2} (tax rate: {:.2}%)",
            self.expense_id, self.total, self.tax_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::MAX_AMOUNT;

    #[test]
    fn test_boundaries() {
        assert!(LineItem::new(1, 60.0, 100.0).pre_insert_valid().is_ok());
        assert!(LineItem::new(1, 60.000001, 100.0).pre_insert_valid().is_err());
        assert!(LineItem::new(1, 0.0, MAX_AMOUNT).pre_insert_valid().is_ok());
        assert!(LineItem::new(1, 0.0, MAX_AMOUNT + 0.5).pre_insert_valid().is_err());
    }

    #[test]
    fn test_single_faults() {
        assert!(LineItem::new(0, 10.0, 100.0).pre_insert_valid().is_err());
        assert!(LineItem::new(-1, 10.0, 100.0).pre_insert_valid().is_err());
        assert!(LineItem::new(1, -1.0, 100.0).pre_insert_valid().is_err());
        assert!(LineItem::new(1, 10.0, 0.0).pre_insert_valid().is_err());
        assert!(LineItem::new(1, 10.0, -9.0).pre_insert_valid().is_err());
        assert!(LineItem::new(1, f64::NAN, 9.0).pre_insert_valid().is_err());
    }

    #[test]
    fn test_valid_requires_id() {
        let mut item = LineItem::new(1, 10.0, 1100.0);
        assert!(item.valid().is_err());
        item.id = 3;
        assert!(item.valid().is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            LineItem::new(4, 10.0, 1100.0).to_string(),
            "Expense ID: 4 - 1100.00 (tax rate: 10.00%)"
        );
    }
}
