use crate::features::expenses::Expense;
use crate::features::line_items::LineItem;
use crate::shared::config::MAX_AMOUNT;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 税率ごとの合計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRateTotal {
    pub tax_rate: f64,
    pub total: f64,
}

/// 経費を通貨ごとに分類する
///
/// すべての経費を先に検証し、1件でも不正なら分類結果を返さない。
pub fn map_expenses_by_currency(expenses: &[Expense]) -> AppResult<BTreeMap<String, Vec<Expense>>> {
    let mut by_currency: BTreeMap<String, Vec<Expense>> = BTreeMap::new();
    for expense in expenses {
        expense.valid()?;
        by_currency
            .entry(expense.currency.clone())
            .or_default()
            .push(expense.clone());
    }
    Ok(by_currency)
}

/// 明細を税率ごとに合計する（税率の昇順）
///
/// 明細はすべて同じ通貨であることを前提とし、ここでは確認しない。
pub fn sum_by_tax_rates(line_items: &[LineItem]) -> AppResult<Vec<TaxRateTotal>> {
    // 税率は0以上なので、ビット表現の順序が数値の順序と一致する
    let mut totals: BTreeMap<u64, f64> = BTreeMap::new();
    for item in line_items {
        item.valid()?;
        let key = (item.tax_rate + 0.0).to_bits();
        let total = totals.entry(key).or_insert(0.0);
        *total += item.total;
        if *total > MAX_AMOUNT {
            log::warn!("税率{}%の合計が上限値を超えました", item.tax_rate);
            return Err(AppError::validation(format!(
                "税率{}%の合計が上限値{MAX_AMOUNT}を超えています",
                item.tax_rate
            )));
        }
    }

    Ok(totals
        .into_iter()
        .map(|(bits, total)| TaxRateTotal {
            tax_rate: f64::from_bits(bits),
            total,
        })
        .collect())
}
