use super::aggregates::{map_expenses_by_currency, sum_by_tax_rates, TaxRateTotal};
use super::amount::{Amount, AmountList};
use crate::features::car_trips;
use crate::features::expenses;
use crate::features::line_items::{self, LineItem};
use crate::features::receipts::ReceiptInspector;
use crate::features::sessions::{self, Session};
use crate::shared::config::MAX_AMOUNT;
use crate::shared::errors::{AppError, AppResult};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// 通貨ごとの内訳
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyBreakdown {
    pub currency: String,
    /// この通貨の経費件数
    pub expense_count: usize,
    /// 税率ごとの合計（税率の昇順）
    pub by_tax_rate: Vec<TaxRateTotal>,
}

/// セッション単位の経費レポート
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session: Session,
    pub expense_count: usize,
    /// 通貨ごとの合計（通貨コード順）
    pub totals: Vec<Amount>,
    /// 通貨・税率ごとの内訳（通貨コード順）
    pub breakdowns: Vec<CurrencyBreakdown>,
    pub car_trip_count: usize,
    pub car_trip_distance_km: f64,
}

/// セッションの経費レポートを作成する
///
/// # 処理内容
/// 1. セッションのレポート前検証（開始・終了日時）
/// 2. 全経費のレポート前検証（領収書の存在と形式）
/// 3. 通貨ごと・税率ごとの集計
/// 4. 走行距離の集計
pub fn build_session_report(
    conn: &Connection,
    session_id: i64,
    inspector: &ReceiptInspector,
) -> AppResult<SessionReport> {
    let session = sessions::repository::find_by_id(conn, session_id)?;
    session.pre_report_valid()?;

    let expenses = expenses::repository::find_by_session(conn, session_id)?;
    for expense in &expenses {
        expense.pre_report_valid(inspector)?;
    }

    let mut amounts = Vec::new();
    let mut breakdowns = Vec::new();
    for (currency, group) in map_expenses_by_currency(&expenses)? {
        let mut items: Vec<LineItem> = Vec::new();
        for expense in &group {
            items.extend(line_items::repository::find_by_expense(conn, expense.id)?);
        }
        amounts.extend(items.iter().map(|item| Amount::new(item.total, currency.clone())));
        breakdowns.push(CurrencyBreakdown {
            currency,
            expense_count: group.len(),
            by_tax_rate: sum_by_tax_rates(&items)?,
        });
    }

    let amounts = AmountList::new(amounts);
    let totals = if amounts.is_empty() {
        Vec::new()
    } else {
        amounts.sum()?
    };

    let car_trips = car_trips::repository::find_by_session(conn, session_id)?;
    let car_trip_distance_km: f64 = car_trips.iter().map(|trip| trip.distance_km).sum();
    if car_trip_distance_km > MAX_AMOUNT {
        log::warn!("セッション(ID: {session_id}) の走行距離の合計が上限値を超えました");
        return Err(AppError::validation(format!(
            "走行距離の合計が上限値{MAX_AMOUNT}を超えています"
        )));
    }

    log::info!(
        "セッションレポートを作成しました (ID: {session_id}, 経費: {}件, 走行記録: {}件)",
        expenses.len(),
        car_trips.len()
    );

    Ok(SessionReport {
        session,
        expense_count: expenses.len(),
        totals,
        breakdowns,
        car_trip_count: car_trips.len(),
        car_trip_distance_km,
    })
}
