use super::models::Expense;
use crate::shared::database::{
    begin_immediate, delete_row, ensure_affected, fetch_all, fetch_one, store_error, Dependent,
};
use crate::shared::errors::AppResult;
use crate::shared::utils::StoredTimestamp;
use crate::shared::validation::Validate;
use rusqlite::{params, Connection, Row};

const COLUMNS: &str =
    "id, session_id, type_id, currency, receipt_relative_path, notes, date_time";

const INSERT_SQL: &str = "INSERT INTO expenses
    (session_id, type_id, currency, receipt_relative_path, notes, date_time)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const UPDATE_SQL: &str = "UPDATE expenses SET
    session_id = ?1, type_id = ?2, currency = ?3, receipt_relative_path = ?4,
    notes = ?5, date_time = ?6
    WHERE id = ?7";

/// 経費を参照するテーブル
const DEPENDENTS: &[Dependent] = &[Dependent {
    table: "line_items",
    column: "expense_id",
    relation: "明細",
}];

fn map_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        session_id: row.get(1)?,
        type_id: row.get(2)?,
        currency: row.get(3)?,
        receipt_relative_path: row.get(4)?,
        notes: row.get(5)?,
        date_time: row.get::<_, StoredTimestamp>(6)?.into_inner(),
    })
}

/// 経費を作成する
///
/// # 戻り値
/// 採番されたID、または失敗時はエラー
pub fn create(conn: &Connection, expense: &Expense) -> AppResult<i64> {
    expense.pre_insert_valid()?;

    let tx = begin_immediate(conn)?;
    tx.execute(
        INSERT_SQL,
        params![
            expense.session_id,
            expense.type_id,
            expense.currency,
            expense.receipt_relative_path,
            expense.notes,
            StoredTimestamp(expense.date_time),
        ],
    )
    .map_err(|e| store_error(INSERT_SQL, e))?;
    let id = tx.last_insert_rowid();
    tx.commit().map_err(|e| store_error("COMMIT", e))?;

    log::info!("経費を作成しました (ID: {id})");
    Ok(id)
}

/// IDで経費を取得する
pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Expense> {
    let sql = format!("SELECT {COLUMNS} FROM expenses WHERE id = ?1");
    fetch_one(conn, &sql, id, map_row)
}

/// すべての経費をID順に取得する
pub fn find_all(conn: &Connection) -> AppResult<Vec<Expense>> {
    let sql = format!("SELECT {COLUMNS} FROM expenses ORDER BY id");
    fetch_all(conn, &sql, [], map_row)
}

/// セッションに紐づく経費をID順に取得する
pub fn find_by_session(conn: &Connection, session_id: i64) -> AppResult<Vec<Expense>> {
    let sql = format!("SELECT {COLUMNS} FROM expenses WHERE session_id = ?1 ORDER BY id");
    fetch_all(conn, &sql, [session_id], map_row)
}

/// 経費を更新する
pub fn update(conn: &Connection, expense: &Expense) -> AppResult<()> {
    expense.valid()?;

    let tx = begin_immediate(conn)?;
    let affected = tx
        .execute(
            UPDATE_SQL,
            params![
                expense.session_id,
                expense.type_id,
                expense.currency,
                expense.receipt_relative_path,
                expense.notes,
                StoredTimestamp(expense.date_time),
                expense.id,
            ],
        )
        .map_err(|e| store_error(UPDATE_SQL, e))?;
    ensure_affected(affected, Expense::LABEL, expense.id)?;
    tx.commit().map_err(|e| store_error("COMMIT", e))?;

    log::info!("経費を更新しました (ID: {})", expense.id);
    Ok(())
}

/// 経費を削除する（明細から参照されている場合は拒否）
pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    delete_row(conn, "expenses", Expense::LABEL, id, DEPENDENTS)
}
