use super::models::LineItem;
use crate::shared::database::{
    begin_immediate, delete_row, ensure_affected, fetch_all, fetch_one, store_error,
};
use crate::shared::errors::AppResult;
use crate::shared::validation::Validate;
use rusqlite::{params, Connection, Row};

const INSERT_SQL: &str = "INSERT INTO line_items (expense_id, tax_rate, total) VALUES (?1, ?2, ?3)";
const SELECT_BY_ID_SQL: &str =
    "SELECT id, expense_id, tax_rate, total FROM line_items WHERE id = ?1";
const SELECT_ALL_SQL: &str = "SELECT id, expense_id, tax_rate, total FROM line_items ORDER BY id";
const SELECT_BY_EXPENSE_SQL: &str =
    "SELECT id, expense_id, tax_rate, total FROM line_items WHERE expense_id = ?1 ORDER BY id";
const UPDATE_SQL: &str =
    "UPDATE line_items SET expense_id = ?1, tax_rate = ?2, total = ?3 WHERE id = ?4";

fn map_row(row: &Row<'_>) -> rusqlite::Result<LineItem> {
    Ok(LineItem {
        id: row.get(0)?,
        expense_id: row.get(1)?,
        tax_rate: row.get(2)?,
        total: row.get(3)?,
    })
}

/// 明細を作成する
pub fn create(conn: &Connection, line_item: &LineItem) -> AppResult<i64> {
    line_item.pre_insert_valid()?;

    let tx = begin_immediate(conn)?;
    tx.execute(
        INSERT_SQL,
        params![line_item.expense_id, line_item.tax_rate, line_item.total],
    )
    .map_err(|e| store_error(INSERT_SQL, e))?;
    let id = tx.last_insert_rowid();
    tx.commit().map_err(|e| store_error("COMMIT", e))?;

    log::info!("明細を作成しました (ID: {id})");
    Ok(id)
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<LineItem> {
    fetch_one(conn, SELECT_BY_ID_SQL, id, map_row)
}

pub fn find_all(conn: &Connection) -> AppResult<Vec<LineItem>> {
    fetch_all(conn, SELECT_ALL_SQL, [], map_row)
}

/// 経費の明細をID順に取得する
pub fn find_by_expense(conn: &Connection, expense_id: i64) -> AppResult<Vec<LineItem>> {
    fetch_all(conn, SELECT_BY_EXPENSE_SQL, [expense_id], map_row)
}

/// 明細を更新する
pub fn update(conn: &Connection, line_item: &LineItem) -> AppResult<()> {
    line_item.valid()?;

    let tx = begin_immediate(conn)?;
    let affected = tx
        .execute(
            UPDATE_SQL,
            params![
                line_item.expense_id,
                line_item.tax_rate,
                line_item.total,
                line_item.id
            ],
        )
        .map_err(|e| store_error(UPDATE_SQL, e))?;
    ensure_affected(affected, LineItem::LABEL, line_item.id)?;
    tx.commit().map_err(|e| store_error("COMMIT", e))?;

    log::info!("明細を更新しました (ID: {})", line_item.id);
    Ok(())
}

pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    delete_row(conn, "line_items", LineItem::LABEL, id, &[])
}
