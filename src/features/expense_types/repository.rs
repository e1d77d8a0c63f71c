use super::models::ExpenseType;
use crate::shared::database::{
    begin_immediate, delete_row, ensure_affected, ensure_unique, fetch_all, fetch_one,
    store_error, Dependent,
};
use crate::shared::errors::AppResult;
use crate::shared::validation::Validate;
use rusqlite::{params, Connection, Row};

const INSERT_SQL: &str = "INSERT INTO expense_types (name) VALUES (?1)";
const SELECT_BY_ID_SQL: &str = "SELECT id, name FROM expense_types WHERE id = ?1";
const SELECT_ALL_SQL: &str = "SELECT id, name FROM expense_types ORDER BY id";
const UPDATE_SQL: &str = "UPDATE expense_types SET name = ?1 WHERE id = ?2";

const DEPENDENTS: &[Dependent] = &[Dependent {
    table: "expenses",
    column: "type_id",
    relation: "経費",
}];

fn map_row(row: &Row<'_>) -> rusqlite::Result<ExpenseType> {
    Ok(ExpenseType {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// 経費種別を作成する
pub fn create(conn: &Connection, expense_type: &ExpenseType) -> AppResult<i64> {
    expense_type.pre_insert_valid()?;

    let tx = begin_immediate(conn)?;
    ensure_unique(
        &tx,
        "expense_types",
        "name",
        &expense_type.name,
        0,
        "経費種別名",
    )?;
    tx.execute(INSERT_SQL, params![expense_type.name])
        .map_err(|e| store_error(INSERT_SQL, e))?;
    let id = tx.last_insert_rowid();
    tx.commit().map_err(|e| store_error("COMMIT", e))?;

    log::info!("経費種別を作成しました (ID: {id})");
    Ok(id)
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<ExpenseType> {
    fetch_one(conn, SELECT_BY_ID_SQL, id, map_row)
}

pub fn find_all(conn: &Connection) -> AppResult<Vec<ExpenseType>> {
    fetch_all(conn, SELECT_ALL_SQL, [], map_row)
}

/// 経費種別を更新する
pub fn update(conn: &Connection, expense_type: &ExpenseType) -> AppResult<()> {
    expense_type.valid()?;

    let tx = begin_immediate(conn)?;
    ensure_unique(
        &tx,
        "expense_types",
        "name",
        &expense_type.name,
        expense_type.id,
        "経費種別名",
    )?;
    let affected = tx
        .execute(UPDATE_SQL, params![expense_type.name, expense_type.id])
        .map_err(|e| store_error(UPDATE_SQL, e))?;
    ensure_affected(affected, ExpenseType::LABEL, expense_type.id)?;
    tx.commit().map_err(|e| store_error("COMMIT", e))?;

    log::info!("経費種別を更新しました (ID: {})", expense_type.id);
    Ok(())
}

/// 経費種別を削除する（経費から参照されている場合は拒否）
pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    delete_row(conn, "expense_types", ExpenseType::LABEL, id, DEPENDENTS)
}
