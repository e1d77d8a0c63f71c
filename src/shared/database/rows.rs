use super::connection::{begin_immediate, store_error};
use super::guards::{ensure_not_referenced, Dependent};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::validation::{ensure_positive_id, Validate};
use rusqlite::{Connection, Params, Row};
use std::fmt::Debug;

/// ストアから取得した行を完全な検証にかける
///
/// 失敗した場合はアプリケーションが書き込むはずのないデータなので、データ破損として扱う。
pub fn verify_stored<T: Validate + Debug>(entity: T) -> AppResult<T> {
    match entity.valid() {
        Ok(()) => Ok(entity),
        Err(e) => {
            log::error!("保存データの検証に失敗しました: {entity:?}: {e}");
            Err(AppError::data_corruption(format!(
                "{}(ID: {}) の保存データが不正です: {}",
                T::LABEL,
                entity.entity_id(),
                e.user_message()
            )))
        }
    }
}

/// IDで1行取得し、検証する（0件ならNotFound）
pub fn fetch_one<T, F>(conn: &Connection, sql: &str, id: i64, map_row: F) -> AppResult<T>
where
    T: Validate + Debug,
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    let entity = conn
        .query_row(sql, [id], map_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::not_found(T::LABEL, id),
            _ => store_error(sql, e),
        })?;
    verify_stored(entity)
}

/// 複数行を取得し、すべて検証する（1行でも不正なら全体を失敗とする）
pub fn fetch_all<T, P, F>(conn: &Connection, sql: &str, params: P, map_row: F) -> AppResult<Vec<T>>
where
    T: Validate + Debug,
    P: Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql).map_err(|e| store_error(sql, e))?;
    let rows = stmt
        .query_map(params, map_row)
        .map_err(|e| store_error(sql, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| store_error(sql, e))?;

    rows.into_iter().map(verify_stored).collect()
}

/// 更新・削除の影響行数を確認する（0件ならNotFound）
pub fn ensure_affected(affected: usize, label: &str, id: i64) -> AppResult<()> {
    if affected == 0 {
        log::warn!("{label}(ID: {id}) は存在しません");
        return Err(AppError::not_found(label, id));
    }
    Ok(())
}

/// 参照チェック付きで1行削除する
///
/// 正でないIDは即座に拒否する。参照チェックと削除は同じ即時トランザクションで行う。
pub fn delete_row(
    conn: &Connection,
    table: &str,
    label: &str,
    id: i64,
    dependents: &[Dependent],
) -> AppResult<()> {
    ensure_positive_id(label, "ID", id)?;

    let tx = begin_immediate(conn)?;
    ensure_not_referenced(&tx, id, label, dependents)?;

    let sql = format!("DELETE FROM {table} WHERE id = ?1");
    let affected = tx.execute(&sql, [id]).map_err(|e| store_error(&sql, e))?;
    ensure_affected(affected, label, id)?;

    tx.commit().map_err(|e| store_error("COMMIT", e))?;
    log::info!("{label}を削除しました (ID: {id})");
    Ok(())
}
