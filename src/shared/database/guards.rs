//! 変更前の参照整合性チェック
//!
//! 一意性と「外部キーとして参照されていないこと」を、変更と同じトランザクション内で
//! 事前に確認します。ストアの制約が最終的な判定を行い、ここでは早期に分かりやすい
//! エラーを返すことを目的とします。

use super::connection::store_error;
use crate::shared::errors::{AppError, AppResult};
use rusqlite::{params, Connection, ToSql};

/// 削除対象を外部キーで参照するテーブル
#[derive(Debug, Clone, Copy)]
pub struct Dependent {
    /// 参照元テーブル
    pub table: &'static str,
    /// 外部キー列
    pub column: &'static str,
    /// エラーメッセージに使う参照元の名前
    pub relation: &'static str,
}

/// 一意な列の値が、自分以外の行と重複していないことを確認する
///
/// # 引数
/// * `table` / `column` - 一意制約のあるテーブルと列（コード内の定数のみ）
/// * `value` - 確認する値
/// * `exclude_id` - 更新時は自分自身のID、新規登録時は0
/// * `label` - エラーメッセージに使うフィールド名
pub fn ensure_unique(
    conn: &Connection,
    table: &str,
    column: &str,
    value: &dyn ToSql,
    exclude_id: i64,
    label: &str,
) -> AppResult<()> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1 AND id != ?2");
    let count: i64 = conn
        .query_row(&sql, params![value, exclude_id], |row| row.get(0))
        .map_err(|e| store_error(&sql, e))?;

    if count > 0 {
        log::warn!("一意制約チェックに失敗しました: {table}.{column} は既に使用されています");
        return Err(AppError::uniqueness_conflict(format!(
            "{label}は既に登録されています"
        )));
    }
    Ok(())
}

/// 削除対象の行がどのテーブルからも参照されていないことを確認する
///
/// 参照元ごとの件数を1つの問い合わせで取得し、最初に見つかった参照元を報告する。
pub fn ensure_not_referenced(
    conn: &Connection,
    id: i64,
    label: &str,
    dependents: &[Dependent],
) -> AppResult<()> {
    if dependents.is_empty() {
        return Ok(());
    }

    let sql = dependents
        .iter()
        .enumerate()
        .map(|(index, dependent)| {
            format!(
                "SELECT {index}, COUNT(*) FROM {} WHERE {} = ?1",
                dependent.table, dependent.column
            )
        })
        .collect::<Vec<_>>()
        .join(" UNION ALL ");

    let mut stmt = conn.prepare(&sql).map_err(|e| store_error(&sql, e))?;
    let counts = stmt
        .query_map(params![id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })
        .map_err(|e| store_error(&sql, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| store_error(&sql, e))?;

    let mut referenced: Vec<(i64, i64)> = counts.into_iter().filter(|(_, n)| *n > 0).collect();
    referenced.sort_by_key(|(index, _)| *index);

    if let Some((index, count)) = referenced.first() {
        let relation = usize::try_from(*index)
            .ok()
            .and_then(|i| dependents.get(i))
            .map(|dependent| dependent.relation)
            .unwrap_or("他のデータ");
        log::warn!("{label}(ID: {id}) は{relation}から{count}件参照されているため削除できません");
        return Err(AppError::referential_integrity(format!(
            "{label}(ID: {id}) は{relation}から参照されているため削除できません"
        )));
    }
    Ok(())
}
