//! スキーママイグレーション
//!
//! SQLスクリプトをバイナリに埋め込み、`schema_migrations` テーブルで適用状況を管理します。

use crate::shared::errors::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use sha2::{Digest, Sha256};
use std::fmt;

/// 埋め込みマイグレーション定義
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// 適用順序（1始まり、昇順）
    pub version: u32,
    /// マイグレーション名
    pub name: &'static str,
    /// 実行するSQL
    pub sql: &'static str,
}

impl Migration {
    /// SQL内容のSHA-256チェックサム（16進数文字列）
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.sql.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl fmt::Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}_{}", self.version, self.name)
    }
}

/// 適用対象のマイグレーション一覧（バージョン順）
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: include_str!("migrations/001_initial_schema.sql"),
    },
    Migration {
        version: 2,
        name: "foreign_key_indexes",
        sql: include_str!("migrations/002_foreign_key_indexes.sql"),
    },
];

/// マイグレーション実行結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    /// 今回適用したバージョン
    pub applied: Vec<u32>,
    /// 適用済みのためスキップしたバージョン
    pub skipped: Vec<u32>,
}

const CREATE_MIGRATIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    checksum TEXT NOT NULL,
    applied_at TEXT NOT NULL
)";

/// 埋め込みマイグレーションをすべて適用する
pub fn run_migrations(conn: &mut Connection) -> AppResult<MigrationSummary> {
    apply_migrations(conn, MIGRATIONS)
}

/// 指定したマイグレーションを順に適用する
///
/// 未適用のものはそれぞれ独立したトランザクションで一度だけ実行する。
/// 適用済みのものはチェックサムを照合し、不一致ならMigrationエラーを返す。
pub fn apply_migrations(
    conn: &mut Connection,
    migrations: &[Migration],
) -> AppResult<MigrationSummary> {
    conn.execute(CREATE_MIGRATIONS_TABLE, []).map_err(|e| {
        AppError::migration(format!("schema_migrationsテーブルの作成に失敗しました: {e}"))
    })?;

    let mut summary = MigrationSummary::default();
    let mut previous_version = 0;

    for migration in migrations {
        if migration.version <= previous_version {
            return Err(AppError::migration(format!(
                "マイグレーションの順序が不正です: {migration}"
            )));
        }
        previous_version = migration.version;

        let recorded: Option<String> = conn
            .query_row(
                "SELECT checksum FROM schema_migrations WHERE version = ?1",
                params![migration.version],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| {
                AppError::migration(format!("適用状況の取得に失敗しました ({migration}): {e}"))
            })?;

        let checksum = migration.checksum();
        match recorded {
            Some(existing) if existing == checksum => {
                log::debug!("適用済みのためスキップ: {migration}");
                summary.skipped.push(migration.version);
            }
            Some(existing) => {
                log::error!(
                    "チェックサムが一致しません: {migration} (記録: {existing}, 現在: {checksum})"
                );
                return Err(AppError::migration(format!(
                    "適用済みマイグレーションの内容が変更されています: {migration}"
                )));
            }
            None => {
                apply_one(conn, migration, &checksum)?;
                log::info!("マイグレーションを適用しました: {migration}");
                summary.applied.push(migration.version);
            }
        }
    }

    Ok(summary)
}

fn apply_one(conn: &mut Connection, migration: &Migration, checksum: &str) -> AppResult<()> {
    let tx = Transaction::new(conn, TransactionBehavior::Immediate).map_err(|e| {
        AppError::migration(format!("トランザクションの開始に失敗しました ({migration}): {e}"))
    })?;

    tx.execute_batch(migration.sql).map_err(|e| {
        log::error!("マイグレーションの実行に失敗しました: {migration}: {e}");
        AppError::migration(format!("{migration} の実行に失敗しました: {e}"))
    })?;

    tx.execute(
        "INSERT INTO schema_migrations (version, name, checksum, applied_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            migration.version,
            migration.name,
            checksum,
            chrono::Utc::now().to_rfc3339()
        ],
    )
    .map_err(|e| AppError::migration(format!("適用記録の保存に失敗しました ({migration}): {e}")))?;

    tx.commit().map_err(|e| {
        AppError::migration(format!("コミットに失敗しました ({migration}): {e}"))
    })
}
