use super::migrations::run_migrations;
use crate::shared::config::AppConfig;
use crate::shared::errors::{AppError, AppResult};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// データベース接続を初期化し、マイグレーションを実行する
///
/// # 処理内容
/// 1. データディレクトリの確保
/// 2. 初回起動の判定（データベースファイルの有無）
/// 3. データベース接続の開設と設定
/// 4. マイグレーションの実行
pub fn initialize_database(config: &AppConfig) -> AppResult<Connection> {
    if !config.data_dir.exists() {
        std::fs::create_dir_all(&config.data_dir).map_err(|e| {
            AppError::configuration(format!("データディレクトリの作成に失敗: {e}"))
        })?;
        log::info!("データディレクトリを作成: {:?}", config.data_dir);
    }

    let is_first_run = !config.database_path.exists();
    if is_first_run {
        log::info!("=== 初回起動を検出しました ===");
        log::info!("実行環境: {}", config.environment.as_str());
        log::info!("データベースファイル: {:?}", config.database_path);
        log::info!("領収書ディレクトリ: {:?}", config.receipts_dir);
    }

    let mut conn = Connection::open(&config.database_path).map_err(|e| {
        log::error!("データベースを開けません: {:?}: {e}", config.database_path);
        AppError::from(e)
    })?;
    configure(&conn)?;

    let summary = run_migrations(&mut conn)?;
    log::info!(
        "データベースを初期化しました: {:?} (適用: {:?}, スキップ: {:?})",
        config.database_path,
        summary.applied,
        summary.skipped
    );

    Ok(conn)
}

/// スキーマ適用済みのインメモリデータベースを開く
pub fn open_in_memory() -> AppResult<Connection> {
    let mut conn = Connection::open_in_memory()?;
    configure(&conn)?;
    run_migrations(&mut conn)?;
    Ok(conn)
}

/// 接続ごとの設定（外部キー制約の有効化）
pub fn configure(conn: &Connection) -> AppResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| store_error("PRAGMA foreign_keys = ON", e))
}

/// 即時（書き込みロック取得済み）トランザクションを開始する
///
/// ガードの照会と変更を同じトランザクションで行うために使う。
/// コミットせずにドロップした場合はロールバックされる。
pub fn begin_immediate(conn: &Connection) -> AppResult<Transaction<'_>> {
    Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(|e| store_error("BEGIN IMMEDIATE", e))
}

/// ストアのエラーを変換し、発生元のSQLと一緒にログ出力する
pub fn store_error(sql: &str, error: rusqlite::Error) -> AppError {
    let converted = AppError::from(error);
    match &converted {
        AppError::UniquenessConflict(_) | AppError::ReferentialIntegrity(_) => {
            log::warn!("制約違反: {converted} (SQL: {sql})");
        }
        AppError::NotFound(_) => {
            log::debug!("該当行なし (SQL: {sql})");
        }
        _ => {
            log::error!("SQLの実行に失敗しました: {converted} (SQL: {sql})");
        }
    }
    converted
}
