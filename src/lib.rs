pub mod features;
pub mod shared;

use features::receipts::ReceiptInspector;
use log::{error, info};
use rusqlite::Connection;
use shared::config::{
    initialize_logging_system, load_environment_variables, AppConfig, EnvironmentConfig,
};
use shared::database::initialize_database;
use shared::errors::AppResult;

/// 起動時に組み立てるアプリケーション状態
pub struct AppState {
    pub config: AppConfig,
    pub db: Connection,
    pub receipts: ReceiptInspector,
}

/// 環境変数・ログ・設定・データベースを順に初期化する
pub fn initialize_application() -> AppResult<AppState> {
    load_environment_variables();
    initialize_logging_system(&EnvironmentConfig::from_env());

    info!("アプリケーション初期化を開始します...");

    let config = AppConfig::from_env()?;

    info!("データベースを初期化しています...");
    let db = initialize_database(&config).map_err(|e| {
        error!("データベースの初期化に失敗しました: {e}");
        e
    })?;
    info!("データベースの初期化が完了しました");

    let receipts = ReceiptInspector::from_config(&config);

    info!("アプリケーション初期化が完了しました");
    Ok(AppState {
        config,
        db,
        receipts,
    })
}

/// エントリポイント：初期化して登録済みデータの概要をログに出力する
pub fn run() -> AppResult<()> {
    let state = initialize_application()?;

    let clients = features::clients::repository::find_all(&state.db)?;
    let sessions = features::sessions::repository::find_all(&state.db)?;
    let expenses = features::expenses::repository::find_all(&state.db)?;
    info!(
        "登録済み: クライアント{}件, セッション{}件, 経費{}件 (領収書ディレクトリ: {:?})",
        clients.len(),
        sessions.len(),
        expenses.len(),
        state.receipts.receipts_dir()
    );
    Ok(())
}
