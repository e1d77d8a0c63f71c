use super::environment::{get_database_filename, get_environment, Environment};
use crate::shared::errors::{AppError, AppResult};
use std::path::PathBuf;

/// データディレクトリの既定名（OSのデータディレクトリ配下）
const APP_DIR_NAME: &str = "expenseflow";

/// 起動時に一度だけ組み立て、必要なコンポーネントへ明示的に渡す設定
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// 実行環境
    pub environment: Environment,
    /// アプリケーションデータディレクトリ
    pub data_dir: PathBuf,
    /// データベースファイルのパス
    pub database_path: PathBuf,
    /// 領収書ファイルの基準ディレクトリ
    pub receipts_dir: PathBuf,
}

impl AppConfig {
    /// 指定したデータディレクトリから設定を組み立てる
    ///
    /// 領収書ディレクトリ未指定時は `<data_dir>/receipts` を使う。
    pub fn new(
        environment: Environment,
        data_dir: impl Into<PathBuf>,
        receipts_dir: Option<PathBuf>,
    ) -> Self {
        let data_dir = data_dir.into();
        let database_path = data_dir.join(get_database_filename(environment));
        let receipts_dir = receipts_dir.unwrap_or_else(|| data_dir.join("receipts"));

        Self {
            environment,
            data_dir,
            database_path,
            receipts_dir,
        }
    }

    /// 環境変数から設定を読み込む
    ///
    /// # 参照する環境変数
    /// - `EXPENSEFLOW_DATA_DIR`: データディレクトリ（既定: OSのデータディレクトリ/expenseflow）
    /// - `EXPENSEFLOW_RECEIPTS_DIR`: 領収書ディレクトリ（既定: データディレクトリ/receipts）
    ///
    /// # 戻り値
    /// 設定、またはデータディレクトリを決定できない場合はConfigurationエラー
    pub fn from_env() -> AppResult<Self> {
        let environment = get_environment();

        let data_dir = match non_empty_var("EXPENSEFLOW_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or_else(|| {
                    AppError::configuration(
                        "データディレクトリを決定できません（EXPENSEFLOW_DATA_DIR を設定してください）",
                    )
                })?,
        };

        let receipts_dir = non_empty_var("EXPENSEFLOW_RECEIPTS_DIR").map(PathBuf::from);

        let config = Self::new(environment, data_dir, receipts_dir);
        log::debug!("設定を読み込みました: {config:?}");
        Ok(config)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
