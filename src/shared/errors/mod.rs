use thiserror::Error;

// SQLiteの拡張結果コード（SQLITE_CONSTRAINT | (n << 8)）
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
const SQLITE_CONSTRAINT_TRIGGER: i32 = 1811;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

// ON DELETE RESTRICT 違反はトリガー扱いのコードで、このメッセージを伴う
const FOREIGN_KEY_FAILED_MESSAGE: &str = "FOREIGN KEY constraint failed";

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// フィールドまたはフィールド間の不変条件違反
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 一意制約違反（既存の行と重複）
    #[error("一意制約エラー: {0}")]
    UniquenessConflict(String),

    /// 参照整合性違反（依存する行が存在する、または参照先が存在しない）
    #[error("参照整合性エラー: {0}")]
    ReferentialIntegrity(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// データベース関連のエラー（ステートメントの準備・実行失敗）
    #[error("データベースエラー: {0}")]
    Database(String),

    /// ストアから取得した行が検証に失敗した
    #[error("データ破損: {0}")]
    DataCorruption(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// スキーママイグレーション関連のエラー
    #[error("マイグレーションエラー: {0}")]
    Migration(String),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（ファイル操作エラーなど）
    Medium,
    /// 高重要度（データベースエラーなど）
    High,
    /// 最重要（データ破損など）
    Critical,
}

impl AppError {
    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg,
            AppError::UniquenessConflict(msg) => msg,
            AppError::ReferentialIntegrity(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::Database(_) => "データベース操作でエラーが発生しました",
            AppError::DataCorruption(_) => "保存されているデータが破損しています",
            AppError::Configuration(_) => "設定エラーが発生しました",
            AppError::Migration(_) => "データベースの初期化でエラーが発生しました",
            AppError::Io(_) => "ファイル操作でエラーが発生しました",
        }
    }

    /// エラーの詳細情報を取得
    ///
    /// # 戻り値
    /// エラーの詳細情報（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::UniquenessConflict(_) => ErrorSeverity::Low,
            AppError::ReferentialIntegrity(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::Database(_) => ErrorSeverity::High,
            AppError::DataCorruption(_) => ErrorSeverity::Critical,
            AppError::Configuration(_) => ErrorSeverity::High,
            AppError::Migration(_) => ErrorSeverity::High,
            AppError::Io(_) => ErrorSeverity::Medium,
        }
    }

    /// バリデーションエラーを作成するヘルパー関数
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// 一意制約エラーを作成するヘルパー関数
    pub fn uniqueness_conflict<S: Into<String>>(message: S) -> Self {
        AppError::UniquenessConflict(message.into())
    }

    /// 参照整合性エラーを作成するヘルパー関数
    pub fn referential_integrity<S: Into<String>>(message: S) -> Self {
        AppError::ReferentialIntegrity(message.into())
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    /// * `id` - 対象ID
    ///
    /// # 戻り値
    /// リソース未発見エラー
    pub fn not_found<S: Into<String>>(resource: S, id: i64) -> Self {
        AppError::NotFound(format!("{}が見つかりません（ID: {id}）", resource.into()))
    }

    /// データ破損エラーを作成するヘルパー関数
    pub fn data_corruption<S: Into<String>>(message: S) -> Self {
        AppError::DataCorruption(message.into())
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// マイグレーションエラーを作成するヘルパー関数
    pub fn migration<S: Into<String>>(message: S) -> Self {
        AppError::Migration(message.into())
    }
}

/// AppErrorからStringへの変換（エントリポイントでの表示用）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message().to_string()
    }
}

/// rusqlite::ErrorからAppErrorへの変換
///
/// ストアの制約違反は、ガードが返すものと同じ種類のエラーに写像する。
impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(failure, message) => {
                let detail = message.clone().unwrap_or_else(|| failure.to_string());
                match failure.extended_code {
                    SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => {
                        AppError::UniquenessConflict(detail)
                    }
                    SQLITE_CONSTRAINT_FOREIGNKEY => AppError::ReferentialIntegrity(detail),
                    SQLITE_CONSTRAINT_TRIGGER if detail == FOREIGN_KEY_FAILED_MESSAGE => {
                        AppError::ReferentialIntegrity(detail)
                    }
                    _ => AppError::Database(error.to_string()),
                }
            }
            rusqlite::Error::QueryReturnedNoRows => {
                AppError::NotFound("該当する行がありません".to_string())
            }
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..) => {
                AppError::DataCorruption(format!("保存値を読み込めません: {error}"))
            }
            _ => AppError::Database(error.to_string()),
        }
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
