/// 経費機能モジュール
///
/// このモジュールは経費管理に関連する機能を提供します：
/// - 経費の作成、読み取り、更新、削除（CRUD操作）
/// - 経費データの段階的なバリデーション
/// - セッション別の経費取得
pub mod models;
pub mod repository;

pub use models::{Expense, CURRENCY_MAX_CHARS, NOTES_MAX_CHARS, RECEIPT_PATH_MAX_CHARS};
