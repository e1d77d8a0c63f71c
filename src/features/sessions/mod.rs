/// セッション機能モジュール
///
/// 作業セッションのCRUD操作と、レポート前の日時チェックを提供します。
pub mod models;
pub mod repository;

pub use models::{Session, LOCATION_MAX_CHARS};
