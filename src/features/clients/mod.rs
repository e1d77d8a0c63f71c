/// クライアント機能モジュール
///
/// クライアントの作成、取得、更新、削除と、名前の一意性チェックを提供します。
pub mod models;
pub mod repository;

pub use models::{Client, CLIENT_NAME_MAX_CHARS};
