/// 明細機能モジュール
pub mod models;
pub mod repository;

pub use models::LineItem;
