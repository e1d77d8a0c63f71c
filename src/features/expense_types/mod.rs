/// 経費種別機能モジュール
pub mod models;
pub mod repository;

pub use models::{ExpenseType, EXPENSE_TYPE_NAME_MAX_CHARS};
