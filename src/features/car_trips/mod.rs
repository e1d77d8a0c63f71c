/// 走行記録機能モジュール
///
/// 走行記録のCRUD操作と、日付ごとの一意性チェックを提供します。
pub mod models;
pub mod repository;

pub use models::CarTrip;
