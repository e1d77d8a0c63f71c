/// 機能別モジュール
///
/// 各機能モジュールは、そのエンティティに関連するコード（モデル、検証、データベース操作）
/// を含む自己完結型のユニットです。
pub mod car_trips;
pub mod clients;
pub mod expense_types;
pub mod expenses;
pub mod line_items;
pub mod receipts;
pub mod reports;
pub mod sessions;
