/// 領収書機能モジュール
///
/// 領収書ファイルのパス解決と、先頭バイトによる画像形式の判定を提供します。
pub mod inspector;

pub use inspector::{sniff_content_type, ReceiptInspector, ACCEPTED_RECEIPT_TYPES};
