/// レポート機能モジュール
///
/// 通貨付き金額の加算、通貨別・税率別の集計、セッション単位のレポート作成を提供します。
pub mod aggregates;
pub mod amount;
pub mod service;

pub use aggregates::{map_expenses_by_currency, sum_by_tax_rates, TaxRateTotal};
pub use amount::{Amount, AmountList};
pub use service::{build_session_report, CurrencyBreakdown, SessionReport};
