use crate::shared::config::MAX_AMOUNT;
use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

/// 税率の上限（パーセント）
pub const MAX_TAX_RATE: f64 = 60.0;

/// エンティティの検証レベル（登録前・完全）
///
/// `valid` は常に `pre_insert_valid` を包含する。レポート前の検証は
/// 外部資源を必要とするため、各エンティティの固有メソッドとして実装する。
pub trait Validate {
    /// ログ・エラーメッセージに使うエンティティ名
    const LABEL: &'static str;

    /// ストアが割り当てたID（未登録なら0）
    fn entity_id(&self) -> i64;

    /// 登録前の検証（フィールド単位の制約のみ、IDは不要）
    fn pre_insert_valid(&self) -> AppResult<()>;

    /// 完全な検証（登録前の検証に加えて正のIDを要求）
    fn valid(&self) -> AppResult<()> {
        ensure_positive_id(Self::LABEL, "ID", self.entity_id())?;
        self.pre_insert_valid()
    }
}

fn reject(entity: &str, message: String) -> AppError {
    log::warn!("{entity}の検証に失敗しました: {message}");
    AppError::validation(format!("{entity}: {message}"))
}

/// 文字列フィールドを検証する
///
/// 空文字・NULバイトを拒否し、長さはUnicodeスカラー値の数で数える。
pub fn validate_text(entity: &str, field: &str, value: &str, max_chars: usize) -> AppResult<()> {
    if value.is_empty() {
        return Err(reject(entity, format!("{field}は必須です")));
    }
    if value.contains('\0') {
        return Err(reject(
            entity,
            format!("{field}に使用できない文字が含まれています"),
        ));
    }
    let length = value.chars().count();
    if length > max_chars {
        return Err(reject(
            entity,
            format!("{field}は{max_chars}文字以内で入力してください（現在: {length}文字）"),
        ));
    }
    Ok(())
}

/// NULL許容の文字列フィールドを検証する（存在する場合は空であってはならない）
pub fn validate_optional_text(
    entity: &str,
    field: &str,
    value: Option<&str>,
    max_chars: usize,
) -> AppResult<()> {
    match value {
        Some(text) => validate_text(entity, field, text, max_chars),
        None => Ok(()),
    }
}

/// IDが正の整数であることを確認する
pub fn ensure_positive_id(entity: &str, field: &str, id: i64) -> AppResult<()> {
    if id <= 0 {
        return Err(reject(
            entity,
            format!("{field}は正の整数である必要があります（現在: {id}）"),
        ));
    }
    Ok(())
}

/// NULL許容の外部キーを検証する
///
/// 値が無いことは `None` で表す。0や負の値は「無し」ではなく常にエラー。
pub fn validate_optional_fk(entity: &str, field: &str, id: Option<i64>) -> AppResult<()> {
    match id {
        Some(value) => ensure_positive_id(entity, field, value),
        None => Ok(()),
    }
}

/// 金額・距離を検証する（有限、0より大きく上限以下）
pub fn validate_bounded_amount(entity: &str, field: &str, value: f64) -> AppResult<()> {
    if !value.is_finite() {
        return Err(reject(entity, format!("{field}が数値ではありません")));
    }
    if value <= 0.0 {
        return Err(reject(
            entity,
            format!("{field}は0より大きい値である必要があります（現在: {value}）"),
        ));
    }
    if value > MAX_AMOUNT {
        return Err(reject(
            entity,
            format!("{field}が上限値{MAX_AMOUNT}を超えています（現在: {value}）"),
        ));
    }
    Ok(())
}

/// 税率を検証する（0〜60%）
pub fn validate_tax_rate(entity: &str, field: &str, rate: f64) -> AppResult<()> {
    if !rate.is_finite() || !(0.0..=MAX_TAX_RATE).contains(&rate) {
        return Err(reject(
            entity,
            format!("{field}は0〜{MAX_TAX_RATE}の範囲で入力してください（現在: {rate}）"),
        ));
    }
    Ok(())
}

/// 日付のみのフィールド（YYYY-MM-DD）を検証し、解析結果を返す
pub fn validate_date_only(entity: &str, field: &str, value: &str) -> AppResult<NaiveDate> {
    if value.len() != 10 {
        return Err(reject(
            entity,
            format!("{field}はYYYY-MM-DD形式で入力してください（現在: {value}）"),
        ));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        reject(
            entity,
            format!("{field}はYYYY-MM-DD形式で入力してください（現在: {value}）"),
        )
    })?;
    if date == NaiveDate::MIN || is_zero_date(date) {
        return Err(reject(entity, format!("{field}が設定されていません")));
    }
    Ok(date)
}

/// 日時が設定済み（0001-01-01T00:00:00Z ではない）であることを確認する
pub fn validate_datetime_set(
    entity: &str,
    field: &str,
    value: &DateTime<FixedOffset>,
) -> AppResult<()> {
    let naive = value.naive_utc();
    if is_zero_date(naive.date()) && NaiveTime::from_hms_opt(0, 0, 0) == Some(naive.time()) {
        return Err(reject(entity, format!("{field}が設定されていません")));
    }
    Ok(())
}

fn is_zero_date(date: NaiveDate) -> bool {
    NaiveDate::from_ymd_opt(1, 1, 1) == Some(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_text_length_counts_unicode_scalars() {
        // 100文字の日本語（300バイト）は許可される
        let name = "あ".repeat(100);
        assert!(validate_text("クライアント", "名前", &name, 100).is_ok());

        let too_long = "あ".repeat(101);
        assert!(validate_text("クライアント", "名前", &too_long, 100).is_err());
    }

    #[test]
    fn test_text_rejects_empty_and_nul() {
        assert!(validate_text("経費", "通貨", "", 10).is_err());
        assert!(validate_text("経費", "通貨", "JP\0Y", 10).is_err());
    }

    #[test]
    fn test_optional_text_absent_is_valid_but_empty_is_not() {
        assert!(validate_optional_text("経費", "メモ", None, 150).is_ok());
        assert!(validate_optional_text("経費", "メモ", Some(""), 150).is_err());
        assert!(validate_optional_text("経費", "メモ", Some("昼食"), 150).is_ok());
    }

    #[test]
    fn test_optional_fk_zero_and_negative_are_errors() {
        assert!(validate_optional_fk("経費", "セッションID", None).is_ok());
        assert!(validate_optional_fk("経費", "セッションID", Some(3)).is_ok());
        assert!(validate_optional_fk("経費", "セッションID", Some(0)).is_err());
        assert!(validate_optional_fk("経費", "セッションID", Some(-1)).is_err());
    }

    #[test]
    fn test_bounded_amount_edges() {
        assert!(validate_bounded_amount("明細", "合計", MAX_AMOUNT).is_ok());
        assert!(validate_bounded_amount("明細", "合計", MAX_AMOUNT + 1.0).is_err());
        assert!(validate_bounded_amount("明細", "合計", 0.0).is_err());
        assert!(validate_bounded_amount("明細", "合計", -5.0).is_err());
        assert!(validate_bounded_amount("明細", "合計", f64::NAN).is_err());
        assert!(validate_bounded_amount("明細", "合計", f64::INFINITY).is_err());
    }

    #[test]
    fn test_tax_rate_edges() {
        assert!(validate_tax_rate("明細", "税率", 0.0).is_ok());
        assert!(validate_tax_rate("明細", "税率", 60.0).is_ok());
        assert!(validate_tax_rate("明細", "税率", 60.000001).is_err());
        assert!(validate_tax_rate("明細", "税率", -0.1).is_err());
    }

    #[test]
    fn test_date_only() {
        assert_eq!(
            validate_date_only("走行記録", "日付", "2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(validate_date_only("走行記録", "日付", "2023-02-29").is_err());
        assert!(validate_date_only("走行記録", "日付", "2024-2-9").is_err());
        assert!(validate_date_only("走行記録", "日付", "2024-02-29T00").is_err());
        assert!(validate_date_only("走行記録", "日付", "0001-01-01").is_err());
    }

    #[test]
    fn test_datetime_set() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let zero = utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap();
        let real = utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        assert!(validate_datetime_set("経費", "日時", &zero).is_err());
        assert!(validate_datetime_set("経費", "日時", &real).is_ok());
    }

    #[test]
    fn test_errors_are_validation_kind() {
        let error = ensure_positive_id("経費", "ID", 0).unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));
    }
}
