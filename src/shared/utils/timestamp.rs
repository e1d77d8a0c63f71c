use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

/// `2024-01-02 15:04:05.123 +0900 JST m=+0.001` 形式からゾーン略称とモノトニック時計部分を取り除く
static ZONED_WITH_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(?:\.\d+)? [+-]\d{4})(?: [A-Za-z][A-Za-z0-9+\-]*)?(?: m=[+-]?\d+(?:\.\d+)?)?$",
    )
    .expect("valid regex")
});

/// タイムゾーンなしで保存された値のフォーマット（UTCとして解釈）
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// NULL許容タイムスタンプ列の値
///
/// 書き込みは常にRFC 3339。読み込みは過去のランタイムが残した複数の形式を受け付ける。
/// 値が無い場合は `Option<StoredTimestamp>` の `None`（SQLの NULL）で表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredTimestamp(pub DateTime<FixedOffset>);

impl StoredTimestamp {
    pub fn into_inner(self) -> DateTime<FixedOffset> {
        self.0
    }
}

impl From<DateTime<FixedOffset>> for StoredTimestamp {
    fn from(value: DateTime<FixedOffset>) -> Self {
        StoredTimestamp(value)
    }
}

impl ToSql for StoredTimestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(format_stored_timestamp(&self.0)))
    }
}

impl FromSql for StoredTimestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Text(bytes) => {
                let text =
                    std::str::from_utf8(bytes).map_err(|e| FromSqlError::Other(Box::new(e)))?;
                parse_stored_timestamp(text)
                    .map(StoredTimestamp)
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
            ValueRef::Integer(secs) => DateTime::<Utc>::from_timestamp(secs, 0)
                .map(|dt| StoredTimestamp(dt.into()))
                .ok_or(FromSqlError::OutOfRange(secs)),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// 保存用の文字列表現（RFC 3339、小数秒は必要な桁だけ）
pub fn format_stored_timestamp(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// 保存されたタイムスタンプ文字列を解析する
///
/// # 受け付ける形式
/// - RFC 3339（`2024-01-02T15:04:05+09:00`）
/// - ゾーン略称・モノトニック時計付き（`2024-01-02 15:04:05.5 +0900 JST m=+0.01`）
/// - SQLiteの日時文字列（`2024-01-02 15:04:05`、UTCとみなす）
pub fn parse_stored_timestamp(text: &str) -> AppResult<DateTime<FixedOffset>> {
    let trimmed = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt);
    }

    if let Some(captures) = ZONED_WITH_SUFFIX.captures(trimmed) {
        if let Ok(dt) = DateTime::parse_from_str(&captures[1], "%Y-%m-%d %H:%M:%S%.f %z") {
            return Ok(dt);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc().into());
        }
    }

    Err(AppError::data_corruption(format!(
        "タイムスタンプを解析できません: {text}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use rusqlite::Connection;

    fn jst(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse_stored_timestamp("2024-03-01T09:30:00+09:00").unwrap();
        assert_eq!(parsed, jst(2024, 3, 1, 9, 30, 0));
    }

    #[test]
    fn test_parse_zone_abbreviation_and_monotonic_suffix() {
        let parsed =
            parse_stored_timestamp("2024-03-01 09:30:00.25 +0900 JST m=+0.001234567").unwrap();
        assert_eq!(parsed.with_nanosecond(0).unwrap(), jst(2024, 3, 1, 9, 30, 0));
        assert_eq!(parsed.nanosecond(), 250_000_000);

        let without_suffix = parse_stored_timestamp("2024-03-01 09:30:00 +0900 JST").unwrap();
        assert_eq!(without_suffix, jst(2024, 3, 1, 9, 30, 0));

        let offset_only = parse_stored_timestamp("2024-03-01 09:30:00 +0900").unwrap();
        assert_eq!(offset_only, jst(2024, 3, 1, 9, 30, 0));
    }

    #[test]
    fn test_parse_naive_sqlite_format_as_utc() {
        let parsed = parse_stored_timestamp("2024-03-01 00:30:00").unwrap();
        assert_eq!(parsed, jst(2024, 3, 1, 9, 30, 0));
        assert_eq!(parsed.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let error = parse_stored_timestamp("昨日の夕方").unwrap_err();
        assert!(matches!(error, AppError::DataCorruption(_)));
    }

    #[test]
    fn test_null_and_value_round_trip_through_store() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, at TEXT)", [])
            .unwrap();

        let present = Some(StoredTimestamp(jst(2024, 3, 1, 9, 30, 0)));
        let absent: Option<StoredTimestamp> = None;
        conn.execute("INSERT INTO t (id, at) VALUES (1, ?1)", [&present])
            .unwrap();
        conn.execute("INSERT INTO t (id, at) VALUES (2, ?1)", [&absent])
            .unwrap();

        let first: Option<StoredTimestamp> = conn
            .query_row("SELECT at FROM t WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        let second: Option<StoredTimestamp> = conn
            .query_row("SELECT at FROM t WHERE id = 2", [], |row| row.get(0))
            .unwrap();

        assert_eq!(first, present);
        assert_eq!(second, None);
    }

    #[test]
    fn test_integer_column_is_unix_seconds() {
        let conn = Connection::open_in_memory().unwrap();
        let value: StoredTimestamp = conn
            .query_row("SELECT 0", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value.into_inner().timestamp(), 0);
    }
}
