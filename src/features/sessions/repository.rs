use super::models::Session;
use crate::shared::database::{
    begin_immediate, delete_row, ensure_affected, fetch_all, fetch_one, store_error, Dependent,
};
use crate::shared::errors::AppResult;
use crate::shared::utils::StoredTimestamp;
use crate::shared::validation::Validate;
use rusqlite::{params, Connection, Row};

const COLUMNS: &str =
    "id, client_id, location, trip_start_location, trip_end_location, start_at, end_at";

const INSERT_SQL: &str = "INSERT INTO sessions
    (client_id, location, trip_start_location, trip_end_location, start_at, end_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const UPDATE_SQL: &str = "UPDATE sessions SET
    client_id = ?1, location = ?2, trip_start_location = ?3, trip_end_location = ?4,
    start_at = ?5, end_at = ?6
    WHERE id = ?7";

/// セッションを参照するテーブル
const DEPENDENTS: &[Dependent] = &[
    Dependent {
        table: "car_trips",
        column: "session_id",
        relation: "走行記録",
    },
    Dependent {
        table: "expenses",
        column: "session_id",
        relation: "経費",
    },
];

fn map_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        client_id: row.get(1)?,
        location: row.get(2)?,
        trip_start_location: row.get(3)?,
        trip_end_location: row.get(4)?,
        start_at: row.get::<_, Option<StoredTimestamp>>(5)?.map(StoredTimestamp::into_inner),
        end_at: row.get::<_, Option<StoredTimestamp>>(6)?.map(StoredTimestamp::into_inner),
    })
}

/// セッションを作成する
///
/// 存在しないクライアントを指定した場合はストアの外部キー制約により
/// 参照整合性エラーになる。
pub fn create(conn: &Connection, session: &Session) -> AppResult<i64> {
    session.pre_insert_valid()?;

    let tx = begin_immediate(conn)?;
    tx.execute(
        INSERT_SQL,
        params![
            session.client_id,
            session.location,
            session.trip_start_location,
            session.trip_end_location,
            session.start_at.map(StoredTimestamp),
            session.end_at.map(StoredTimestamp),
        ],
    )
    .map_err(|e| store_error(INSERT_SQL, e))?;
    let id = tx.last_insert_rowid();
    tx.commit().map_err(|e| store_error("COMMIT", e))?;

    log::info!("セッションを作成しました (ID: {id})");
    Ok(id)
}

/// IDでセッションを取得する
pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Session> {
    let sql = format!("SELECT {COLUMNS} FROM sessions WHERE id = ?1");
    fetch_one(conn, &sql, id, map_row)
}

/// すべてのセッションをID順に取得する
pub fn find_all(conn: &Connection) -> AppResult<Vec<Session>> {
    let sql = format!("SELECT {COLUMNS} FROM sessions ORDER BY id");
    fetch_all(conn, &sql, [], map_row)
}

/// クライアントのセッションをID順に取得する
pub fn find_by_client(conn: &Connection, client_id: i64) -> AppResult<Vec<Session>> {
    let sql = format!("SELECT {COLUMNS} FROM sessions WHERE client_id = ?1 ORDER BY id");
    fetch_all(conn, &sql, [client_id], map_row)
}

/// セッションを更新する
pub fn update(conn: &Connection, session: &Session) -> AppResult<()> {
    session.valid()?;

    let tx = begin_immediate(conn)?;
    let affected = tx
        .execute(
            UPDATE_SQL,
            params![
                session.client_id,
                session.location,
                session.trip_start_location,
                session.trip_end_location,
                session.start_at.map(StoredTimestamp),
                session.end_at.map(StoredTimestamp),
                session.id,
            ],
        )
        .map_err(|e| store_error(UPDATE_SQL, e))?;
    ensure_affected(affected, Session::LABEL, session.id)?;
    tx.commit().map_err(|e| store_error("COMMIT", e))?;

    log::info!("セッションを更新しました (ID: {})", session.id);
    Ok(())
}

/// セッションを削除する（走行記録・経費から参照されている場合は拒否）
pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    delete_row(conn, "sessions", Session::LABEL, id, DEPENDENTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::clients::{self, Client};
    use crate::shared::database::open_in_memory;
    use crate::shared::errors::AppError;
    use chrono::{DateTime, FixedOffset, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 4, day, hour, 30, 15)
            .unwrap()
    }

    fn setup() -> (Connection, i64) {
        let conn = open_in_memory().unwrap();
        let client_id = clients::repository::create(&conn, &Client::new("Acme")).unwrap();
        (conn, client_id)
    }

    #[test]
    fn test_round_trip_with_nullable_fields() {
        let (conn, client_id) = setup();
        let session = Session {
            id: 0,
            client_id,
            location: "名古屋".to_string(),
            trip_start_location: Some("東京".to_string()),
            trip_end_location: None,
            start_at: Some(at(1, 9)),
            end_at: None,
        };

        let id = create(&conn, &session).unwrap();
        let found = find_by_id(&conn, id).unwrap();
        assert_eq!(found, Session { id, ..session });
    }

    #[test]
    fn test_unknown_client_is_referential_integrity_error() {
        let (conn, _) = setup();
        let error = create(&conn, &Session::new(999, "Nowhere")).unwrap_err();
        assert!(matches!(error, AppError::ReferentialIntegrity(_)));
    }

    #[test]
    fn test_update_sets_and_clears_fields() {
        let (conn, client_id) = setup();
        let id = create(&conn, &Session::new(client_id, "Osaka")).unwrap();

        let mut session = find_by_id(&conn, id).unwrap();
        session.start_at = Some(at(1, 9));
        session.end_at = Some(at(1, 18));
        session.trip_end_location = Some("Kyoto".to_string());
        update(&conn, &session).unwrap();
        assert_eq!(find_by_id(&conn, id).unwrap(), session);

        session.trip_end_location = None;
        update(&conn, &session).unwrap();
        assert_eq!(find_by_id(&conn, id).unwrap().trip_end_location, None);
    }

    #[test]
    fn test_find_by_client() {
        let (conn, acme) = setup();
        let globex = clients::repository::create(&conn, &Client::new("Globex")).unwrap();
        create(&conn, &Session::new(acme, "A1")).unwrap();
        create(&conn, &Session::new(globex, "G1")).unwrap();
        create(&conn, &Session::new(acme, "A2")).unwrap();

        let locations: Vec<String> = find_by_client(&conn, acme)
            .unwrap()
            .into_iter()
            .map(|s| s.location)
            .collect();
        assert_eq!(locations, vec!["A1", "A2"]);
        assert_eq!(find_all(&conn).unwrap().len(), 3);
    }

    #[test]
    fn test_legacy_timestamp_text_is_readable() {
        let (conn, client_id) = setup();
        conn.execute(
            "INSERT INTO sessions (client_id, location, start_at, end_at)
             VALUES (?1, 'Legacy', '2024-04-01 09:30:15 +0900 JST m=+0.5', '2024-04-01 09:30:15')",
            [client_id],
        )
        .unwrap();

        let session = find_all(&conn).unwrap().pop().unwrap();
        assert_eq!(session.start_at, Some(at(1, 9)));
        assert_eq!(
            session.end_at.map(|t| t.timestamp()),
            Some(at(1, 18).timestamp())
        );
    }

    #[test]
    fn test_delete_blocked_by_client_reference() {
        let (conn, client_id) = setup();
        create(&conn, &Session::new(client_id, "Osaka")).unwrap();

        assert!(matches!(
            clients::repository::delete(&conn, client_id),
            Err(AppError::ReferentialIntegrity(_))
        ));
    }
}
