use super::models::CarTrip;
use crate::shared::database::{
    begin_immediate, delete_row, ensure_affected, ensure_unique, fetch_all, fetch_one,
    store_error,
};
use crate::shared::errors::AppResult;
use crate::shared::validation::Validate;
use rusqlite::{params, Connection, Row};

const INSERT_SQL: &str =
    "INSERT INTO car_trips (session_id, distance_km, date_only) VALUES (?1, ?2, ?3)";
const SELECT_BY_ID_SQL: &str =
    "SELECT id, session_id, distance_km, date_only FROM car_trips WHERE id = ?1";
const SELECT_ALL_SQL: &str =
    "SELECT id, session_id, distance_km, date_only FROM car_trips ORDER BY id";
const SELECT_BY_SESSION_SQL: &str =
    "SELECT id, session_id, distance_km, date_only FROM car_trips WHERE session_id = ?1 ORDER BY date_only";
const UPDATE_SQL: &str =
    "UPDATE car_trips SET session_id = ?1, distance_km = ?2, date_only = ?3 WHERE id = ?4";

fn map_row(row: &Row<'_>) -> rusqlite::Result<CarTrip> {
    Ok(CarTrip {
        id: row.get(0)?,
        session_id: row.get(1)?,
        distance_km: row.get(2)?,
        date_only: row.get(3)?,
    })
}

/// 走行記録を作成する（同じ日付の記録は1件まで）
pub fn create(conn: &Connection, car_trip: &CarTrip) -> AppResult<i64> {
    car_trip.pre_insert_valid()?;

    let tx = begin_immediate(conn)?;
    ensure_unique(&tx, "car_trips", "date_only", &car_trip.date_only, 0, "走行日")?;
    tx.execute(
        INSERT_SQL,
        params![car_trip.session_id, car_trip.distance_km, car_trip.date_only],
    )
    .map_err(|e| store_error(INSERT_SQL, e))?;
    let id = tx.last_insert_rowid();
    tx.commit().map_err(|e| store_error("COMMIT", e))?;

    log::info!("走行記録を作成しました (ID: {id})");
    Ok(id)
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<CarTrip> {
    fetch_one(conn, SELECT_BY_ID_SQL, id, map_row)
}

pub fn find_all(conn: &Connection) -> AppResult<Vec<CarTrip>> {
    fetch_all(conn, SELECT_ALL_SQL, [], map_row)
}

/// セッションに紐づく走行記録を日付順に取得する
pub fn find_by_session(conn: &Connection, session_id: i64) -> AppResult<Vec<CarTrip>> {
    fetch_all(conn, SELECT_BY_SESSION_SQL, [session_id], map_row)
}

/// 走行記録を更新する
pub fn update(conn: &Connection, car_trip: &CarTrip) -> AppResult<()> {
    car_trip.valid()?;

    let tx = begin_immediate(conn)?;
    ensure_unique(
        &tx,
        "car_trips",
        "date_only",
        &car_trip.date_only,
        car_trip.id,
        "走行日",
    )?;
    let affected = tx
        .execute(
            UPDATE_SQL,
            params![
                car_trip.session_id,
                car_trip.distance_km,
                car_trip.date_only,
                car_trip.id
            ],
        )
        .map_err(|e| store_error(UPDATE_SQL, e))?;
    ensure_affected(affected, CarTrip::LABEL, car_trip.id)?;
    tx.commit().map_err(|e| store_error("COMMIT", e))?;

    log::info!("走行記録を更新しました (ID: {})", car_trip.id);
    Ok(())
}

/// 走行記録を削除する（参照元はない）
pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    delete_row(conn, "car_trips", CarTrip::LABEL, id, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::clients::{self, Client};
    use crate::features::sessions::{self, Session};
    use crate::shared::database::open_in_memory;
    use crate::shared::errors::AppError;

    #[test]
    fn test_one_trip_per_date() {
        let conn = open_in_memory().unwrap();
        let first = create(&conn, &CarTrip::new(12.0, "2024-04-01")).unwrap();
        assert!(matches!(
            create(&conn, &CarTrip::new(30.0, "2024-04-01")),
            Err(AppError::UniquenessConflict(_))
        ));

        let second = create(&conn, &CarTrip::new(30.0, "2024-04-02")).unwrap();
        let mut moved = find_by_id(&conn, second).unwrap();
        moved.date_only = "2024-04-01".to_string();
        assert!(matches!(
            update(&conn, &moved),
            Err(AppError::UniquenessConflict(_))
        ));

        // 自分自身の日付のままなら更新できる
        let mut same = find_by_id(&conn, first).unwrap();
        same.distance_km = 13.5;
        update(&conn, &same).unwrap();
        assert_eq!(find_by_id(&conn, first).unwrap(), same);
    }

    #[test]
    fn test_find_by_session_and_session_delete_guard() {
        let conn = open_in_memory().unwrap();
        let client_id = clients::repository::create(&conn, &Client::new("Acme")).unwrap();
        let session_id =
            sessions::repository::create(&conn, &Session::new(client_id, "Osaka")).unwrap();

        let mut trip = CarTrip::new(120.0, "2024-04-03");
        trip.session_id = Some(session_id);
        create(&conn, &trip).unwrap();
        create(&conn, &CarTrip::new(5.0, "2024-04-04")).unwrap();

        assert_eq!(find_by_session(&conn, session_id).unwrap().len(), 1);
        assert_eq!(find_all(&conn).unwrap().len(), 2);

        let error = sessions::repository::delete(&conn, session_id).unwrap_err();
        assert!(matches!(error, AppError::ReferentialIntegrity(_)));
        assert!(error.user_message().contains("走行記録"));
    }

    #[test]
    fn test_dangling_session_reference() {
        let conn = open_in_memory().unwrap();
        let mut trip = CarTrip::new(10.0, "2024-04-05");
        trip.session_id = Some(77);
        assert!(matches!(
            create(&conn, &trip),
            Err(AppError::ReferentialIntegrity(_))
        ));
    }
}
