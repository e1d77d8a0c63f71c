use super::models::Client;
use crate::shared::database::{
    begin_immediate, delete_row, ensure_affected, ensure_unique, fetch_all, fetch_one,
    store_error, Dependent,
};
use crate::shared::errors::AppResult;
use crate::shared::validation::Validate;
use rusqlite::{params, Connection, Row};

const INSERT_SQL: &str = "INSERT INTO clients (name) VALUES (?1)";
const SELECT_BY_ID_SQL: &str = "SELECT id, name FROM clients WHERE id = ?1";
const SELECT_ALL_SQL: &str = "SELECT id, name FROM clients ORDER BY id";
const UPDATE_SQL: &str = "UPDATE clients SET name = ?1 WHERE id = ?2";

/// クライアントを参照するテーブル
const DEPENDENTS: &[Dependent] = &[Dependent {
    table: "sessions",
    column: "client_id",
    relation: "セッション",
}];

fn map_row(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// クライアントを作成する
///
/// # 戻り値
/// 採番されたID、または失敗時はエラー（検証・一意制約・ストア）
pub fn create(conn: &Connection, client: &Client) -> AppResult<i64> {
    client.pre_insert_valid()?;

    let tx = begin_immediate(conn)?;
    ensure_unique(&tx, "clients", "name", &client.name, 0, "クライアント名")?;
    tx.execute(INSERT_SQL, params![client.name])
        .map_err(|e| store_error(INSERT_SQL, e))?;
    let id = tx.last_insert_rowid();
    tx.commit().map_err(|e| store_error("COMMIT", e))?;

    log::info!("クライアントを作成しました (ID: {id})");
    Ok(id)
}

/// IDでクライアントを取得する
pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Client> {
    fetch_one(conn, SELECT_BY_ID_SQL, id, map_row)
}

/// すべてのクライアントをID順に取得する
pub fn find_all(conn: &Connection) -> AppResult<Vec<Client>> {
    fetch_all(conn, SELECT_ALL_SQL, [], map_row)
}

/// クライアントを更新する
pub fn update(conn: &Connection, client: &Client) -> AppResult<()> {
    client.valid()?;

    let tx = begin_immediate(conn)?;
    ensure_unique(
        &tx,
        "clients",
        "name",
        &client.name,
        client.id,
        "クライアント名",
    )?;
    let affected = tx
        .execute(UPDATE_SQL, params![client.name, client.id])
        .map_err(|e| store_error(UPDATE_SQL, e))?;
    ensure_affected(affected, Client::LABEL, client.id)?;
    tx.commit().map_err(|e| store_error("COMMIT", e))?;

    log::info!("クライアントを更新しました (ID: {})", client.id);
    Ok(())
}

/// クライアントを削除する（セッションから参照されている場合は拒否）
pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    delete_row(conn, "clients", Client::LABEL, id, DEPENDENTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::database::open_in_memory;
    use crate::shared::errors::AppError;

    #[test]
    fn test_create_and_find() {
        let conn = open_in_memory().unwrap();
        let id = create(&conn, &Client::new("Acme")).unwrap();
        assert_eq!(id, 1);

        let found = find_by_id(&conn, id).unwrap();
        assert_eq!(
            found,
            Client {
                id,
                name: "Acme".to_string()
            }
        );
    }

    #[test]
    fn test_create_rejects_invalid_before_touching_store() {
        let conn = open_in_memory().unwrap();
        let error = create(&conn, &Client::new("")).unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));
        assert!(find_all(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_name_on_create_and_update() {
        let conn = open_in_memory().unwrap();
        create(&conn, &Client::new("Acme")).unwrap();
        let globex = create(&conn, &Client::new("Globex")).unwrap();

        assert!(matches!(
            create(&conn, &Client::new("Acme")),
            Err(AppError::UniquenessConflict(_))
        ));

        let renamed = Client {
            id: globex,
            name: "Acme".to_string(),
        };
        assert!(matches!(
            update(&conn, &renamed),
            Err(AppError::UniquenessConflict(_))
        ));

        // 自分自身の名前のままの更新は許可される
        let same = Client {
            id: globex,
            name: "Globex".to_string(),
        };
        assert!(update(&conn, &same).is_ok());
    }

    #[test]
    fn test_update_and_delete_missing_row() {
        let conn = open_in_memory().unwrap();
        let ghost = Client {
            id: 42,
            name: "Ghost".to_string(),
        };
        assert!(matches!(update(&conn, &ghost), Err(AppError::NotFound(_))));
        assert!(matches!(delete(&conn, 42), Err(AppError::NotFound(_))));
        assert!(matches!(find_by_id(&conn, 42), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_update_requires_id() {
        let conn = open_in_memory().unwrap();
        assert!(matches!(
            update(&conn, &Client::new("Acme")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_find_all_detects_corrupted_row() {
        let conn = open_in_memory().unwrap();
        create(&conn, &Client::new("Acme")).unwrap();
        conn.execute("INSERT INTO clients (name) VALUES ('')", [])
            .unwrap();

        assert!(matches!(find_all(&conn), Err(AppError::DataCorruption(_))));
        assert!(find_by_id(&conn, 1).is_ok());
    }
}
