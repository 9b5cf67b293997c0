//! Module migration runner.
//!
//! Applied migrations are recorded in `schema_migrations` keyed by
//! `(module, id)`; anything already recorded is skipped, so running the
//! same set twice is a no-op.

use bookshelf_kernel::Migration;
use rusqlite::{params, Connection};

use crate::error::DbError;
use crate::session::Database;

const LEDGER_DDL: &str = "
    CREATE TABLE IF NOT EXISTS schema_migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )";

/// Apply every pending migration in the given order.
///
/// Each migration runs in its own transaction together with its ledger
/// entry. Returns how many were applied.
pub async fn apply(db: &Database, migrations: Vec<(String, Migration)>) -> Result<usize, DbError> {
    let applied = db
        .with_session(move |conn| apply_pending(conn, &migrations))
        .await?;
    tracing::info!(applied, "database migrations complete");
    Ok(applied)
}

fn apply_pending(conn: &mut Connection, migrations: &[(String, Migration)]) -> Result<usize, DbError> {
    conn.execute_batch(LEDGER_DDL)?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let recorded: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM schema_migrations WHERE module = ?1 AND id = ?2)",
            params![module, migration.id],
            |row| row.get(0),
        )?;
        if recorded {
            tracing::debug!(module = %module, migration = migration.id, "migration already applied");
            continue;
        }

        let tx = conn.transaction()?;
        tx.execute_batch(migration.up)
            .and_then(|_| {
                tx.execute(
                    "INSERT INTO schema_migrations (module, id) VALUES (?1, ?2)",
                    params![module, migration.id],
                )
            })
            .map_err(|source| DbError::Migration {
                module: module.clone(),
                id: migration.id.to_string(),
                source,
            })?;
        tx.commit()?;

        tracing::info!(module = %module, migration = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migration(id: &'static str, up: &'static str) -> (String, Migration) {
        ("books".to_string(), Migration { id, up })
    }

    fn temp_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("migrate.db").to_str().unwrap()).unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn applies_pending_migrations_once() {
        let (_dir, db) = temp_db();
        let set = vec![
            migration("001_init", "CREATE TABLE shelf (id INTEGER PRIMARY KEY);"),
            migration("002_seed", "INSERT INTO shelf (id) VALUES (1);"),
        ];

        assert_eq!(apply(&db, set.clone()).await.unwrap(), 2);
        assert_eq!(apply(&db, set).await.unwrap(), 0);

        let rows = db
            .with_session(|conn| conn.query_row("SELECT COUNT(*) FROM shelf", [], |row| row.get::<_, i64>(0)))
            .await
            .unwrap();
        assert_eq!(rows, 1, "seed migration must not run twice");
    }

    #[tokio::test]
    async fn failed_migration_is_rolled_back_and_not_recorded() {
        let (_dir, db) = temp_db();
        let set = vec![
            migration("001_init", "CREATE TABLE shelf (id INTEGER PRIMARY KEY);"),
            migration(
                "002_broken",
                "CREATE TABLE partial (id INTEGER); INSERT INTO nowhere VALUES (1);",
            ),
        ];

        let err = apply(&db, set).await.unwrap_err();
        match err {
            DbError::Migration { module, id, .. } => {
                assert_eq!(module, "books");
                assert_eq!(id, "002_broken");
            }
            other => panic!("expected migration error, got {other:?}"),
        }

        let (ledger, partial) = db
            .with_session(|conn| -> rusqlite::Result<(i64, i64)> {
                let ledger: i64 = conn.query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))?;
                let partial: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE name = 'partial'",
                    [],
                    |row| row.get(0),
                )?;
                Ok((ledger, partial))
            })
            .await
            .unwrap();
        assert_eq!(ledger, 1);
        assert_eq!(partial, 0);
    }
}
