use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
#[cfg(any(test, feature = "test-util"))]
use sqlx::sqlite::SqliteJournalMode;
use sqlx::{Pool, Sqlite};
use std::path::Path;

use tally_core::{AmountInput, DateInput, EntryId, StoredEntry};

use crate::memory::MemoryLedgerStore;
use crate::StorageError;

pub type DbPool = Pool<Sqlite>;

/// Fields of a row written by the entry forms.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone, Default)]
pub struct NewLedgerEntry {
    pub kind: String,
    pub amount: String,
    pub vendor: String,
    pub liquidation_date: String,
    pub competence: Option<String>,
    pub status: String,
    pub category: String,
    pub note: Option<String>,
}

/// Open (creating if needed) a ledger database and bring its schema up to date.
#[cfg(any(test, feature = "test-util"))]
pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Open an existing ledger database without write access.
pub async fn open_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
}

#[cfg(any(test, feature = "test-util"))]
async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ledger_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recorded_at TEXT NOT NULL DEFAULT (datetime('now')),
            kind TEXT NOT NULL,
            amount TEXT NOT NULL,
            vendor TEXT NOT NULL DEFAULT '',
            liquidation_date TEXT NOT NULL,
            competence TEXT,
            status TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT '',
            note TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_ledger_entries_date ON ledger_entries(liquidation_date)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(any(test, feature = "test-util"))]
pub async fn insert_entry(pool: &DbPool, entry: &NewLedgerEntry) -> Result<EntryId, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO ledger_entries (kind, amount, vendor, liquidation_date, competence, status, category, note) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(&entry.kind)
    .bind(&entry.amount)
    .bind(&entry.vendor)
    .bind(&entry.liquidation_date)
    .bind(&entry.competence)
    .bind(&entry.status)
    .bind(&entry.category)
    .bind(&entry.note)
    .execute(pool)
    .await?;

    Ok(EntryId(result.last_insert_rowid()))
}

pub async fn get_all_entries(pool: &DbPool) -> Result<Vec<StoredEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, String, String, String, String, String)>(
        "SELECT id, kind, liquidation_date, amount, vendor, category, status FROM ledger_entries ORDER BY id"
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| StoredEntry {
            id: EntryId(r.0),
            kind: r.1,
            liquidation_date: DateInput::Text(r.2),
            amount: AmountInput::Text(r.3),
            vendor: r.4,
            category: r.5,
            status: r.6,
        })
        .collect())
}

/// Read every row into memory so the synchronous pipeline can consume it.
pub async fn load_snapshot(pool: &DbPool) -> Result<MemoryLedgerStore, StorageError> {
    let rows = get_all_entries(pool).await?;
    tracing::debug!("Loaded {} ledger rows from database", rows.len());
    Ok(MemoryLedgerStore::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::LedgerStore;

    fn expense(amount: &str, date: &str, vendor: &str) -> NewLedgerEntry {
        NewLedgerEntry {
            kind: "Despesa".into(),
            amount: amount.into(),
            vendor: vendor.into(),
            liquidation_date: date.into(),
            competence: Some("2026-01".into()),
            status: "Pago".into(),
            category: "Mercadoria".into(),
            note: None,
        }
    }

    #[tokio::test]
    async fn insert_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("ledger.db")).await.unwrap();

        let a = insert_entry(&pool, &expense("200.00", "2026-01-10", "Atacadão")).await.unwrap();
        let b = insert_entry(&pool, &expense("35,90", "2026-01-11", "Posto Shell")).await.unwrap();
        assert!(b.0 > a.0);

        let rows = get_all_entries(&pool).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, a);
        assert_eq!(rows[0].vendor, "Atacadão");
        assert_eq!(rows[1].amount, AmountInput::Text("35,90".into()));
        assert_eq!(rows[1].liquidation_date, DateInput::Text("2026-01-11".into()));
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        {
            let pool = create_db(&path).await.unwrap();
            insert_entry(&pool, &expense("1.00", "2026-01-01", "X")).await.unwrap();
            pool.close().await;
        }
        let pool = create_db(&path).await.unwrap();
        assert_eq!(get_all_entries(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn snapshot_serves_rows_synchronously() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let pool = create_db(&path).await.unwrap();
        insert_entry(&pool, &expense("200.00", "2026-01-10", "Atacadão")).await.unwrap();
        pool.close().await;

        let readonly = open_db(&path).await.unwrap();
        let snapshot = load_snapshot(&readonly).await.unwrap();
        let rows = snapshot.read_all_entries().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, "Despesa");
    }

    #[tokio::test]
    async fn reconciliation_handle_cannot_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        create_db(&path).await.unwrap().close().await;

        let readonly = open_db(&path).await.unwrap();
        assert!(insert_entry(&readonly, &expense("1.00", "2026-01-01", "X")).await.is_err());
        assert!(get_all_entries(&readonly).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_db_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_db(&dir.path().join("nope.db")).await.is_err());
    }
}
