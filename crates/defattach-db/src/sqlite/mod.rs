pub mod queries;

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::ToSqlOutput;
use rusqlite::{Connection, OpenFlags, ToSql};

use defattach_core::schema::ColumnDef;
use defattach_core::{ArticleSet, CreateDefaultAttachment, DefaultAttachment, PageRequest};

use crate::sql::SqlValue;
use crate::{Database, DbError};

/// Extension trait that converts `rusqlite::Result<T>` into `Result<T, DbError>`.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlValue::Text(v) => v.to_sql(),
            SqlValue::Bool(v) => v.to_sql(),
            SqlValue::Int(v) => v.to_sql(),
            SqlValue::BigInt(v) => v.to_sql(),
        }
    }
}

/// One SQLite database file (one tenant).
#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    /// Open the database at `path`, creating the file and its parent
    /// directories when missing. Only for bootstrapping a master database.
    pub fn open_path(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).to_db()?;
        Self::from_file_connection(conn)
    }

    /// Open an existing database file. A missing file is an error and is
    /// never created, so a stale tenant entry cannot turn into a new database.
    pub fn open_existing(path: &Path) -> Result<Self, DbError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| {
            DbError::Internal(format!("cannot open {}: {e}", path.display()))
        })?;
        Self::from_file_connection(conn)
    }

    fn from_file_connection(conn: Connection) -> Result<Self, DbError> {
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;",
        )
        .to_db()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().to_db()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }

    /// Run a sync method on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&SqliteDatabase) -> Result<T, DbError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
}

/// Map a `rusqlite::Error` into a `DbError::Internal`.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    DbError::Internal(e.to_string())
}

#[async_trait]
impl Database for SqliteDatabase {
    // -- Default attachments --
    async fn add_attachment(
        &self,
        input: &CreateDefaultAttachment,
    ) -> Result<DefaultAttachment, DbError> {
        let input = input.clone();
        self.blocking(move |db| db.add_attachment_sync(&input)).await
    }
    async fn list_attachments(&self) -> Result<Vec<DefaultAttachment>, DbError> {
        self.blocking(|db| db.list_attachments_sync()).await
    }
    async fn get_attachment(&self, id: i64) -> Result<Option<DefaultAttachment>, DbError> {
        self.blocking(move |db| db.get_attachment_sync(id)).await
    }
    async fn update_attachment(&self, attachment: &DefaultAttachment) -> Result<bool, DbError> {
        let attachment = attachment.clone();
        self.blocking(move |db| db.update_attachment_sync(&attachment))
            .await
    }
    async fn delete_attachment(&self, id: i64) -> Result<bool, DbError> {
        self.blocking(move |db| db.delete_attachment_sync(id)).await
    }
    async fn search_attachments(
        &self,
        request: &PageRequest,
    ) -> Result<ArticleSet<DefaultAttachment>, DbError> {
        let request = request.clone();
        self.blocking(move |db| db.search_attachments_sync(&request))
            .await
    }
    async fn count_attachments(&self) -> Result<i64, DbError> {
        self.blocking(|db| db.count_attachments_sync()).await
    }

    // -- Schema --
    async fn table_exists(&self) -> Result<bool, DbError> {
        self.blocking(|db| db.table_exists_sync()).await
    }
    async fn column_exists(&self, column: &str) -> Result<bool, DbError> {
        let column = column.to_string();
        self.blocking(move |db| db.column_exists_sync(&column)).await
    }
    async fn create_table(&self) -> Result<(), DbError> {
        self.blocking(|db| db.create_table_sync()).await
    }
    async fn add_column(&self, column: &ColumnDef) -> Result<(), DbError> {
        let column = *column;
        self.blocking(move |db| db.add_column_sync(&column)).await
    }
    async fn insert_seed_rows(&self, rows: &[CreateDefaultAttachment]) -> Result<u64, DbError> {
        let rows = rows.to_vec();
        self.blocking(move |db| db.insert_seed_rows_sync(&rows)).await
    }

    // -- Tenants --
    async fn tenant_connection_strings(&self) -> Result<Vec<String>, DbError> {
        self.blocking(|db| db.tenant_connection_strings_sync()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_starts_without_table() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        assert!(!db.table_exists_sync().unwrap());
    }

    #[test]
    fn open_path_creates_file_and_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("tenants").join("a.db");
        assert!(!db_path.exists());

        let _db = SqliteDatabase::open_path(&db_path).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn open_existing_refuses_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("typo.db");

        let err = SqliteDatabase::open_existing(&db_path).err().unwrap();
        assert!(matches!(err, DbError::Internal(_)));
        assert!(!db_path.exists());

        SqliteDatabase::open_path(&db_path).unwrap();
        let db = SqliteDatabase::open_existing(&db_path).unwrap();
        assert!(!db.table_exists_sync().unwrap());
    }

    #[test]
    fn sql_values_bind_nulls() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let (a, b, c): (Option<String>, Option<bool>, i64) = conn
                .query_row(
                    "SELECT ?1, ?2, ?3",
                    rusqlite::params_from_iter([
                        SqlValue::Text(None),
                        SqlValue::Bool(Some(true)),
                        SqlValue::BigInt(9),
                    ]),
                    |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
                )
                .to_db()?;
            assert_eq!(a, None);
            assert_eq!(b, Some(true));
            assert_eq!(c, 9);
            Ok(())
        })
        .unwrap();
    }
}
