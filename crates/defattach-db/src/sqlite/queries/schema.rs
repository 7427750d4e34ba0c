use rusqlite::params;

use defattach_core::schema::{ColumnDef, TABLE_NAME};
use defattach_core::CreateDefaultAttachment;

use super::super::{SqliteDatabase, SqliteResultExt};
use super::default_attachments::insert_row;
use crate::sql::{self, Dialect};
use crate::DbError;

impl SqliteDatabase {
    pub fn table_exists_sync(&self) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    params![TABLE_NAME],
                    |r| r.get(0),
                )
                .to_db()?;
            Ok(count > 0)
        })
    }

    /// SQLite identifiers are case-insensitive, so the match is too.
    pub fn column_exists_sync(&self, column: &str) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2 COLLATE NOCASE",
                    params![TABLE_NAME, column],
                    |r| r.get(0),
                )
                .to_db()?;
            Ok(count > 0)
        })
    }

    pub fn create_table_sync(&self) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute_batch(&sql::create_table(Dialect::Sqlite))
                .to_db()
        })
    }

    pub fn add_column_sync(&self, column: &ColumnDef) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction().to_db()?;
            for stmt in sql::add_column(Dialect::Sqlite, column) {
                tx.execute_batch(&stmt).to_db()?;
            }
            tx.commit().to_db()
        })
    }

    pub fn insert_seed_rows_sync(&self, rows: &[CreateDefaultAttachment]) -> Result<u64, DbError> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction().to_db()?;
            for row in rows {
                insert_row(&tx, row)?;
            }
            tx.commit().to_db()?;
            Ok(rows.len() as u64)
        })
    }
}
