use defattach_core::schema::{TENANTS_TABLE, TENANT_CONNECTION_COLUMN};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::sql::quote;
use crate::DbError;

impl SqliteDatabase {
    /// Non-blank connection strings registered in the `Tenants` table.
    pub fn tenant_connection_strings_sync(&self) -> Result<Vec<String>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM {}",
                    quote(TENANT_CONNECTION_COLUMN),
                    quote(TENANTS_TABLE)
                ))
                .to_db()?;
            let values = stmt
                .query_map([], |r| r.get::<_, Option<String>>(0))
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(values
                .into_iter()
                .flatten()
                .filter(|s| !s.trim().is_empty())
                .collect())
        })
    }
}
