use defattach_core::schema::{TENANTS_TABLE, TENANT_CONNECTION_COLUMN};

use super::super::{pg_err, PostgresDatabase};
use crate::sql::quote;
use crate::DbError;

impl PostgresDatabase {
    /// Non-blank connection strings registered in the `Tenants` table.
    pub(crate) async fn pg_tenant_connection_strings(&self) -> Result<Vec<String>, DbError> {
        let values: Vec<Option<String>> = sqlx::query_scalar(&format!(
            "SELECT {} FROM {}",
            quote(TENANT_CONNECTION_COLUMN),
            quote(TENANTS_TABLE)
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(values
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect())
    }
}
