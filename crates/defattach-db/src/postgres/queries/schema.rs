use defattach_core::schema::{ColumnDef, TABLE_NAME};
use defattach_core::CreateDefaultAttachment;

use sqlx::Postgres;

use super::super::{bind_values, pg_err, PostgresDatabase};
use crate::sql::{self, Dialect, InsertPlan};
use crate::DbError;

impl PostgresDatabase {
    pub(crate) async fn pg_table_exists(&self) -> Result<bool, DbError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.tables
             WHERE table_schema = current_schema() AND table_name = $1",
        )
        .bind(TABLE_NAME)
        .fetch_one(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(count > 0)
    }

    /// Quoted identifiers are case-sensitive in Postgres, so the match is exact.
    pub(crate) async fn pg_column_exists(&self, column: &str) -> Result<bool, DbError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.columns
             WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2",
        )
        .bind(TABLE_NAME)
        .bind(column)
        .fetch_one(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(count > 0)
    }

    pub(crate) async fn pg_create_table(&self) -> Result<(), DbError> {
        sqlx::raw_sql(&sql::create_table(Dialect::Postgres))
            .execute(&self.pool)
            .await
            .map_err(pg_err)?;
        Ok(())
    }

    pub(crate) async fn pg_add_column(&self, column: &ColumnDef) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await.map_err(pg_err)?;
        for stmt in sql::add_column(Dialect::Postgres, column) {
            sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(&stmt))
                .await
                .map_err(pg_err)?;
        }
        tx.commit().await.map_err(pg_err)?;
        Ok(())
    }

    pub(crate) async fn pg_insert_seed_rows(
        &self,
        rows: &[CreateDefaultAttachment],
    ) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await.map_err(pg_err)?;
        for row in rows {
            let plan = InsertPlan::for_input(row);
            let insert = plan.sql(Dialect::Postgres);
            let query = sqlx::query_scalar::<Postgres, i64>(&insert);
            bind_values!(query, plan.values())
                .fetch_one(&mut *tx)
                .await
                .map_err(pg_err)?;
        }
        tx.commit().await.map_err(pg_err)?;
        Ok(rows.len() as u64)
    }
}
