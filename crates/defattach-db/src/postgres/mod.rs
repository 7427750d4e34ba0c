pub mod queries;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use defattach_core::schema::ColumnDef;
use defattach_core::{ArticleSet, CreateDefaultAttachment, DefaultAttachment, PageRequest};

use crate::{Database, DbError};

/// Map a sqlx::Error into a DbError::Internal.
pub(crate) fn pg_err(e: sqlx::Error) -> DbError {
    DbError::Internal(e.to_string())
}

/// Bind a slice of `SqlValue`s onto a query, in order.
macro_rules! bind_values {
    ($query:expr, $values:expr) => {{
        let mut query = $query;
        for value in $values {
            query = match value {
                $crate::sql::SqlValue::Text(v) => query.bind(v.clone()),
                $crate::sql::SqlValue::Bool(v) => query.bind(*v),
                $crate::sql::SqlValue::Int(v) => query.bind(*v),
                $crate::sql::SqlValue::BigInt(v) => query.bind(*v),
            };
        }
        query
    }};
}
pub(crate) use bind_values;

/// One Postgres database (one tenant).
#[derive(Clone)]
pub struct PostgresDatabase {
    pub(crate) pool: PgPool,
}

impl PostgresDatabase {
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(pg_err)?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    // -- Default attachments --
    async fn add_attachment(
        &self,
        input: &CreateDefaultAttachment,
    ) -> Result<DefaultAttachment, DbError> {
        self.pg_add_attachment(input).await
    }
    async fn list_attachments(&self) -> Result<Vec<DefaultAttachment>, DbError> {
        self.pg_list_attachments().await
    }
    async fn get_attachment(&self, id: i64) -> Result<Option<DefaultAttachment>, DbError> {
        self.pg_get_attachment(id).await
    }
    async fn update_attachment(&self, attachment: &DefaultAttachment) -> Result<bool, DbError> {
        self.pg_update_attachment(attachment).await
    }
    async fn delete_attachment(&self, id: i64) -> Result<bool, DbError> {
        self.pg_delete_attachment(id).await
    }
    async fn search_attachments(
        &self,
        request: &PageRequest,
    ) -> Result<ArticleSet<DefaultAttachment>, DbError> {
        self.pg_search_attachments(request).await
    }
    async fn count_attachments(&self) -> Result<i64, DbError> {
        self.pg_count_attachments().await
    }

    // -- Schema --
    async fn table_exists(&self) -> Result<bool, DbError> {
        self.pg_table_exists().await
    }
    async fn column_exists(&self, column: &str) -> Result<bool, DbError> {
        self.pg_column_exists(column).await
    }
    async fn create_table(&self) -> Result<(), DbError> {
        self.pg_create_table().await
    }
    async fn add_column(&self, column: &ColumnDef) -> Result<(), DbError> {
        self.pg_add_column(column).await
    }
    async fn insert_seed_rows(&self, rows: &[CreateDefaultAttachment]) -> Result<u64, DbError> {
        self.pg_insert_seed_rows(rows).await
    }

    // -- Tenants --
    async fn tenant_connection_strings(&self) -> Result<Vec<String>, DbError> {
        self.pg_tenant_connection_strings().await
    }
}
