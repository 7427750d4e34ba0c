use chrono::{DateTime, Utc};
use sqlx::Postgres;

use defattach_core::{ArticleSet, CreateDefaultAttachment, DefaultAttachment, PageRequest};

use super::super::{bind_values, pg_err, PostgresDatabase};
use crate::sql::{self, Dialect, InsertPlan, SqlValue};
use crate::DbError;

#[derive(sqlx::FromRow)]
struct DefaultAttachmentRow {
    #[sqlx(rename = "Id")]
    id: i64,
    #[sqlx(rename = "Active")]
    active: Option<bool>,
    #[sqlx(rename = "CreatedAt")]
    created_at: Option<DateTime<Utc>>,
    #[sqlx(rename = "CreatedBy")]
    created_by: Option<String>,
    #[sqlx(rename = "Name")]
    name: Option<String>,
    #[sqlx(rename = "ApplicantType")]
    applicant_type: Option<i32>,
    #[sqlx(rename = "Type")]
    kind: Option<String>,
    #[sqlx(rename = "IsRequired")]
    is_required: Option<bool>,
}

impl From<DefaultAttachmentRow> for DefaultAttachment {
    fn from(r: DefaultAttachmentRow) -> Self {
        DefaultAttachment {
            id: r.id,
            active: r.active,
            created_at: r.created_at.map(|t| t.fixed_offset()),
            created_by: r.created_by,
            name: r.name,
            applicant_type: r.applicant_type,
            kind: r.kind,
            is_required: r.is_required,
        }
    }
}

fn select_by_id() -> String {
    format!(
        "SELECT {} FROM {} WHERE \"Id\" = $1",
        sql::select_list(),
        sql::table()
    )
}

impl PostgresDatabase {
    pub(crate) async fn pg_add_attachment(
        &self,
        input: &CreateDefaultAttachment,
    ) -> Result<DefaultAttachment, DbError> {
        let plan = InsertPlan::for_input(input);
        let insert = plan.sql(Dialect::Postgres);
        let query = sqlx::query_scalar::<Postgres, i64>(&insert);
        let id = bind_values!(query, plan.values())
            .fetch_one(&self.pool)
            .await
            .map_err(pg_err)?;

        let row = sqlx::query_as::<_, DefaultAttachmentRow>(&select_by_id())
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(pg_err)?;

        Ok(row.into())
    }

    pub(crate) async fn pg_list_attachments(&self) -> Result<Vec<DefaultAttachment>, DbError> {
        let rows = sqlx::query_as::<_, DefaultAttachmentRow>(&format!(
            "SELECT {} FROM {} ORDER BY \"Id\" DESC",
            sql::select_list(),
            sql::table()
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    pub(crate) async fn pg_get_attachment(
        &self,
        id: i64,
    ) -> Result<Option<DefaultAttachment>, DbError> {
        let row = sqlx::query_as::<_, DefaultAttachmentRow>(&select_by_id())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(pg_err)?;

        Ok(row.map(|r| r.into()))
    }

    pub(crate) async fn pg_update_attachment(
        &self,
        attachment: &DefaultAttachment,
    ) -> Result<bool, DbError> {
        let update = sql::update_query(Dialect::Postgres);
        let values = sql::update_values(attachment);
        let result = bind_values!(sqlx::query::<Postgres>(&update), &values)
            .execute(&self.pool)
            .await
            .map_err(pg_err)?;

        Ok(result.rows_affected() > 0)
    }

    pub(crate) async fn pg_delete_attachment(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE \"Id\" = $1", sql::table()))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(pg_err)?;

        Ok(result.rows_affected() > 0)
    }

    pub(crate) async fn pg_count_attachments(&self) -> Result<i64, DbError> {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", sql::table()))
            .fetch_one(&self.pool)
            .await
            .map_err(pg_err)
    }

    pub(crate) async fn pg_search_attachments(
        &self,
        request: &PageRequest,
    ) -> Result<ArticleSet<DefaultAttachment>, DbError> {
        let term = request.search_term();
        let filter = sql::build_filter(Dialect::Postgres, term.as_ref());
        let count_sql = sql::count_query(&filter);
        let page_sql = sql::page_query(Dialect::Postgres, &filter, request.sort_key());

        let mut page_params = filter.params.clone();
        page_params.push(SqlValue::BigInt(request.limit()));
        page_params.push(SqlValue::BigInt(request.offset()));

        // Count and page read the same snapshot.
        let mut tx = self.pool.begin().await.map_err(pg_err)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(pg_err)?;

        let count_query = sqlx::query_scalar::<Postgres, i64>(&count_sql);
        let total_count = bind_values!(count_query, &filter.params)
            .fetch_one(&mut *tx)
            .await
            .map_err(pg_err)?;

        let page_query = sqlx::query_as::<Postgres, DefaultAttachmentRow>(&page_sql);
        let rows = bind_values!(page_query, &page_params)
            .fetch_all(&mut *tx)
            .await
            .map_err(pg_err)?;

        tx.commit().await.map_err(pg_err)?;

        Ok(ArticleSet::new(
            rows.into_iter().map(|r| r.into()).collect(),
            total_count,
        ))
    }
}
