use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use defattach_core::{ArticleSet, CreateDefaultAttachment, DefaultAttachment, PageRequest};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::sql::{self, Dialect, InsertPlan, SqlValue};
use crate::DbError;

pub(crate) fn row_to_attachment(row: &Row) -> rusqlite::Result<DefaultAttachment> {
    Ok(DefaultAttachment {
        id: row.get("Id")?,
        active: row.get("Active")?,
        created_at: row.get("CreatedAt")?,
        created_by: row.get("CreatedBy")?,
        name: row.get("Name")?,
        applicant_type: row.get("ApplicantType")?,
        kind: row.get("Type")?,
        is_required: row.get("IsRequired")?,
    })
}

fn select_by_id() -> String {
    format!(
        "SELECT {} FROM {} WHERE \"Id\" = ?1",
        sql::select_list(),
        sql::table()
    )
}

/// Insert one row through its column plan and return the generated id.
pub(crate) fn insert_row(
    conn: &rusqlite::Connection,
    input: &CreateDefaultAttachment,
) -> Result<i64, DbError> {
    let plan = InsertPlan::for_input(input);
    conn.query_row(
        &plan.sql(Dialect::Sqlite),
        params_from_iter(plan.values()),
        |r| r.get(0),
    )
    .to_db()
}

impl SqliteDatabase {
    pub fn add_attachment_sync(
        &self,
        input: &CreateDefaultAttachment,
    ) -> Result<DefaultAttachment, DbError> {
        self.with_conn(|conn| {
            let id = insert_row(conn, input)?;
            conn.query_row(&select_by_id(), params![id], row_to_attachment)
                .to_db()
        })
    }

    pub fn list_attachments_sync(&self) -> Result<Vec<DefaultAttachment>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM {} ORDER BY \"Id\" DESC",
                    sql::select_list(),
                    sql::table()
                ))
                .to_db()?;
            let rows = stmt
                .query_map([], row_to_attachment)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(rows)
        })
    }

    pub fn get_attachment_sync(&self, id: i64) -> Result<Option<DefaultAttachment>, DbError> {
        self.with_conn(|conn| {
            conn.query_row(&select_by_id(), params![id], row_to_attachment)
                .optional()
                .to_db()
        })
    }

    pub fn update_attachment_sync(&self, attachment: &DefaultAttachment) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    &sql::update_query(Dialect::Sqlite),
                    params_from_iter(sql::update_values(attachment)),
                )
                .to_db()?;
            Ok(changed > 0)
        })
    }

    pub fn delete_attachment_sync(&self, id: i64) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    &format!("DELETE FROM {} WHERE \"Id\" = ?1", sql::table()),
                    params![id],
                )
                .to_db()?;
            Ok(changed > 0)
        })
    }

    pub fn count_attachments_sync(&self) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", sql::table()), [], |r| {
                r.get(0)
            })
            .to_db()
        })
    }

    pub fn search_attachments_sync(
        &self,
        request: &PageRequest,
    ) -> Result<ArticleSet<DefaultAttachment>, DbError> {
        let term = request.search_term();
        let filter = sql::build_filter(Dialect::Sqlite, term.as_ref());
        let key = request.sort_key();

        self.with_conn(|conn| {
            // Count and page read the same snapshot.
            let tx = conn.unchecked_transaction().to_db()?;

            let total_count: i64 = tx
                .query_row(
                    &sql::count_query(&filter),
                    params_from_iter(filter.params.clone()),
                    |r| r.get(0),
                )
                .to_db()?;

            let mut page_params = filter.params.clone();
            page_params.push(SqlValue::BigInt(request.limit()));
            page_params.push(SqlValue::BigInt(request.offset()));

            let items = {
                let mut stmt = tx
                    .prepare(&sql::page_query(Dialect::Sqlite, &filter, key))
                    .to_db()?;
                let rows = stmt
                    .query_map(params_from_iter(page_params), row_to_attachment)
                    .to_db()?
                    .collect::<Result<Vec<_>, _>>()
                    .to_db()?;
                rows
            };

            tx.commit().to_db()?;
            Ok(ArticleSet::new(items, total_count))
        })
    }
}
