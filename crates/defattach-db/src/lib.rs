pub mod config;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod provision;
pub mod repository;
pub(crate) mod sql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use defattach_core::schema::ColumnDef;
use defattach_core::{ArticleSet, CreateDefaultAttachment, DefaultAttachment, PageRequest};

pub use config::{redact, ConnectionResolver, Target};
pub use provision::{ProvisionReport, Provisioned, SchemaProvisioner, TableState, TenantOutcome};
pub use repository::DefaultAttachmentRepository;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Internal(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage operations against one database holding a `DefaultAttachments`
/// table. Each backend implements this once; tenants are separate databases,
/// so a handle is always bound to a single tenant.
#[async_trait]
pub trait Database: Send + Sync {
    // -- Default attachments --
    async fn add_attachment(
        &self,
        input: &CreateDefaultAttachment,
    ) -> Result<DefaultAttachment, DbError>;
    async fn list_attachments(&self) -> Result<Vec<DefaultAttachment>, DbError>;
    async fn get_attachment(&self, id: i64) -> Result<Option<DefaultAttachment>, DbError>;
    async fn update_attachment(&self, attachment: &DefaultAttachment) -> Result<bool, DbError>;
    async fn delete_attachment(&self, id: i64) -> Result<bool, DbError>;
    async fn search_attachments(
        &self,
        request: &PageRequest,
    ) -> Result<ArticleSet<DefaultAttachment>, DbError>;
    async fn count_attachments(&self) -> Result<i64, DbError>;

    // -- Schema --
    async fn table_exists(&self) -> Result<bool, DbError>;
    async fn column_exists(&self, column: &str) -> Result<bool, DbError>;
    async fn create_table(&self) -> Result<(), DbError>;
    async fn add_column(&self, column: &ColumnDef) -> Result<(), DbError>;
    async fn insert_seed_rows(&self, rows: &[CreateDefaultAttachment]) -> Result<u64, DbError>;

    // -- Tenants --
    async fn tenant_connection_strings(&self) -> Result<Vec<String>, DbError>;
}

/// Open a handle for `connection`, picking the backend from its shape.
/// A SQLite file must already exist.
pub async fn open(connection: &str) -> Result<Box<dyn Database>, DbError> {
    open_target(connection, false).await
}

/// Like [`open`], but a missing SQLite file is created. Used when
/// bootstrapping the master database.
pub async fn open_or_create(connection: &str) -> Result<Box<dyn Database>, DbError> {
    open_target(connection, true).await
}

async fn open_target(connection: &str, create: bool) -> Result<Box<dyn Database>, DbError> {
    match Target::parse(connection)? {
        Target::Sqlite(path) => open_sqlite(&path, create),
        Target::Postgres(url) => open_postgres(&url).await,
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(path: &str, create: bool) -> Result<Box<dyn Database>, DbError> {
    let path = std::path::Path::new(path);
    let db = if path.as_os_str() == ":memory:" {
        SqliteDatabase::open_in_memory()?
    } else if create {
        SqliteDatabase::open_path(path)?
    } else {
        SqliteDatabase::open_existing(path)?
    };
    Ok(Box::new(db))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_path: &str, _create: bool) -> Result<Box<dyn Database>, DbError> {
    Err(DbError::Config(
        "sqlite support is not compiled in (enable the `sqlite` feature)".into(),
    ))
}

#[cfg(feature = "postgres")]
async fn open_postgres(url: &str) -> Result<Box<dyn Database>, DbError> {
    Ok(Box::new(postgres::PostgresDatabase::connect(url).await?))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_url: &str) -> Result<Box<dyn Database>, DbError> {
    Err(DbError::Config(
        "postgres support is not compiled in (enable the `postgres` feature)".into(),
    ))
}
