use defattach_core::{ArticleSet, CreateDefaultAttachment, DefaultAttachment, PageRequest};

use crate::config::ConnectionResolver;
use crate::{Database, DbError};

/// Multi-tenant entry point for the attachment catalogue.
///
/// Each call takes an optional tenant connection string; `None` falls back to
/// the resolver's default. A connection is opened for the call and dropped
/// before it returns, on success and on error alike.
#[derive(Debug, Clone)]
pub struct DefaultAttachmentRepository {
    resolver: ConnectionResolver,
}

impl DefaultAttachmentRepository {
    pub fn new(resolver: ConnectionResolver) -> Self {
        Self { resolver }
    }

    async fn connect(&self, connection: Option<&str>) -> Result<Box<dyn Database>, DbError> {
        let connection = self.resolver.resolve(connection)?;
        crate::open(&connection).await
    }

    pub async fn add(
        &self,
        input: &CreateDefaultAttachment,
        connection: Option<&str>,
    ) -> Result<DefaultAttachment, DbError> {
        self.connect(connection).await?.add_attachment(input).await
    }

    pub async fn list(&self, connection: Option<&str>) -> Result<Vec<DefaultAttachment>, DbError> {
        self.connect(connection).await?.list_attachments().await
    }

    pub async fn get(
        &self,
        id: i64,
        connection: Option<&str>,
    ) -> Result<Option<DefaultAttachment>, DbError> {
        self.connect(connection).await?.get_attachment(id).await
    }

    /// Overwrite every writable field of the row with `attachment.id`.
    /// Returns `false` when no such row exists.
    pub async fn update(
        &self,
        attachment: &DefaultAttachment,
        connection: Option<&str>,
    ) -> Result<bool, DbError> {
        self.connect(connection)
            .await?
            .update_attachment(attachment)
            .await
    }

    pub async fn delete(&self, id: i64, connection: Option<&str>) -> Result<bool, DbError> {
        self.connect(connection).await?.delete_attachment(id).await
    }

    pub async fn search(
        &self,
        request: &PageRequest,
        connection: Option<&str>,
    ) -> Result<ArticleSet<DefaultAttachment>, DbError> {
        self.connect(connection)
            .await?
            .search_attachments(request)
            .await
    }
}
