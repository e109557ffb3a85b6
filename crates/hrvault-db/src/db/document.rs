//! Document metadata repository: the documents table.
//!
//! Every read and write is scoped to the tenant captured at upload; a row
//! belonging to another tenant behaves as if it did not exist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hrvault_core::models::{
    Document, DocumentFilter, NewDocument, Owner, OwnerKind, Pagination, TenantContext,
};
use hrvault_core::{AppError, ProviderKind};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const DOCUMENT_COLUMNS: &str = "id, owner_kind, owner_id, document_type_id, organization_id, \
     company_id, location_id, provider, storage_key, original_name, display_name, file_size, \
     extension, mime_type, created_at, updated_at";

// $1/$2 are the tenant scope; $3..$8 the optional filters.
const SCOPED_FILTER: &str = r#"
    organization_id IS NOT DISTINCT FROM $1
    AND company_id IS NOT DISTINCT FROM $2
    AND ($3::owner_kind IS NULL OR owner_kind = $3)
    AND ($4::uuid IS NULL OR owner_id = $4)
    AND ($5::uuid IS NULL OR document_type_id = $5)
    AND ($6::provider_kind IS NULL OR provider = $6)
    AND ($7::timestamptz IS NULL OR created_at >= $7)
    AND ($8::timestamptz IS NULL OR created_at <= $8)
"#;

/// Persistence for document metadata.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, document: NewDocument) -> Result<Document, AppError>;

    async fn get_scoped(
        &self,
        id: Uuid,
        scope: &TenantContext,
    ) -> Result<Option<Document>, AppError>;

    /// One page of matching documents, newest first, plus the total count.
    async fn list(
        &self,
        scope: &TenantContext,
        filter: &DocumentFilter,
        page: Pagination,
    ) -> Result<(Vec<Document>, i64), AppError>;

    /// Change display metadata only. Returns None when the row is not in scope.
    async fn update_metadata(
        &self,
        id: Uuid,
        scope: &TenantContext,
        display_name: Option<String>,
        document_type_id: Option<Uuid>,
    ) -> Result<Option<Document>, AppError>;

    /// Returns false when no row in scope existed.
    async fn delete(&self, id: Uuid, scope: &TenantContext) -> Result<bool, AppError>;

    async fn count_for_location(&self, location_id: Uuid) -> Result<i64, AppError>;
}

/// Row type for documents table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub owner_kind: OwnerKind,
    pub owner_id: Uuid,
    pub document_type_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub location_id: Uuid,
    pub provider: ProviderKind,
    pub storage_key: String,
    pub original_name: String,
    pub display_name: String,
    pub file_size: i64,
    pub extension: Option<String>,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRow {
    pub fn to_document(self) -> Document {
        Document {
            id: self.id,
            owner: Owner::new(self.owner_kind, self.owner_id),
            document_type_id: self.document_type_id,
            organization_id: self.organization_id,
            company_id: self.company_id,
            location_id: self.location_id,
            provider: self.provider,
            storage_key: self.storage_key,
            original_name: self.original_name,
            display_name: self.display_name,
            file_size: self.file_size,
            extension: self.extension,
            mime_type: self.mime_type,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for documents table.
#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    #[tracing::instrument(skip(self, document), fields(db.table = "documents", db.operation = "insert", db.record_id = %document.id))]
    async fn insert(&self, document: NewDocument) -> Result<Document, AppError> {
        let start = std::time::Instant::now();

        let row = sqlx::query_as::<Postgres, DocumentRow>(&format!(
            r#"
            INSERT INTO documents
                (id, owner_kind, owner_id, document_type_id, organization_id, company_id,
                 location_id, provider, storage_key, original_name, display_name, file_size,
                 extension, mime_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(document.id)
        .bind(document.owner.kind)
        .bind(document.owner.id)
        .bind(document.document_type_id)
        .bind(document.organization_id)
        .bind(document.company_id)
        .bind(document.location_id)
        .bind(document.provider)
        .bind(&document.storage_key)
        .bind(&document.original_name)
        .bind(&document.display_name)
        .bind(document.file_size)
        .bind(&document.extension)
        .bind(&document.mime_type)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(
            document_id = %document.id,
            location_id = %document.location_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Document row inserted"
        );

        Ok(row.to_document())
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.record_id = %id))]
    async fn get_scoped(
        &self,
        id: Uuid,
        scope: &TenantContext,
    ) -> Result<Option<Document>, AppError> {
        let row = sqlx::query_as::<Postgres, DocumentRow>(&format!(
            r#"
            SELECT {} FROM documents
            WHERE id = $1
              AND organization_id IS NOT DISTINCT FROM $2
              AND company_id IS NOT DISTINCT FROM $3
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .bind(scope.organization_id)
        .bind(scope.company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DocumentRow::to_document))
    }

    #[tracing::instrument(skip(self, filter), fields(db.table = "documents", page = page.page, per_page = page.per_page))]
    async fn list(
        &self,
        scope: &TenantContext,
        filter: &DocumentFilter,
        page: Pagination,
    ) -> Result<(Vec<Document>, i64), AppError> {
        let start = std::time::Instant::now();

        let rows = sqlx::query_as::<Postgres, DocumentRow>(&format!(
            "SELECT {} FROM documents WHERE {} ORDER BY created_at DESC, id DESC LIMIT $9 OFFSET $10",
            DOCUMENT_COLUMNS, SCOPED_FILTER
        ))
        .bind(scope.organization_id)
        .bind(scope.company_id)
        .bind(filter.owner_kind)
        .bind(filter.owner_id)
        .bind(filter.document_type_id)
        .bind(filter.provider)
        .bind(filter.created_from)
        .bind(filter.created_to)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar::<Postgres, i64>(&format!(
            "SELECT COUNT(*) FROM documents WHERE {}",
            SCOPED_FILTER
        ))
        .bind(scope.organization_id)
        .bind(scope.company_id)
        .bind(filter.owner_kind)
        .bind(filter.owner_id)
        .bind(filter.document_type_id)
        .bind(filter.provider)
        .bind(filter.created_from)
        .bind(filter.created_to)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(
            count = rows.len(),
            total,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Documents listed"
        );

        Ok((rows.into_iter().map(DocumentRow::to_document).collect(), total))
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "update", db.record_id = %id))]
    async fn update_metadata(
        &self,
        id: Uuid,
        scope: &TenantContext,
        display_name: Option<String>,
        document_type_id: Option<Uuid>,
    ) -> Result<Option<Document>, AppError> {
        let row = sqlx::query_as::<Postgres, DocumentRow>(&format!(
            r#"
            UPDATE documents
            SET display_name = COALESCE($4, display_name),
                document_type_id = COALESCE($5, document_type_id),
                updated_at = NOW()
            WHERE id = $1
              AND organization_id IS NOT DISTINCT FROM $2
              AND company_id IS NOT DISTINCT FROM $3
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .bind(scope.organization_id)
        .bind(scope.company_id)
        .bind(display_name)
        .bind(document_type_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DocumentRow::to_document))
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid, scope: &TenantContext) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE id = $1
              AND organization_id IS NOT DISTINCT FROM $2
              AND company_id IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(id)
        .bind(scope.organization_id)
        .bind(scope.company_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", location_id = %location_id))]
    async fn count_for_location(&self, location_id: Uuid) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM documents WHERE location_id = $1")
                .bind(location_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
