use async_trait::async_trait;
use chrono::Utc;
use common::RecordId;
use evidence::RecordStatus;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::{IndexError, Result};
use crate::index::MetadataIndex;
use crate::rows::{EvidenceCommit, IndexRow, ParentRecord};

/// PostgreSQL-backed metadata index implementation.
#[derive(Clone)]
pub struct PostgresMetadataIndex {
    pool: PgPool,
}

impl PostgresMetadataIndex {
    /// Creates a new PostgreSQL metadata index.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_record(row: PgRow) -> Result<ParentRecord> {
        let status: String = row.try_get("status")?;
        Ok(ParentRecord {
            id: RecordId::from_uuid(row.try_get::<Uuid, _>("id")?),
            business_key: row.try_get("business_key")?,
            status: status.parse().map_err(IndexError::Decode)?,
        })
    }

    fn row_to_index_row(row: PgRow) -> Result<IndexRow> {
        let kind: String = row.try_get("kind")?;
        Ok(IndexRow {
            id: row.try_get("id")?,
            record_id: RecordId::from_uuid(row.try_get::<Uuid, _>("record_id")?),
            kind: kind.parse().map_err(IndexError::Decode)?,
            name: row.try_get("name")?,
            extension: row.try_get("extension")?,
            size_bytes: row.try_get("size_bytes")?,
            description: row.try_get("description")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl MetadataIndex for PostgresMetadataIndex {
    async fn create_record(&self, business_key: &str) -> Result<ParentRecord> {
        let record = ParentRecord {
            id: RecordId::new(),
            business_key: business_key.to_string(),
            status: RecordStatus::AwaitingEvidence,
        };

        sqlx::query(
            r#"
            INSERT INTO records (id, business_key, status)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.business_key)
        .bind(record.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("records_business_key_key")
            {
                return IndexError::DuplicateBusinessKey(business_key.to_string());
            }
            IndexError::Database(e)
        })?;

        Ok(record)
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<ParentRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, business_key, status
            FROM records
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn list_artifacts(&self, record_id: RecordId) -> Result<Vec<IndexRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, record_id, kind, name, extension, size_bytes,
                   description, created_by, created_at
            FROM evidence_index
            WHERE record_id = $1
            ORDER BY created_at ASC, name ASC
            "#,
        )
        .bind(record_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_index_row).collect()
    }

    #[tracing::instrument(
        skip(self, commit),
        fields(record_id = %commit.record_id, rows = commit.rows.len())
    )]
    async fn commit_evidence(&self, commit: EvidenceCommit) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Re-validate the parent under lock; this is the serialization
        // point for concurrent duplicate submissions.
        let row = sqlx::query(
            r#"
            SELECT id, business_key, status
            FROM records
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(commit.record_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let record = row
            .map(Self::row_to_record)
            .transpose()?
            .ok_or(IndexError::RecordNotFound(commit.record_id))?;

        if !record.status.accepts_evidence() {
            return Err(IndexError::RecordNotAccepting {
                record_id: commit.record_id,
                status: record.status,
            });
        }

        let now = Utc::now();
        for new_row in &commit.rows {
            let kind = new_row.kind;
            sqlx::query(
                r#"
                INSERT INTO evidence_index
                    (id, record_id, kind, name, extension, size_bytes,
                     description, created_by, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(commit.record_id.as_uuid())
            .bind(kind.as_str())
            .bind(&new_row.name)
            .bind(&new_row.extension)
            .bind(new_row.size_bytes)
            .bind(&new_row.description)
            .bind(&new_row.created_by)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.constraint() == Some("evidence_index_record_kind_key")
                {
                    return IndexError::DuplicateArtifact {
                        record_id: commit.record_id,
                        kind,
                    };
                }
                IndexError::Database(e)
            })?;
        }

        sqlx::query(
            r#"
            UPDATE records
            SET status = $2
            WHERE id = $1
            "#,
        )
        .bind(commit.record_id.as_uuid())
        .bind(commit.new_status.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO audit_log (id, record_id, action, actor, detail, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(commit.record_id.as_uuid())
        .bind(&commit.audit.action)
        .bind(&commit.audit.actor)
        .bind(&commit.audit.detail)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

impl std::fmt::Debug for PostgresMetadataIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresMetadataIndex").finish_non_exhaustive()
    }
}
