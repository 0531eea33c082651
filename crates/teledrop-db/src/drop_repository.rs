//! PostgreSQL-backed [`DropRepository`] (§4.2, §10.3).
//!
//! Every mutating operation that touches both `drops` and `files` runs
//! inside a single transaction, so a drop row never exists without its
//! file row or vice versa (invariant 1, §3).

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, instrument};
use uuid::Uuid;

use teledrop_core::{Drop, DropRepository, Error, File, ListParams, ListSortKey, Result, SortOrder};

const SELECT_JOINED: &str = r#"
    SELECT
        d.id AS d_id, d.slug AS d_slug, d.title AS d_title, d.description AS d_description,
        d.passphrase_hash AS d_passphrase_hash, d.private AS d_private, d.favorite AS d_favorite,
        d.owner_id AS d_owner_id, d.created_at AS d_created_at, d.updated_at AS d_updated_at,
        f.id AS f_id, f.drop_id AS f_drop_id, f.name AS f_name, f.media_type AS f_media_type,
        f.size AS f_size, f.content_hash AS f_content_hash, f.storage_key AS f_storage_key,
        f.created_at AS f_created_at
    FROM drops d
    JOIN files f ON f.drop_id = d.id
"#;

fn row_to_drop(row: &sqlx::postgres::PgRow) -> std::result::Result<Drop, sqlx::Error> {
    let file = File {
        id: row.try_get("f_id")?,
        drop_id: row.try_get("f_drop_id")?,
        name: row.try_get("f_name")?,
        media_type: row.try_get("f_media_type")?,
        size: row.try_get("f_size")?,
        content_hash: row.try_get("f_content_hash")?,
        storage_key: row.try_get("f_storage_key")?,
        created_at: row.try_get("f_created_at")?,
    };
    Ok(Drop {
        id: row.try_get("d_id")?,
        slug: row.try_get("d_slug")?,
        title: row.try_get("d_title")?,
        description: row.try_get("d_description")?,
        passphrase_hash: row.try_get("d_passphrase_hash")?,
        private: row.try_get("d_private")?,
        favorite: row.try_get("d_favorite")?,
        owner_id: row.try_get("d_owner_id")?,
        created_at: row.try_get("d_created_at")?,
        updated_at: row.try_get("d_updated_at")?,
        file,
    })
}

/// PostgreSQL implementation of the Metadata Store.
pub struct PgDropRepository {
    pool: PgPool,
}

impl PgDropRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_in_tx(tx: &mut Transaction<'_, Postgres>, drop: &Drop) -> Result<()> {
        let insert_drop = sqlx::query(
            r#"
            INSERT INTO drops
                (id, slug, title, description, passphrase_hash, private, favorite, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(drop.id)
        .bind(&drop.slug)
        .bind(&drop.title)
        .bind(&drop.description)
        .bind(&drop.passphrase_hash)
        .bind(drop.private)
        .bind(drop.favorite)
        .bind(&drop.owner_id)
        .bind(drop.created_at)
        .bind(drop.updated_at)
        .execute(&mut **tx)
        .await;

        if let Err(sqlx::Error::Database(db_err)) = &insert_drop {
            if db_err.constraint() == Some("drops_slug_key") {
                return Err(Error::SlugTaken(drop.slug.clone()));
            }
        }
        insert_drop.map_err(Error::Database)?;

        sqlx::query(
            r#"
            INSERT INTO files
                (id, drop_id, name, media_type, size, content_hash, storage_key, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(drop.file.id)
        .bind(drop.file.drop_id)
        .bind(&drop.file.name)
        .bind(&drop.file.media_type)
        .bind(drop.file.size)
        .bind(&drop.file.content_hash)
        .bind(&drop.file.storage_key)
        .bind(drop.file.created_at)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }
}

#[async_trait]
impl DropRepository for PgDropRepository {
    #[instrument(skip(self, drop), fields(slug = %drop.slug))]
    async fn create(&self, drop: Drop) -> Result<Drop> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        Self::insert_in_tx(&mut tx, &drop).await?;
        tx.commit().await.map_err(Error::Database)?;
        debug!(drop_id = %drop.id, "db: drop created");
        Ok(drop)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Drop> {
        let query = format!("{SELECT_JOINED} WHERE d.slug = $1");
        let row = sqlx::query(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(slug.to_string()))?;
        row_to_drop(&row).map_err(Error::Database)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Drop> {
        let query = format!("{SELECT_JOINED} WHERE d.id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        row_to_drop(&row).map_err(Error::Database)
    }

    async fn list(&self, owner_id: &str, params: &ListParams) -> Result<Vec<Drop>> {
        let sort_column = match params.sort {
            ListSortKey::CreatedAt => "d.created_at",
            ListSortKey::Title => "d.title",
            ListSortKey::Size => "f.size",
        };
        let direction = match params.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let limit = params
            .limit
            .unwrap_or(teledrop_core::defaults::LIST_PAGE_SIZE)
            .clamp(1, teledrop_core::defaults::LIST_PAGE_SIZE_MAX);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "{SELECT_JOINED} WHERE d.owner_id = $1 ORDER BY {sort_column} {direction} LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query(&query)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.iter().map(row_to_drop).collect::<std::result::Result<_, _>>().map_err(Error::Database)
    }

    async fn update(&self, drop: Drop) -> Result<Drop> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            r#"
            UPDATE drops
            SET title = $2, description = $3, passphrase_hash = $4,
                private = $5, favorite = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(drop.id)
        .bind(&drop.title)
        .bind(&drop.description)
        .bind(&drop.passphrase_hash)
        .bind(drop.private)
        .bind(drop.favorite)
        .bind(drop.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        // Covers the Create finalization step (§4.4 step 6), where the
        // coordinator learns `size`/`content_hash` only after the upload has
        // streamed to completion and calls back into this same method.
        sqlx::query(
            r#"
            UPDATE files
            SET name = $2, media_type = $3, size = $4, content_hash = $5, storage_key = $6
            WHERE id = $1
            "#,
        )
        .bind(drop.file.id)
        .bind(&drop.file.name)
        .bind(&drop.file.media_type)
        .bind(drop.file.size)
        .bind(&drop.file.content_hash)
        .bind(&drop.file.storage_key)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(drop)
    }

    async fn delete(&self, id: Uuid) -> Result<Drop> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let query = format!("{SELECT_JOINED} WHERE d.id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let drop = row_to_drop(&row).map_err(Error::Database)?;

        // `files.drop_id` cascades, but deleting explicitly keeps the
        // transaction's intent legible and independent of the FK action.
        sqlx::query("DELETE FROM files WHERE drop_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        sqlx::query("DELETE FROM drops WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(drop)
    }
}
