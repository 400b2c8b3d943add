use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Store, TagCount};

pub async fn list(pool: &PgPool, tag: Option<&str>) -> Result<Vec<Store>, sqlx::Error> {
    sqlx::query_as::<_, Store>(
        "SELECT * FROM stores
         WHERE $1::text IS NULL OR $1 = ANY(tags)
         ORDER BY created_at DESC",
    )
    .bind(tag)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    owner_id: Uuid,
    name: &str,
    slug: &str,
    description: &str,
    tags: &[String],
) -> Result<Store, sqlx::Error> {
    sqlx::query_as::<_, Store>(
        "INSERT INTO stores (owner_id, name, slug, description, tags)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(owner_id)
    .bind(name)
    .bind(slug)
    .bind(description)
    .bind(tags)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Store>, sqlx::Error> {
    sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Store>, sqlx::Error> {
    sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    slug: &str,
    description: &str,
    tags: &[String],
) -> Result<Store, sqlx::Error> {
    sqlx::query_as::<_, Store>(
        "UPDATE stores SET name = $2, slug = $3, description = $4, tags = $5, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(slug)
    .bind(description)
    .bind(tags)
    .fetch_one(pool)
    .await
}

/// Slugs equal to `base` or of the form `base-N`, ignoring the store being edited.
pub async fn slugs_with_base(
    pool: &PgPool,
    base: &str,
    exclude_id: Option<Uuid>,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT slug FROM stores
         WHERE (slug = $1 OR slug LIKE $1 || '-%')
           AND ($2::uuid IS NULL OR id <> $2)",
    )
    .bind(base)
    .bind(exclude_id)
    .fetch_all(pool)
    .await
}

pub async fn tag_counts(pool: &PgPool) -> Result<Vec<TagCount>, sqlx::Error> {
    sqlx::query_as::<_, TagCount>(
        "SELECT tag, COUNT(*) AS count
         FROM stores, unnest(tags) AS tag
         GROUP BY tag
         ORDER BY count DESC, tag ASC",
    )
    .fetch_all(pool)
    .await
}
