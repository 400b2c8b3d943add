use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::{Store, TagCount};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct StoreInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct TagFilter {
    pub tag: Option<String>,
}

pub async fn list(
    State(state): State<SharedState>,
    Query(filter): Query<TagFilter>,
) -> Result<Json<Vec<Store>>, AppError> {
    let stores = db::stores::list(&state.pool, filter.tag.as_deref()).await?;
    Ok(Json(stores))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<StoreInput>,
) -> Result<Json<Store>, AppError> {
    let store = create_store(&state, &auth, req).await?;
    Ok(Json(store))
}

pub(crate) async fn create_store(
    state: &SharedState,
    auth: &AuthUser,
    req: StoreInput,
) -> Result<Store, AppError> {
    let name = validate_name(&req.name)?;
    let slug = available_slug(state, &name, None).await?;
    let tags = normalize_tags(&req.tags);

    let store = db::stores::create(
        &state.pool,
        auth.user_id,
        &name,
        &slug,
        req.description.trim(),
        &tags,
    )
    .await
    .map_err(slug_conflict)?;

    tracing::info!(store_id = %store.id, slug = %store.slug, "Store created");
    Ok(store)
}

pub async fn get(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<Store>, AppError> {
    let store = db::stores::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_string()))?;
    Ok(Json(store))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StoreInput>,
) -> Result<Json<Store>, AppError> {
    let store = update_store(&state, &auth, id, req).await?;
    Ok(Json(store))
}

/// Load a store for editing, refusing anyone but its owner.
pub(crate) async fn owned_store(
    state: &SharedState,
    auth: &AuthUser,
    id: Uuid,
) -> Result<Store, AppError> {
    let store = db::stores::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_string()))?;

    if store.owner_id != auth.user_id {
        return Err(AppError::Forbidden(
            "You must own a store in order to edit it".to_string(),
        ));
    }
    Ok(store)
}

pub(crate) async fn update_store(
    state: &SharedState,
    auth: &AuthUser,
    id: Uuid,
    req: StoreInput,
) -> Result<Store, AppError> {
    let existing = owned_store(state, auth, id).await?;

    let name = validate_name(&req.name)?;
    // Slug only moves when the name does
    let slug = if name == existing.name {
        existing.slug
    } else {
        available_slug(state, &name, Some(id)).await?
    };
    let tags = normalize_tags(&req.tags);

    let store = db::stores::update(&state.pool, id, &name, &slug, req.description.trim(), &tags)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Store not found".to_string()),
            other => slug_conflict(other),
        })?;

    tracing::info!(store_id = %store.id, "Store updated");
    Ok(store)
}

pub async fn tags(State(state): State<SharedState>) -> Result<Json<Vec<TagCount>>, AppError> {
    let tags = db::stores::tag_counts(&state.pool).await?;
    Ok(Json(tags))
}

fn validate_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Please enter a store name!".to_string()));
    }
    if slugify(name).is_empty() {
        return Err(AppError::BadRequest(
            "Store name must contain at least one letter or number".to_string(),
        ));
    }
    Ok(name.to_string())
}

async fn available_slug(
    state: &SharedState,
    name: &str,
    exclude_id: Option<Uuid>,
) -> Result<String, AppError> {
    let base = slugify(name);
    let taken = db::stores::slugs_with_base(&state.pool, &base, exclude_id).await?;
    Ok(unique_slug(&base, &taken))
}

fn slug_conflict(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("A store with this name was just created, try again".to_string())
        }
        _ => AppError::Database(e),
    }
}

pub(crate) fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// First of `base`, `base-2`, `base-3`, ... not already in `taken`.
pub(crate) fn unique_slug(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|s| s == base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

pub(crate) fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
