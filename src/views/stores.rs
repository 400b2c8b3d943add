use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use uuid::Uuid;

use super::flash_message;
use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::{Store, TagCount};
use crate::routes::stores::{create_store, owned_store, update_store, StoreInput};
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "stores/index.html")]
struct IndexTemplate {
    notice: Option<&'static str>,
    stores: Vec<Store>,
}

#[derive(Template)]
#[template(path = "stores/show.html")]
struct ShowTemplate {
    store: Store,
}

#[derive(Template)]
#[template(path = "stores/tags.html")]
struct TagsTemplate {
    tags: Vec<TagCount>,
    active: Option<String>,
    stores: Vec<Store>,
}

#[derive(Template)]
#[template(path = "stores/edit.html")]
struct EditTemplate {
    heading: String,
    action: String,
    name: String,
    description: String,
    tags: String,
    error: Option<String>,
}

impl EditTemplate {
    fn add() -> Self {
        Self {
            heading: "Add Store".to_string(),
            action: "/add".to_string(),
            name: String::new(),
            description: String::new(),
            tags: String::new(),
            error: None,
        }
    }

    fn edit(store: &Store) -> Self {
        Self {
            heading: format!("Edit {}", store.name),
            action: format!("/stores/{}/edit", store.id),
            name: store.name.clone(),
            description: store.description.clone(),
            tags: store.tags.join(", "),
            error: None,
        }
    }

    /// Keep what the user typed when the form comes back with an error.
    fn rejected(self, form: StoreForm, error: String) -> Self {
        Self {
            name: form.name,
            description: form.description,
            tags: form.tags,
            error: Some(error),
            ..self
        }
    }

    fn page(&self) -> Html<String> {
        Html(self.render().unwrap_or_default())
    }
}

#[derive(Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

#[derive(Deserialize)]
pub struct StoreForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Comma separated.
    #[serde(default)]
    pub tags: String,
}

pub async fn index(
    State(state): State<SharedState>,
    Query(q): Query<NoticeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let stores = db::stores::list(&state.pool, None).await?;
    let template = IndexTemplate {
        notice: q.notice.as_deref().and_then(flash_message),
        stores,
    };
    Ok(Html(template.render().unwrap_or_default()))
}

pub async fn show(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let store = db::stores::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_string()))?;
    Ok(Html(ShowTemplate { store }.render().unwrap_or_default()))
}

pub async fn tags_page(State(state): State<SharedState>) -> Result<impl IntoResponse, AppError> {
    render_tags(&state, None).await
}

pub async fn tag_page(
    State(state): State<SharedState>,
    Path(tag): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    render_tags(&state, Some(tag)).await
}

async fn render_tags(state: &SharedState, active: Option<String>) -> Result<Html<String>, AppError> {
    let (tags, stores) = tokio::try_join!(
        db::stores::tag_counts(&state.pool),
        db::stores::list(&state.pool, active.as_deref()),
    )?;
    let template = TagsTemplate {
        tags,
        active,
        stores,
    };
    Ok(Html(template.render().unwrap_or_default()))
}

impl StoreForm {
    fn input(&self) -> StoreInput {
        StoreInput {
            name: self.name.clone(),
            description: self.description.clone(),
            tags: self.tags.split(',').map(str::to_string).collect(),
        }
    }
}

pub async fn add_page(_auth: AuthUser) -> impl IntoResponse {
    EditTemplate::add().page()
}

pub async fn add_submit(
    auth: AuthUser,
    State(state): State<SharedState>,
    Form(form): Form<StoreForm>,
) -> Result<Response, AppError> {
    match create_store(&state, &auth, form.input()).await {
        Ok(store) => Ok(Redirect::to(&format!("/store/{}", store.slug)).into_response()),
        Err(AppError::BadRequest(msg) | AppError::Conflict(msg)) => {
            Ok(EditTemplate::add().rejected(form, msg).page().into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn edit_page(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let store = owned_store(&state, &auth, id).await?;
    Ok(EditTemplate::edit(&store).page())
}

pub async fn edit_submit(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Form(form): Form<StoreForm>,
) -> Result<Response, AppError> {
    match update_store(&state, &auth, id, form.input()).await {
        Ok(store) => Ok(Redirect::to(&format!("/store/{}", store.slug)).into_response()),
        Err(AppError::BadRequest(msg) | AppError::Conflict(msg)) => {
            let store = owned_store(&state, &auth, id).await?;
            Ok(EditTemplate::edit(&store).rejected(form, msg).page().into_response())
        }
        Err(e) => Err(e),
    }
}
