use axum::Json;
use axum::extract::{Multipart, State};
use validator::ValidationErrors;

use crate::error::Result;
use crate::middleware::Identity;
use crate::post::{PostRepository, can_modify};
use crate::router::posts::{PostForm, missing, require_fields};
use crate::{AppState, ServerError};

/// Handler to edit a post.
///
/// Existence is checked before ownership so an unknown post reads as
/// not found, never as forbidden.
pub async fn handler(
    State(state): State<AppState>,
    Identity(claims): Identity,
    multipart: Multipart,
) -> Result<Json<crate::post::Post>> {
    let form = PostForm::read(&state, multipart).await?;

    let id = form.id.filter(|id| !id.is_empty()).ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add("id", missing("id"));
        ServerError::Validation(errors)
    })?;
    let (title, summary, content) =
        require_fields(form.title, form.summary, form.content)?;

    let repository = PostRepository::new(state.db.pool.clone());
    let mut post = repository
        .find_by_id(&id)
        .await?
        .ok_or(ServerError::NotFound)?;

    if !can_modify(&claims.sub, &post) {
        return Err(ServerError::Forbidden);
    }

    post.title = title;
    post.summary = summary;
    post.content = content;
    // The cover survives unless a new asset was ingested this call.
    if let Some(cover) = form.cover {
        post.cover = Some(cover);
    }

    repository.update(&post).await?;

    tracing::info!(post_id = %post.id, "post updated");

    Ok(Json(post))
}
