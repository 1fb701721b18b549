use axum::Json;
use axum::extract::{Path, State};

use crate::error::Result;
use crate::post::{PostRepository, PostWithAuthor};
use crate::{AppState, ServerError};

/// Handler to read a single post.
pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostWithAuthor>> {
    let post = PostRepository::new(state.db.pool.clone())
        .find_with_author(&id)
        .await?
        .ok_or(ServerError::NotFound)?;

    Ok(Json(post))
}
