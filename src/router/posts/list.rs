use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::Result;
use crate::post::{DEFAULT_LIST_LIMIT, PostRepository, PostWithAuthor};

/// Handler to list the newest posts.
pub async fn handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostWithAuthor>>> {
    let posts = PostRepository::new(state.db.pool.clone())
        .list(DEFAULT_LIST_LIMIT)
        .await?;

    Ok(Json(posts))
}
