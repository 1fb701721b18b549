use axum::Json;
use axum::extract::{Multipart, State};

use crate::AppState;
use crate::error::Result;
use crate::middleware::Identity;
use crate::post::{Post, PostRepository};
use crate::router::posts::{PostForm, require_fields};

/// Handler to publish a post.
pub async fn handler(
    State(state): State<AppState>,
    Identity(claims): Identity,
    multipart: Multipart,
) -> Result<Json<Post>> {
    let form = PostForm::read(&state, multipart).await?;
    let (title, summary, content) =
        require_fields(form.title, form.summary, form.content)?;

    let post = Post::new(&claims.sub, title, summary, content, form.cover);
    PostRepository::new(state.db.pool.clone()).insert(&post).await?;

    tracing::info!(post_id = %post.id, author_id = %post.author_id, "post created");

    Ok(Json(post))
}
