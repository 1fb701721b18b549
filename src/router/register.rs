use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::user::{User, UserRepository};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(
        length(min = 2, max = 32),
        custom(
            function = "crate::router::validate_username",
            message = "Username must be alphanumeric."
        )
    )]
    pub username: String,
    #[validate(length(
        min = 8,
        max = 255,
        message = "Password must contain at least 8 characters."
    ))]
    password: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    pub username: String,
}

/// Handler to create user.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<Json<Response>> {
    let user =
        User::new(&body.username, state.crypto.hash_password(&body.password)?);

    UserRepository::new(state.db.pool.clone()).insert(&user).await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(Json(Response {
        id: user.id,
        username: user.username,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::SqlitePool;

    use super::*;
    use crate::router::support;
    use crate::{app, make_request};

    #[sqlx::test]
    async fn test_register_handler(pool: SqlitePool) {
        let app = app(support::state(pool));

        let response = make_request(
            app,
            Method::POST,
            "/register",
            json!({ "username": "alice", "password": "longenough" })
                .to_string(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        // The digest never leaves the server.
        assert!(!String::from_utf8_lossy(&body).contains("password"));

        let body: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.username, "alice");
        assert!(!body.id.is_empty());
    }

    #[sqlx::test]
    async fn test_register_duplicate_username(pool: SqlitePool) {
        let app = app(support::state(pool));

        support::register(app.clone(), "alice", "longenough").await;

        let response = make_request(
            app,
            Method::POST,
            "/register",
            json!({ "username": "alice", "password": "otherpassword" })
                .to_string(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    async fn test_register_with_short_password(pool: SqlitePool) {
        let app = app(support::state(pool));

        let response = make_request(
            app,
            Method::POST,
            "/register",
            json!({ "username": "alice", "password": "short" }).to_string(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
