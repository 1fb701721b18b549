use axum::Json;

use crate::middleware::Identity;
use crate::token::Claims;

/// Handler returning the decoded session claims.
pub async fn handler(Identity(claims): Identity) -> Json<Claims> {
    Json(claims)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    use sqlx::SqlitePool;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::router::support;
    use crate::token::Claims;
    use crate::{app, make_request};

    #[sqlx::test]
    async fn test_profile_handler(pool: SqlitePool) {
        let app = app(support::state(pool));

        let id = support::register(app.clone(), "alice", "longenough").await;
        let cookie = support::login(app.clone(), "alice", "longenough").await;

        let response = make_request(
            app,
            Method::GET,
            "/profile",
            String::default(),
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let claims: Claims = serde_json::from_slice(&body).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[sqlx::test]
    async fn test_profile_without_cookie(pool: SqlitePool) {
        let app = app(support::state(pool));

        let response = make_request(
            app,
            Method::GET,
            "/profile",
            String::default(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&body).contains("missing token"));
    }

    #[sqlx::test]
    async fn test_profile_with_invalid_token(pool: SqlitePool) {
        let app = app(support::state(pool));

        let response = make_request(
            app,
            Method::GET,
            "/profile",
            String::default(),
            Some("token=not.a.jwt"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&body).contains("invalid token"));
    }

    #[sqlx::test]
    async fn test_profile_with_expired_token(pool: SqlitePool) {
        let app = app(support::state(pool));

        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let claims = Claims {
            sub: "user-1".into(),
            username: "alice".into(),
            iat: time - 1_000,
            exp: time - 100,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(support::TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let response = make_request(
            app,
            Method::GET,
            "/profile",
            String::default(),
            Some(&format!("token={token}")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&body).contains("expired token"));
    }
}
