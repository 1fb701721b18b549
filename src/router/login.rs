use axum::Json;
use axum::extract::State;
use axum::http::{HeaderName, header};
use axum::response::AppendHeaders;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::router::Valid;
use crate::user::UserRepository;
use crate::{AppState, ServerError, middleware};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(min = 1, message = "Missing 'username' field."))]
    pub username: String,
    #[validate(length(min = 1, message = "Missing 'password' field."))]
    password: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    pub username: String,
}

/// Handler to login a user.
///
/// An unknown username and a wrong password are indistinguishable on the
/// wire so usernames cannot be enumerated.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(AppendHeaders<[(HeaderName, String); 1]>, Json<Response>)> {
    let user = UserRepository::new(state.db.pool.clone())
        .find_by_username(&body.username)
        .await?
        .ok_or(ServerError::WrongCredentials)?;

    if !state.crypto.verify_password(&body.password, &user.password) {
        return Err(ServerError::WrongCredentials);
    }

    let token = state.token.create(&user.id, &user.username)?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            middleware::session_cookie(&token),
        )]),
        Json(Response {
            id: user.id,
            username: user.username,
        }),
    ))
}
