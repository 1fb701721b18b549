use axum::Json;
use axum::http::{HeaderName, header};
use axum::response::AppendHeaders;

use crate::middleware;

/// Handler to logout.
///
/// Sessions are not tracked server-side; emptying the cookie is all
/// there is to do.
pub async fn handler(
) -> (AppendHeaders<[(HeaderName, String); 1]>, Json<&'static str>) {
    (
        AppendHeaders([(
            header::SET_COOKIE,
            middleware::clear_session_cookie(),
        )]),
        Json("ok"),
    )
}
