//! Post-related HTTP API.

pub mod create;
pub mod get;
pub mod list;
pub mod update;

use axum::extract::Multipart;
use validator::{ValidationError, ValidationErrors};

use crate::AppState;
use crate::error::Result;

/// Fields accepted by the post form, all optional until checked.
#[derive(Debug, Default)]
pub(super) struct PostForm {
    pub id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub cover: Option<String>,
}

impl PostForm {
    /// Drain a multipart body into a [`PostForm`], ingesting the `file`
    /// field through the media store. Unknown fields are ignored.
    pub(super) async fn read(
        state: &AppState,
        mut multipart: Multipart,
    ) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "id" => form.id = Some(field.text().await?),
                "title" => form.title = Some(field.text().await?),
                "summary" => form.summary = Some(field.text().await?),
                "content" => form.content = Some(field.text().await?),
                "file" => {
                    let file_name =
                        field.file_name().unwrap_or_default().to_owned();
                    let content = field.bytes().await?;
                    // Browsers submit an empty file part when no file
                    // was chosen.
                    if file_name.is_empty() && content.is_empty() {
                        continue;
                    }
                    form.cover =
                        Some(state.media.store(&file_name, &content).await?);
                },
                _ => {},
            }
        }

        Ok(form)
    }
}

fn missing(field: &'static str) -> ValidationError {
    ValidationError::new("required")
        .with_message(format!("Missing '{field}' field.").into())
}

/// Check the three text fields every post carries, collecting one error
/// per absent field.
pub(super) fn require_fields(
    title: Option<String>,
    summary: Option<String>,
    content: Option<String>,
) -> Result<(String, String, String)> {
    let mut errors = ValidationErrors::new();
    for (name, value) in [
        ("title", &title),
        ("summary", &summary),
        ("content", &content),
    ] {
        if value.as_deref().is_none_or(str::is_empty) {
            errors.add(name, missing(name));
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    Ok((
        title.unwrap_or_default(),
        summary.unwrap_or_default(),
        content.unwrap_or_default(),
    ))
}

#[cfg(test)]
pub(super) mod form {
    use axum::Router;
    use axum::body::Body;
    use axum::extract::Request;
    use axum::http::{Method, Response, header};
    use tower::util::ServiceExt;

    pub(in crate::router) const BOUNDARY: &str = "scriba-test-boundary";

    /// Encode `fields` (and an optional `file` part) as multipart/form-data.
    pub(in crate::router) fn body(
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                     name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, content)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                     name=\"file\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    pub(in crate::router) async fn send(
        app: Router,
        method: Method,
        path: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(path).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        app.oneshot(builder.body(Body::from(body(fields, file))).unwrap())
            .await
            .unwrap()
    }
}
