//! Handle database requests.

use sqlx::SqlitePool;
use validator::{ValidationError, ValidationErrors};

use crate::error::Result;
use crate::user::User;

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

fn username_taken() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(
        "username",
        ValidationError::new("username")
            .with_message("Username is already taken.".into()),
    );
    errors
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert [`User`] into database.
    pub async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO users (id, username, password, created_at)
                VALUES (?, ?, ?, ?)"#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            let taken = err
                .as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation());
            if taken {
                username_taken().into()
            } else {
                crate::ServerError::Sql(err)
            }
        })?;

        Ok(())
    }

    /// Find a user using the `username` field.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, username, password, created_at
                FROM users WHERE username = ?"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
