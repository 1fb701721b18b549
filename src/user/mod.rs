mod repository;

pub use repository::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User as saved on database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip)]
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new [`User`] with a fresh identifier.
    ///
    /// `password` must already be hashed.
    pub fn new(username: &str, password: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.to_owned(),
            password,
            created_at: Utc::now(),
        }
    }
}
