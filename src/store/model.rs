//! Database models

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User fields safe to return to clients
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// A persisted call session. The call id is independent of any hub room
/// key; hub rooms are purely transport-level.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Call {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub creator_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CallParticipant {
    pub id: i64,
    pub call_id: i64,
    pub user_id: i64,
    pub joined_at: DateTime<Utc>,
}
