use super::{model::User, Store};
use crate::api::user::RegisterRequest;
use crate::core::{Error, ResultExt};
use crate::util::password::hash_password;

// ========================// User Store //======================== //

impl Store {
    /// Create a new user
    ///
    /// The username and email both have a unique constraint
    pub async fn create_user(&self, req: &RegisterRequest) -> Result<User, Error> {
        let hashed_password = hash_password(&req.password)?;

        sqlx::query_as::<_, User>(
            r#"
                INSERT INTO users (username, email, hashed_password)
                VALUES ($1, $2, $3)
                RETURNING id, username, email, hashed_password, created_at, updated_at
            "#,
        )
        .bind(&req.username)
        .bind(&req.email)
        .bind(&hashed_password)
        .fetch_one(&self.pool)
        .await
        .on_constraint("users_email_key")
        .on_constraint("users_username_key")
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<User, Error> {
        sqlx::query_as::<_, User>(
            r#"
                SELECT id, username, email, hashed_password, created_at, updated_at
                FROM users
                WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .not_found()
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User, Error> {
        sqlx::query_as::<_, User>(
            r#"
                SELECT id, username, email, hashed_password, created_at, updated_at
                FROM users
                WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .not_found()
    }
}
