use super::{
    model::{Call, CallParticipant},
    Store,
};
use crate::api::call::CreateCallRequest;
use crate::core::{constant::STATUS_ACTIVE, Error, ResultExt};

// ========================// Call Store //======================== //

impl Store {
    /// Create a new call with the `active` status
    pub async fn create_call(&self, creator_id: i64, req: &CreateCallRequest) -> Result<Call, Error> {
        sqlx::query_as::<_, Call>(
            r#"
                INSERT INTO calls (title, description, creator_id, status)
                VALUES ($1, $2, $3, $4)
                RETURNING id, title, description, creator_id, status, created_at, updated_at
            "#,
        )
        .bind(&req.title)
        .bind(req.description.as_deref().unwrap_or(""))
        .bind(creator_id)
        .bind(STATUS_ACTIVE)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// Join an active call; the call must exist and be active
    pub async fn join_call(&self, call_id: i64, user_id: i64) -> Result<CallParticipant, Error> {
        let call = sqlx::query_as::<_, Call>(
            r#"
                SELECT id, title, description, creator_id, status, created_at, updated_at
                FROM calls
                WHERE id = $1
            "#,
        )
        .bind(call_id)
        .fetch_one(&self.pool)
        .await
        .not_found()?;

        if call.status != STATUS_ACTIVE {
            return Err(Error::CallNotActive);
        }

        sqlx::query_as::<_, CallParticipant>(
            r#"
                INSERT INTO call_participants (call_id, user_id)
                VALUES ($1, $2)
                RETURNING id, call_id, user_id, joined_at
            "#,
        )
        .bind(call_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// Leave a call; leaving a call never joined is a no-op
    pub async fn leave_call(&self, call_id: i64, user_id: i64) -> Result<(), Error> {
        sqlx::query(
            r#"
                DELETE FROM call_participants
                WHERE call_id = $1 AND user_id = $2
            "#,
        )
        .bind(call_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_active_calls(&self) -> Result<Vec<Call>, Error> {
        sqlx::query_as::<_, Call>(
            r#"
                SELECT id, title, description, creator_id, status, created_at, updated_at
                FROM calls
                WHERE status = $1
                ORDER BY created_at DESC
            "#,
        )
        .bind(STATUS_ACTIVE)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }
}
