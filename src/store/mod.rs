mod call;
pub mod model;
mod user;

use crate::Config;
use sqlx::{postgres::PgPoolOptions, PgPool};

// ========================// Store //======================== //

#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub async fn new(config: &Config) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(&config.db_url)
            .await
            .expect("failed to connect database");

        sqlx::migrate!()
            .run(&pool)
            .await
            .expect("failed to run migrate up");
        tracing::info!("db migrated successfully");

        Self { pool }
    }
}
