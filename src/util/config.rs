use std::env;

// ========================// Config //======================== //

/// Configure of the App
#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub db_url: String,
    pub jwt_secret: String,
    pub token_duration: i64,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Initialize the Config from env
    pub fn from_env() -> Config {
        let server_addr = env::var("SERVER_ADDR").unwrap_or("0.0.0.0:8080".to_owned());
        let db_url = env::var("DATABASE_URL").expect("failed to parse DATABASE_URL");
        let jwt_secret = env::var("JWT_SECRET").expect("failed to parse JWT_SECRET");

        let token_duration: i64 = env::var("TOKEN_DURATION_HOURS")
            .unwrap_or("24".to_owned())
            .parse()
            .expect("failed to parse TOKEN_DURATION_HOURS");

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or("http://localhost:3000,http://localhost:5173".to_owned())
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();

        Config {
            server_addr,
            db_url,
            jwt_secret,
            token_duration,
            allowed_origins,
        }
    }
}
