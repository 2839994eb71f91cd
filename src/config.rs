use std::env;

use crate::media::DEFAULT_BUCKET;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Base URL of the object storage host. Empty means only absolute media URLs resolve.
    pub storage_url: String,
    pub media_bucket: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:fitplan.db?mode=rwc".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            storage_url: env::var("STORAGE_URL").unwrap_or_default(),
            media_bucket: env::var("MEDIA_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
