use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub session: SessionConfig,
    pub database: DatabaseConfig,
    pub listing: ListingConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sessions older than this are destroyed on the next request.
    pub timeout_hours: u64,
    /// user_type values allowed through the admin gate.
    pub allowed_roles: Vec<String>,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    pub default_per_page: i64,
    pub max_per_page: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub directory: String,
    pub max_size_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment preset first, specific env vars override on top
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("SESSION_TIMEOUT_HOURS") {
            self.session.timeout_hours = v.parse().unwrap_or(self.session.timeout_hours);
        }
        if let Ok(v) = env::var("SESSION_ALLOWED_ROLES") {
            self.session.allowed_roles = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.session.cookie_name = v;
        }
        if let Ok(v) = env::var("SESSION_COOKIE_SECURE") {
            self.session.cookie_secure = v.parse().unwrap_or(self.session.cookie_secure);
        }

        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        if let Ok(v) = env::var("LISTING_DEFAULT_PER_PAGE") {
            self.listing.default_per_page = v.parse().unwrap_or(self.listing.default_per_page);
        }
        if let Ok(v) = env::var("LISTING_MAX_PER_PAGE") {
            self.listing.max_per_page = v.parse().unwrap_or(self.listing.max_per_page);
        }

        if let Ok(v) = env::var("UPLOAD_DIRECTORY") {
            self.uploads.directory = v;
        }
        if let Ok(v) = env::var("UPLOAD_MAX_SIZE_BYTES") {
            self.uploads.max_size_bytes = v.parse().unwrap_or(self.uploads.max_size_bytes);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            session: SessionConfig {
                timeout_hours: 8,
                allowed_roles: vec!["admin".to_string(), "staff".to_string()],
                cookie_name: "admin_session".to_string(),
                cookie_secure: false,
            },
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
            },
            listing: ListingConfig {
                default_per_page: 20,
                max_per_page: 100,
            },
            uploads: UploadConfig {
                directory: "uploads".to_string(),
                max_size_bytes: 10 * 1024 * 1024, // 10MB
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            session: SessionConfig {
                timeout_hours: 8,
                allowed_roles: vec!["admin".to_string(), "staff".to_string()],
                cookie_name: "admin_session".to_string(),
                cookie_secure: true,
            },
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                enable_query_logging: true,
            },
            listing: ListingConfig {
                default_per_page: 20,
                max_per_page: 100,
            },
            uploads: UploadConfig {
                directory: "uploads".to_string(),
                max_size_bytes: 5 * 1024 * 1024, // 5MB
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            session: SessionConfig {
                timeout_hours: 8,
                allowed_roles: vec!["admin".to_string(), "staff".to_string()],
                cookie_name: "admin_session".to_string(),
                cookie_secure: true,
            },
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
            },
            listing: ListingConfig {
                default_per_page: 20,
                max_per_page: 100,
            },
            uploads: UploadConfig {
                directory: "uploads".to_string(),
                max_size_bytes: 2 * 1024 * 1024, // 2MB
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
