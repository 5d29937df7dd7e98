use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub reports: ReportsConfig,
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub session_cookie: String,
    pub secure_cookie: bool,
    pub bcrypt_cost: u32,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    pub directory: PathBuf,
}

/// Default HOD account created when the `hods` table is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub hod_name: String,
    pub hod_email: Option<String>,
    pub hod_phone: String,
    #[serde(skip_serializing)]
    pub hod_password: Option<String>,
}

impl BootstrapConfig {
    pub fn is_configured(&self) -> bool {
        self.hod_email.is_some() && self.hod_password.is_some()
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("MARKBOOK_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("MARKBOOK_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout =
                v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_SESSION_COOKIE") {
            self.security.session_cookie = v;
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIE") {
            self.security.secure_cookie = v.parse().unwrap_or(self.security.secure_cookie);
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }

        // Reports overrides
        if let Ok(v) = env::var("REPORTS_DIR") {
            self.reports.directory = PathBuf::from(v);
        }

        // Bootstrap overrides
        if let Ok(v) = env::var("BOOTSTRAP_HOD_NAME") {
            self.bootstrap.hod_name = v;
        }
        if let Ok(v) = env::var("BOOTSTRAP_HOD_EMAIL") {
            self.bootstrap.hod_email = Some(v);
        }
        if let Ok(v) = env::var("BOOTSTRAP_HOD_PHONE") {
            self.bootstrap.hod_phone = v;
        }
        if let Ok(v) = env::var("BOOTSTRAP_HOD_PASSWORD") {
            self.bootstrap.hod_password = Some(v);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: "sqlite://markbook.db?mode=rwc".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                session_cookie: "session_id".to_string(),
                secure_cookie: false,
                bcrypt_cost: 10,
                enable_cors: true,
            },
            reports: ReportsConfig {
                directory: PathBuf::from("reports"),
            },
            bootstrap: BootstrapConfig {
                hod_name: "Head of Department".to_string(),
                hod_email: Some("hod@example.com".to_string()),
                hod_phone: "0000000000".to_string(),
                hod_password: Some("changeme".to_string()),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: "sqlite://markbook.db?mode=rwc".to_string(),
                max_connections: 10,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                session_cookie: "session_id".to_string(),
                secure_cookie: true,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                enable_cors: true,
            },
            reports: ReportsConfig {
                directory: PathBuf::from("reports"),
            },
            bootstrap: BootstrapConfig {
                hod_name: "Head of Department".to_string(),
                hod_email: None,
                hod_phone: "0000000000".to_string(),
                hod_password: None,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: "sqlite://markbook.db?mode=rwc".to_string(),
                max_connections: 20,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                session_cookie: "session_id".to_string(),
                secure_cookie: true,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                enable_cors: false,
            },
            reports: ReportsConfig {
                directory: PathBuf::from("reports"),
            },
            bootstrap: BootstrapConfig {
                hod_name: "Head of Department".to_string(),
                hod_email: None,
                hod_phone: "0000000000".to_string(),
                hod_password: None,
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.environment, Environment::Development);
        assert!(!config.security.secure_cookie);
        assert!(config.bootstrap.is_configured());
        assert_eq!(config.security.session_cookie, "session_id");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.secure_cookie);
        assert!(!config.bootstrap.is_configured());
        assert_eq!(config.security.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = AppConfig::development();
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
    }
}
