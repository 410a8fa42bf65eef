use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub cache: CacheConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    pub sync_interval: u64,
    pub max_retries: u32,
    pub retry_backoff_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lock entries older than this are treated as absent.
    pub lock_ttl_secs: u64,
    /// Remote collection holding work-item authorization documents.
    pub lock_collection: String,
    /// Bound on the remote authorization check.
    pub check_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Oldest notifications are dropped beyond this count.
    pub retention: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: default_database_url(),
                max_connections: 5,
                connection_timeout: 30,
            },
            sync: SyncConfig::default(),
            cache: CacheConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_sync: true,
            sync_interval: 300, // 5 minutes
            max_retries: 3,
            retry_backoff_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            lock_ttl_secs: 30,
            lock_collection: "work_item_locks".to_string(),
            check_timeout_secs: 30,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { retention: 50 }
    }
}

fn default_database_url() -> String {
    let data_dir = dirs::data_dir()
        .map(|dir| dir.join("fieldsync"))
        .unwrap_or_else(|| std::path::PathBuf::from("./data"));
    format!("sqlite:{}/fieldsync.db?mode=rwc", data_dir.display())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("FIELDSYNC_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("FIELDSYNC_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Ok(v) = std::env::var("FIELDSYNC_SYNC_INTERVAL") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.sync_interval = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("FIELDSYNC_MAX_RETRIES") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.max_retries = value.min(u32::MAX as u64) as u32;
            }
        }
        if let Ok(v) = std::env::var("FIELDSYNC_RETRY_BACKOFF_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.retry_backoff_secs = value;
            }
        }
        if let Ok(v) = std::env::var("FIELDSYNC_REQUEST_TIMEOUT_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.request_timeout_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("FIELDSYNC_LOCK_TTL_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.cache.lock_ttl_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("FIELDSYNC_LOCK_COLLECTION") {
            if !v.trim().is_empty() {
                cfg.cache.lock_collection = v;
            }
        }
        if let Ok(v) = std::env::var("FIELDSYNC_NOTIFICATION_RETENTION") {
            if let Some(value) = parse_u64(&v) {
                cfg.notifications.retention = value.max(1) as usize;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.sync.request_timeout_secs == 0 {
            return Err("Sync request_timeout_secs must be greater than 0".to_string());
        }
        if self.cache.lock_ttl_secs == 0 {
            return Err("Cache lock_ttl_secs must be greater than 0".to_string());
        }
        if self.cache.lock_collection.trim().is_empty() {
            return Err("Cache lock_collection cannot be empty".to_string());
        }
        if self.cache.check_timeout_secs == 0 {
            return Err("Cache check_timeout_secs must be greater than 0".to_string());
        }
        if self.notifications.retention == 0 {
            return Err("Notification retention must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
