use crate::DbError;

/// Environment variable holding the process-wide default connection string.
pub const DEFAULT_CONNECTION_ENV: &str = "DEFATTACH_DEFAULT_CONNECTION";

/// Picks the connection string for a call: an explicit per-call value wins,
/// otherwise the configured default is used.
#[derive(Debug, Clone, Default)]
pub struct ConnectionResolver {
    default: Option<String>,
}

impl ConnectionResolver {
    pub fn new(default: Option<String>) -> Self {
        Self {
            default: default.filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn resolve(&self, explicit: Option<&str>) -> Result<String, DbError> {
        if let Some(conn) = explicit.filter(|s| !s.trim().is_empty()) {
            return Ok(conn.to_string());
        }
        self.default.clone().ok_or_else(|| {
            DbError::Config(format!(
                "no connection string given and {DEFAULT_CONNECTION_ENV} is not configured"
            ))
        })
    }
}

/// Where a connection string points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Filesystem path, or `:memory:`.
    Sqlite(String),
    Postgres(String),
}

impl Target {
    pub fn parse(connection: &str) -> Result<Self, DbError> {
        let conn = connection.trim();
        if conn.is_empty() {
            return Err(DbError::Config("connection string is empty".into()));
        }
        if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
            return Ok(Target::Postgres(conn.to_string()));
        }
        let path = conn
            .strip_prefix("sqlite://")
            .or_else(|| conn.strip_prefix("sqlite:"))
            .unwrap_or(conn);
        if path.is_empty() {
            return Err(DbError::Config(format!(
                "sqlite connection string has no path: {conn}"
            )));
        }
        Ok(Target::Sqlite(path.to_string()))
    }
}

/// Connection string with any password masked, for logs and reports.
pub fn redact(connection: &str) -> String {
    match url::Url::parse(connection) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some("***")).is_ok() {
                parsed.to_string()
            } else {
                "<unprintable connection string>".to_string()
            }
        }
        _ => connection.to_string(),
    }
}
