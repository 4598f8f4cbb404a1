use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf};

pub const DEFAULT_SQL_SERVER_PORT: u16 = 1433;

/// What the source reads: a caller-supplied query or a whole table.
///
/// Pages are cut with a no-op ordering, so a query that needs page
/// boundaries to be reproducible must carry its own deterministic
/// `ORDER BY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceSelection {
    Query(String),
    Table(String),
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceAuth {
    /// Trusted / integrated security of the current OS account.
    Integrated,
    SqlServer { username: String, password: String },
}

impl fmt::Debug for SourceAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceAuth::Integrated => write!(f, "Integrated"),
            SourceAuth::SqlServer { username, .. } => f
                .debug_struct("SqlServer")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocator {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub selection: SourceSelection,
    pub auth: SourceAuth,
    pub trust_cert: bool,
}

impl SourceLocator {
    /// `host:port/database`, safe to log.
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationLocator {
    pub project: String,
    pub dataset: String,
    pub table: String,
    pub credentials_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_redacted_in_debug() {
        let auth = SourceAuth::SqlServer {
            username: "loader".into(),
            password: "hunter2".into(),
        };
        let rendered = format!("{auth:?}");
        assert!(rendered.contains("loader"));
        assert!(!rendered.contains("hunter2"));
    }
}
