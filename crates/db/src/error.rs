use thiserror::Error;

/// Failures raised while talking to the relational store.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid database url '{url}': {reason}")]
    InvalidUrl { url: String, reason: &'static str },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl DbError {
    pub(crate) fn invalid_url(url: &str, reason: &'static str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason,
        }
    }
}
