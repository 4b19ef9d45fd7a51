use thiserror::Error;

/// Errors surfaced by [`crate::Backend`] operations.
///
/// Every variant is recoverable: the caller shows the message and stays
/// interactive. Nothing here is fatal to the application.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The backend rejected or failed the request. `status` is present for
    /// HTTP-level errors, absent for transport failures.
    #[error("{message}")]
    Backend {
        message: String,
        status: Option<u16>,
    },

    /// An entity id resolved against the current snapshot was not there
    /// (stale view — the record changed under us).
    #[error("{entity} {id} is no longer present; reload and retry")]
    NotFound { entity: &'static str, id: i64 },
}

impl From<storekeep_api::Error> for CoreError {
    fn from(err: storekeep_api::Error) -> Self {
        match err {
            storekeep_api::Error::Api { message, status } => Self::Backend {
                message,
                status: Some(status),
            },
            storekeep_api::Error::Transport(e) => Self::Backend {
                message: format!("cannot reach server: {e}"),
                status: None,
            },
            other => Self::Backend {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl CoreError {
    /// Returns `true` if this is a "not found" outcome, either the typed
    /// snapshot miss or an HTTP 404 from the backend.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Backend { status, .. } => *status == Some(404),
        }
    }
}
