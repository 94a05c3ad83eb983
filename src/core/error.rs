//! Domain errors shared by the handlers, the database layer and the
//! external adapters.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("Event is not recurring")]
    NotRecurring,
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Upstream service failed: {0}")]
    Upstream(String),
    #[error(transparent)]
    Database(#[from] tokio_rusqlite::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Recover a domain error that was smuggled out of a
    /// `Connection::call` closure with [`Error::abort`].
    pub fn from_call(err: tokio_rusqlite::Error) -> Self {
        match err {
            tokio_rusqlite::Error::Other(inner) => match inner.downcast::<Error>() {
                Ok(domain) => *domain,
                Err(other) => Self::Database(tokio_rusqlite::Error::Other(other)),
            },
            other => Self::Database(other),
        }
    }

    /// Wrap a domain error so it can be returned from inside a
    /// `Connection::call` closure, rolling back any open transaction.
    pub fn abort(self) -> tokio_rusqlite::Error {
        tokio_rusqlite::Error::Other(Box::new(self))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(tokio_rusqlite::Error::Rusqlite(err))
    }
}
