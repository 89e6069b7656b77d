use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong in a billus operation.
///
/// None of these are fatal: the front end prints the message and the user can
/// retry the action.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is empty or a value is rejected before any state changes.
    #[error("{0}")]
    Validation(String),

    #[error("a bill must keep at least one line item")]
    LastLineItem,

    /// `index` is zero-based; the message counts rows from 1.
    #[error("row {} does not exist (there are {len} rows)", .index + 1)]
    IndexOutOfRange { index: usize, len: usize },

    /// The identity or document-store service failed or refused the request.
    #[error("{0}")]
    Remote(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("prompt cancelled: {0}")]
    Prompt(#[from] inquire::InquireError),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::Remote("Could not reach the server. Check your connection and try again.".into())
        } else {
            Self::Remote(format!("Request failed: {err}"))
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Config(err.to_string())
    }
}
