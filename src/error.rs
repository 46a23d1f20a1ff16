use thiserror::Error;

/// Failures surfaced by the gateway and the controllers.
///
/// An exhausted queue (`status = "no_more"`) is not an error; see
/// [`crate::domain::email::NextEmail::NoMore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// A required input was empty or out of bounds. Raised before any request.
    #[error("{0}")]
    Validation(String),

    /// The request could not be completed or the response was unreadable.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The backend answered with `status = "error"`.
    #[error("{message}")]
    Application { message: String },
}

impl ClientError {
    pub fn application(message: impl Into<String>) -> Self {
        ClientError::Application {
            message: message.into(),
        }
    }

    /// The backend's own message, when the backend produced one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ClientError::Application { message } => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
