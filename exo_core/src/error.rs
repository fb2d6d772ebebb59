use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExoError {
    /// The request body as a whole is unusable ("invalid json", "no json", ...).
    #[error("{0}")]
    MalformedBody(&'static str),
    /// A field was present but could not be read as the expected type.
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unauthorized")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl ExoError {
    /// Map a collaborator failure (trait boundary `Box<dyn Error>`) to a typed error.
    pub fn persistence(e: &(dyn std::error::Error + 'static)) -> Self {
        ExoError::Persistence(e.to_string())
    }

    /// Status code of the HTTP-like surface for this error.
    pub fn status(&self) -> u16 {
        match self {
            ExoError::MalformedBody(_) | ExoError::Validation(_) => 400,
            ExoError::Unauthenticated => 401,
            ExoError::Forbidden => 403,
            ExoError::Persistence(_) => 503,
            ExoError::Config(_) => 500,
        }
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, ExoError::Unauthenticated | ExoError::Forbidden)
    }
}

pub type Result<T> = std::result::Result<T, ExoError>;
