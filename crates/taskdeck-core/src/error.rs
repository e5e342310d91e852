use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Client-side validation failure. Never sent to the server; rendered
/// the same way as server-side errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .messages.join(", "))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

impl ValidationError {
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }
}
