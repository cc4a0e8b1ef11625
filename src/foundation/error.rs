pub type PinwarpResult<T> = Result<T, PinwarpError>;

#[derive(thiserror::Error, Debug)]
pub enum PinwarpError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("metadata error: {0}")]
    Meta(String),

    #[error("media error: {0}")]
    Media(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PinwarpError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn meta(msg: impl Into<String>) -> Self {
        Self::Meta(msg.into())
    }

    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
