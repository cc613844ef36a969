use recserde_api::{ErrorKind, SerdeError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("serde error: {0}")]
    Serde(#[from] SerdeError),

    #[error("serde not found: {0}")]
    SerdeNotFound(String),
}

impl EngineError {
    /// Add context to the error.
    ///
    /// For `Serde` variant, context is added to the inner `SerdeError`.
    /// For other variants, context is prepended to the message.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            EngineError::Serde(e) => EngineError::Serde(e.with_context(ctx)),
            EngineError::Config(msg) => EngineError::Config(format!("{ctx}: {msg}")),
            EngineError::SerdeNotFound(msg) => EngineError::SerdeNotFound(format!("{ctx}: {msg}")),
        }
    }

    /// Kind of the underlying serde error, if any.
    pub fn serde_kind(&self) -> Option<ErrorKind> {
        match self {
            EngineError::Serde(e) => Some(e.kind()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_goes_into_serde_error() {
        let err = EngineError::from(SerdeError::corrupt("bad magic")).with_context("serde 'cards'");
        assert_eq!(err.serde_kind(), Some(ErrorKind::Corrupt));
        assert_eq!(err.to_string(), "serde error: corrupt: serde 'cards': bad magic");
    }

    #[test]
    fn context_prefixes_config_message() {
        let err = EngineError::Config("unknown parameter 'x'".into()).with_context("serde 'cards'");
        assert_eq!(err.to_string(), "config error: serde 'cards': unknown parameter 'x'");
        assert_eq!(err.serde_kind(), None);
    }
}
