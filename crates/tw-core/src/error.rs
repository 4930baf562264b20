use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// One backend/transport attempt failed; callers try the next candidate.
    #[error("provider '{model}' failed: {reason}")]
    Provider { model: String, reason: String },

    #[error("inference client unavailable")]
    ClientUnavailable,

    #[error("all providers exhausted")]
    ProvidersExhausted,

    #[error("render failed: {0}")]
    Render(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn provider(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Provider {
            model: model.into(),
            reason: reason.into(),
        }
    }
}

/// Truncate error text on a char boundary so raw backend bodies stay loggable.
pub fn truncate_reason(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_reason("model loading", 400), "model loading");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(500);
        let cut = truncate_reason(&text, 400);
        assert_eq!(cut.chars().count(), 400);
    }

    #[test]
    fn test_provider_error_display() {
        let err = Error::provider("stabilityai/sd-2-1", "status 503");
        assert_eq!(
            err.to_string(),
            "provider 'stabilityai/sd-2-1' failed: status 503"
        );
    }
}
