use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoomError {
    #[error("No oracle backend configured — set LLAMA_API_URL, KOBOLD_API_URL, VLLM_API_URL or OPENAI_API_KEY")]
    NoBackend,

    #[error("Backend error: {backend}: {message}")]
    Backend { backend: String, message: String },

    #[error("Protocol error: {backend}: {message}")]
    Protocol { backend: String, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl LoomError {
    pub fn protocol(backend: impl Into<String>, message: impl Into<String>) -> Self {
        LoomError::Protocol {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        LoomError::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Fatal errors abort a search before it starts; everything else is
    /// per-task and only drops the affected task from the frontier.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LoomError::NoBackend)
    }
}

pub type LoomResult<T> = Result<T, LoomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats() {
        let err = LoomError::protocol("vllm", "missing choices");
        assert_eq!(err.to_string(), "Protocol error: vllm: missing choices");

        let err = LoomError::backend("llama.cpp", "HTTP 500");
        assert!(err.to_string().contains("llama.cpp"));

        let err = LoomError::NoBackend;
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LoomError>();
    }

    #[test]
    fn only_no_backend_is_fatal() {
        assert!(LoomError::NoBackend.is_fatal());
        assert!(!LoomError::protocol("kobold", "truncated body").is_fatal());
        assert!(!LoomError::backend("openai", "HTTP 429").is_fatal());
    }

    #[test]
    fn json_error_converts() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let loom_err: LoomError = json_err.into();
        assert!(matches!(loom_err, LoomError::Serialization(_)));
    }
}
