use crate::error::LoomResult;
use crate::types::{BackendKind, Candidate};

/// Core oracle trait — abstracts "given a prompt, return the top next-token
/// candidates" over the configured inference backend.
#[async_trait::async_trait]
pub trait Oracle: Send + Sync {
    /// Which backend this client talks to
    fn kind(&self) -> BackendKind;

    /// Top next-token candidates for `prompt`, ordered by descending
    /// probability, length bounded by the backend's top-N.
    async fn top_candidates(&self, prompt: &str) -> LoomResult<Vec<Candidate>>;

    /// Human-readable model identifier, used to label persisted output.
    async fn model_name(&self) -> LoomResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety check
    #[test]
    fn oracle_is_object_safe() {
        fn _assert_object_safe(_: &dyn Oracle) {}
    }
}
