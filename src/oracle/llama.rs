use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::warn;

use crate::error::{LoomError, LoomResult};
use crate::types::{BackendKind, Candidate};

use super::traits::Oracle;
use super::{completion_probs, discover_model_name, json_body};

/// Client for a llama.cpp server's native `/completion` endpoint.
///
/// Lenient by default: a response that cannot be parsed into the expected
/// shape yields an empty candidate list (with a warning) instead of an error,
/// so a single flaky completion never kills a search.
pub struct LlamaCppOracle {
    client: Client,
    base_url: String,
    lenient: bool,
}

impl LlamaCppOracle {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            lenient: true,
        }
    }

    /// Propagate protocol errors instead of swallowing them.
    pub fn strict(mut self) -> Self {
        self.lenient = false;
        self
    }
}

#[async_trait]
impl Oracle for LlamaCppOracle {
    fn kind(&self) -> BackendKind {
        BackendKind::LlamaCpp
    }

    async fn top_candidates(&self, prompt: &str) -> LoomResult<Vec<Candidate>> {
        let url = format!("{}/completion", self.base_url);
        let body = json!({
            "prompt": prompt,
            "cache_prompt": true,
            "temperature": 1.0,
            "n_predict": 1,
            "top_k": 10,
            "top_p": 1.0,
            "n_probs": 10,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LoomError::backend(
                "llama.cpp",
                format!("HTTP {status}: {body}"),
            ));
        }

        let data = match json_body(response, "llama.cpp").await {
            Ok(v) => v,
            Err(e) if self.lenient => {
                warn!(error = %e, "llama.cpp response was not valid JSON");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        match completion_probs(&data) {
            Some(candidates) => Ok(candidates),
            None if self.lenient => {
                warn!("llama.cpp response missing completion_probabilities");
                Ok(Vec::new())
            }
            None => Err(LoomError::protocol(
                "llama.cpp",
                "missing completion_probabilities",
            )),
        }
    }

    async fn model_name(&self) -> LoomResult<String> {
        discover_model_name(&self.client, &self.base_url, "llama.cpp").await
    }
}
