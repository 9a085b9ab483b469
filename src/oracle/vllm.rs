use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::{LoomError, LoomResult};
use crate::types::{BackendKind, Candidate};

use super::traits::Oracle;
use super::{json_body, served_model_id};

/// Client for a vLLM OpenAI-compatible server.
///
/// vLLM's `/v1/completions` requires a model id; it is discovered once at
/// construction via `/v1/models` and stored immutably, so every query after
/// [`VllmOracle::connect`] is a single exchange.
pub struct VllmOracle {
    client: Client,
    base_url: String,
    model: String,
}

impl VllmOracle {
    /// Resolve the served model and build a client.
    pub async fn connect(base_url: impl Into<String>) -> LoomResult<Self> {
        let base_url = base_url.into();
        let client = Client::new();

        let response = client.get(format!("{base_url}/v1/models")).send().await?;
        let models = json_body(response, "vllm").await?;
        let model = served_model_id(&models, "vllm")?;

        Ok(Self {
            client,
            base_url,
            model,
        })
    }

    /// Build a client for a known model id, skipping discovery.
    pub fn with_model(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl Oracle for VllmOracle {
    fn kind(&self) -> BackendKind {
        BackendKind::Vllm
    }

    async fn top_candidates(&self, prompt: &str) -> LoomResult<Vec<Candidate>> {
        let url = format!("{}/v1/completions", self.base_url);
        let body = json!({
            "prompt": prompt,
            "n": 1,
            "temperature": 0.0,
            "max_tokens": 1,
            "stream": false,
            "logprobs": 5,
            "model": self.model,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LoomError::backend("vllm", format!("HTTP {status}: {body}")));
        }

        let data = json_body(response, "vllm").await?;
        let top_logprobs = data
            .get("choices")
            .and_then(|v| v.as_array())
            .and_then(|a| a.first())
            .and_then(|c| c.get("logprobs"))
            .and_then(|l| l.get("top_logprobs"))
            .and_then(|t| t.as_array())
            .and_then(|a| a.first())
            .and_then(|m| m.as_object())
            .ok_or_else(|| LoomError::protocol("vllm", "missing top_logprobs"))?;

        let mut candidates: Vec<Candidate> = top_logprobs
            .iter()
            .filter_map(|(token, logprob)| {
                logprob
                    .as_f64()
                    .map(|lp| Candidate::new(token.clone(), lp.exp()))
            })
            .collect();
        // The wire format is a JSON object; impose the descending order the
        // trait promises.
        candidates.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(candidates)
    }

    async fn model_name(&self) -> LoomResult<String> {
        Ok(self.model.clone())
    }
}
