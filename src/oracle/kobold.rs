use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::{LoomError, LoomResult};
use crate::types::{BackendKind, Candidate};

use super::traits::Oracle;
use super::{completion_probs, discover_model_name, json_body};

/// Client for KoboldCpp's OpenAI-compatible `/v1/completions` endpoint.
/// Same wire shape as llama.cpp's `/completion`, different route; strict.
pub struct KoboldOracle {
    client: Client,
    base_url: String,
}

impl KoboldOracle {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Oracle for KoboldOracle {
    fn kind(&self) -> BackendKind {
        BackendKind::Kobold
    }

    async fn top_candidates(&self, prompt: &str) -> LoomResult<Vec<Candidate>> {
        let url = format!("{}/v1/completions", self.base_url);
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
                "kobold",
                format!("HTTP {status}: {body}"),
            ));
        }

        let data = json_body(response, "kobold").await?;
        completion_probs(&data)
            .ok_or_else(|| LoomError::protocol("kobold", "missing completion_probabilities"))
    }

    async fn model_name(&self) -> LoomResult<String> {
        discover_model_name(&self.client, &self.base_url, "kobold").await
    }
}
