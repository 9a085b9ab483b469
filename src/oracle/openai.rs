use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::{LoomError, LoomResult};
use crate::types::{BackendKind, Candidate};

use super::json_body;
use super::traits::Oracle;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Client for the hosted OpenAI chat completions API, asking for one token
/// with `top_logprobs` and converting log-probabilities via `exp`.
pub struct OpenAIOracle {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAIOracle {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: "https://api.openai.com".into(),
            api_key: api_key.into(),
            model: DEFAULT_OPENAI_MODEL.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Oracle for OpenAIOracle {
    fn kind(&self) -> BackendKind {
        BackendKind::OpenAI
    }

    async fn top_candidates(&self, prompt: &str) -> LoomResult<Vec<Candidate>> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.7,
            "max_tokens": 1,
            "logprobs": true,
            "top_logprobs": 10,
            "n": 1,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LoomError::backend(
                "openai",
                format!("HTTP {status}: {body}"),
            ));
        }

        let data = json_body(response, "openai").await?;
        let top_logprobs = data
            .get("choices")
            .and_then(|v| v.as_array())
            .and_then(|a| a.first())
            .and_then(|c| c.get("logprobs"))
            .and_then(|l| l.get("content"))
            .and_then(|c| c.as_array())
            .and_then(|a| a.first())
            .and_then(|e| e.get("top_logprobs"))
            .and_then(|t| t.as_array())
            .ok_or_else(|| LoomError::protocol("openai", "missing top_logprobs"))?;

        let candidates = top_logprobs
            .iter()
            .filter_map(|entry| {
                let token = entry.get("token").and_then(|v| v.as_str())?;
                let logprob = entry.get("logprob").and_then(|v| v.as_f64())?;
                Some(Candidate::new(token, logprob.exp()))
            })
            .collect();
        Ok(candidates)
    }

    async fn model_name(&self) -> LoomResult<String> {
        Ok(self.model.clone())
    }
}
