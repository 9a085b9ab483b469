//! Probability oracle clients — one per supported inference backend.
//!
//! Backend selection happens once, at construction time ([`from_env`]); the
//! resulting `Arc<dyn Oracle>` is handed to the search engine and never
//! re-resolved mid-search.

use std::path::Path;
use std::sync::Arc;

use reqwest::Client;

use crate::error::{LoomError, LoomResult};
use crate::types::Candidate;

mod traits;
mod llama;
mod kobold;
mod vllm;
mod openai;

pub use traits::Oracle;
pub use llama::LlamaCppOracle;
pub use kobold::KoboldOracle;
pub use vllm::VllmOracle;
pub use openai::{OpenAIOracle, DEFAULT_OPENAI_MODEL};

/// Build the oracle client selected by the environment.
///
/// Precedence when several are set: `LLAMA_API_URL`, then `KOBOLD_API_URL`,
/// then `VLLM_API_URL`, then `OPENAI_API_KEY`. None set is a configuration
/// error ([`LoomError::NoBackend`]), fatal before any search starts.
pub async fn from_env() -> LoomResult<Arc<dyn Oracle>> {
    if let Ok(url) = std::env::var("LLAMA_API_URL") {
        Ok(Arc::new(LlamaCppOracle::new(url)))
    } else if let Ok(url) = std::env::var("KOBOLD_API_URL") {
        Ok(Arc::new(KoboldOracle::new(url)))
    } else if let Ok(url) = std::env::var("VLLM_API_URL") {
        Ok(Arc::new(VllmOracle::connect(url).await?))
    } else if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        Ok(Arc::new(OpenAIOracle::new(key)))
    } else {
        Err(LoomError::NoBackend)
    }
}

/// Read a response body as JSON, classifying decode failures as protocol
/// errors rather than transport errors.
async fn json_body(response: reqwest::Response, backend: &str) -> LoomResult<serde_json::Value> {
    response.json().await.map_err(|e| {
        if e.is_decode() {
            LoomError::protocol(backend, e.to_string())
        } else {
            LoomError::Transport(e)
        }
    })
}

/// Parse the `completion_probabilities[0].probs` list shared by the
/// llama.cpp and KoboldCpp response shapes.
fn completion_probs(data: &serde_json::Value) -> Option<Vec<Candidate>> {
    let probs = data
        .get("completion_probabilities")?
        .as_array()?
        .first()?
        .get("probs")?
        .as_array()?;

    let mut candidates = Vec::with_capacity(probs.len());
    for prob in probs {
        let token = prob.get("tok_str")?.as_str()?;
        let probability = prob.get("prob")?.as_f64()?;
        candidates.push(Candidate::new(token, probability));
    }
    Some(candidates)
}

/// Ask a local server which model it serves and reduce the id to a bare name.
async fn discover_model_name(client: &Client, base_url: &str, backend: &str) -> LoomResult<String> {
    let response = client.get(format!("{base_url}/v1/models")).send().await?;
    let models = json_body(response, backend).await?;
    let id = served_model_id(&models, backend)?;
    Ok(model_basename(&id))
}

/// First model id from a `/v1/models` response.
fn served_model_id(models: &serde_json::Value, backend: &str) -> LoomResult<String> {
    models
        .get("data")
        .and_then(|v| v.as_array())
        .and_then(|a| a.first())
        .and_then(|m| m.get("id"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| LoomError::protocol(backend, "no models in /v1/models response"))
}

/// `/models/mistral-7b.Q5_K_M.gguf` → `mistral-7b.Q5_K_M`
fn model_basename(id: &str) -> String {
    Path::new(id)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
