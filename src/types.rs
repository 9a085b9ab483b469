use serde::{Deserialize, Serialize};

// ─── Oracle Types ───────────────────────────────────────────────────────────

/// Which inference backend an oracle client talks to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// llama.cpp server (`/completion`)
    LlamaCpp,
    /// KoboldCpp (`/v1/completions`)
    Kobold,
    /// vLLM OpenAI-compatible server (`/v1/completions`)
    Vllm,
    /// Hosted OpenAI chat completions
    OpenAI,
    Custom(String),
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::LlamaCpp => write!(f, "llama.cpp"),
            BackendKind::Kobold => write!(f, "kobold"),
            BackendKind::Vllm => write!(f, "vllm"),
            BackendKind::OpenAI => write!(f, "openai"),
            BackendKind::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// One (token, probability) pair from an oracle response.
///
/// Responses are ordered by descending probability and bounded by the
/// backend's top-N (typically 10).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub token: String,
    pub probability: f64,
}

impl Candidate {
    pub fn new(token: impl Into<String>, probability: f64) -> Self {
        Self {
            token: token.into(),
            probability,
        }
    }
}

// ─── Search Types ───────────────────────────────────────────────────────────

/// A pending unit of search work: a prompt to expand plus the probability
/// accumulated along the path that produced it. Owned exclusively by the
/// engine's current-round frontier.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub prompt: String,
    /// Sum of per-token probabilities along the generation path.
    pub score: f64,
}

impl Task {
    pub fn new(prompt: impl Into<String>, score: f64) -> Self {
        Self {
            prompt: prompt.into(),
            score,
        }
    }
}

/// A completed beam, immutable once emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Sum of per-token probabilities along the generation path.
    pub probability: f64,
    /// Full text: initial prompt plus everything generated.
    pub text: String,
    /// Number of rounds completed before this beam terminated.
    pub depth: usize,
}

/// Immutable per-search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Rounds before every surviving beam is force-terminated.
    pub max_depth: usize,
    /// Soft budget on emitted beams. 0 = unbounded.
    pub max_beams: usize,
    /// Substrings that end a beam early when they appear in generated text.
    pub stop_tokens: Vec<String>,
    /// Minimum probability for a non-first candidate to spawn a new task.
    pub initial_cutoff: f64,
    /// Cutoff is scaled by this factor after every round.
    pub multiplier: f64,
    /// Cap on candidates expanded from one oracle response. 0 = unbounded.
    pub max_splits: usize,
    /// Simultaneous in-flight oracle queries.
    pub parallelism: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            max_beams: 100,
            stop_tokens: Vec::new(),
            initial_cutoff: 0.1,
            multiplier: 1.0,
            max_splits: 3,
            parallelism: 2,
        }
    }
}
