//! # lloom-core
//!
//! Concurrent beam search over a language model's next-token probabilities.
//! A prompt is expanded round by round: every live beam asks the oracle for
//! its top next tokens, high-probability candidates branch into new beams,
//! low-probability ones are pruned against a decaying cutoff, and finished
//! continuations stream back ranked and deduplicated.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lloom_core::consolidate::consolidate;
//! use lloom_core::search::SearchEngine;
//! use lloom_core::types::SearchConfig;
//!
//! # async fn demo() -> lloom_core::error::LoomResult<()> {
//! // Backend picked from the environment (LLAMA_API_URL, KOBOLD_API_URL,
//! // VLLM_API_URL or OPENAI_API_KEY), resolved once up front.
//! let oracle = lloom_core::oracle::from_env().await?;
//! let engine = SearchEngine::new(oracle, SearchConfig::default());
//!
//! let prompt = "Once upon a time,";
//! let mut rx = engine.search(prompt);
//! let mut threads = Vec::new();
//! while let Some(thread) = rx.recv().await {
//!     threads.push(thread);
//! }
//!
//! let results = consolidate(&threads, prompt);
//! for (probability, suffix) in &results.threads {
//!     println!("{probability:.3}  {suffix}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | Core types: `Candidate`, `Task`, `Thread`, `SearchConfig`, `BackendKind` |
//! | [`oracle`] | Probability oracle clients (llama.cpp, KoboldCpp, vLLM, OpenAI) behind one trait |
//! | [`search`] | Round-based concurrent beam search with branch/prune/stop policy |
//! | [`consolidate`] | Ranking, prefix stripping, space normalization, dedupe |
//! | [`error`] | Error types with thiserror: NoBackend, Protocol, Transport, etc. |

pub mod consolidate;
pub mod error;
pub mod oracle;
pub mod search;
pub mod types;

pub use error::LoomError;
pub use types::*;
