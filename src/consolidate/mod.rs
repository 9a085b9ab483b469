//! Consolidation of raw search output into a ranked, deduplicated list.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::LoomResult;
use crate::types::Thread;

/// Ranked, deduplicated continuations: `(probability, suffix)` pairs in
/// descending-probability order, suffixes relative to the initial prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consolidated {
    pub threads: Vec<(f64, String)>,
    /// Whether a stripped leading space must be restored when gluing a
    /// suffix back onto the prompt. One flag for the whole batch, set by any
    /// thread that needed it; per-thread spacing is not tracked.
    pub add_space: bool,
}

impl Consolidated {
    /// Render as the `[probability, text]` pair array used by persisted
    /// output.
    pub fn to_json(&self) -> LoomResult<String> {
        Ok(serde_json::to_string(&self.threads)?)
    }
}

/// Sort threads by probability, strip the prompt prefix, normalize a leading
/// space, and keep only the first occurrence of each distinct suffix.
pub fn consolidate(threads: &[Thread], initial_prompt: &str) -> Consolidated {
    let mut sorted: Vec<&Thread> = threads.iter().collect();
    sorted.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(Ordering::Equal)
    });

    let mut seen: HashSet<String> = HashSet::new();
    let mut good: Vec<(f64, String)> = Vec::new();
    let mut add_space = false;

    for thread in sorted {
        let mut suffix = thread
            .text
            .strip_prefix(initial_prompt)
            .unwrap_or(&thread.text);
        if let Some(stripped) = suffix.strip_prefix(' ') {
            suffix = stripped;
            add_space = true;
        }
        if seen.insert(suffix.to_string()) {
            good.push((thread.probability, suffix.to_string()));
        }
    }

    Consolidated {
        threads: good,
        add_space,
    }
}
