//! Round-based concurrent beam search over oracle token probabilities.
//!
//! Each round submits every frontier task as a semaphore-bounded worker,
//! processes oracle responses in completion order, and either terminates a
//! beam (depth limit, beam budget, stop token) or enqueues it for the next
//! round. Completed beams stream to the caller as they finish.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use crate::error::LoomResult;
use crate::oracle::Oracle;
use crate::types::{SearchConfig, Task, Thread};

#[derive(Clone)]
pub struct SearchEngine {
    oracle: Arc<dyn Oracle>,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(oracle: Arc<dyn Oracle>, config: SearchConfig) -> Self {
        Self { oracle, config }
    }

    /// Start a search and hand back the stream of completed beams.
    ///
    /// Each call is a fresh, independent run; the receiver is exhausted
    /// exactly once. Dropping it early ends the search after the current
    /// round: already-submitted oracle queries run to completion, no further
    /// round is started.
    pub fn search(&self, initial_prompt: &str) -> mpsc::UnboundedReceiver<Thread> {
        let (thread_tx, thread_rx) = mpsc::unbounded_channel();
        let engine = self.clone();
        let prompt = initial_prompt.to_string();
        tokio::spawn(async move {
            if let Err(e) = engine.run(&prompt, thread_tx).await {
                warn!(error = %e, "search aborted");
            }
        });
        thread_rx
    }

    /// The round loop, sending completed beams through `thread_tx`.
    pub async fn run(
        &self,
        initial_prompt: &str,
        thread_tx: mpsc::UnboundedSender<Thread>,
    ) -> LoomResult<()> {
        let mut frontier = vec![Task::new(initial_prompt, 0.0)];
        let mut cutoff = self.config.initial_cutoff;
        let mut depth_remaining = self.config.max_depth;
        let mut done_beams = 0usize;
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        while !frontier.is_empty() {
            // A dropped receiver means the caller stopped consuming; finish
            // between rounds rather than querying for beams nobody reads.
            if thread_tx.is_closed() {
                debug!(done_beams, "receiver dropped, ending search");
                break;
            }

            let submitted = frontier.len();
            debug!(depth_remaining, tasks = submitted, cutoff, "spawning round");

            // One worker per frontier task, gated by the parallelism bound.
            // A failed query contributes zero candidates and drops the task;
            // it does not abort the search.
            let (result_tx, mut result_rx) = mpsc::unbounded_channel();
            for task in frontier.drain(..) {
                let oracle = Arc::clone(&self.oracle);
                let semaphore = Arc::clone(&semaphore);
                let result_tx = result_tx.clone();
                tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return,
                    };
                    let candidates = match oracle.top_candidates(&task.prompt).await {
                        Ok(candidates) => candidates,
                        Err(e) => {
                            warn!(error = %e, "oracle query failed, dropping task");
                            Vec::new()
                        }
                    };
                    let _ = result_tx.send((task, candidates));
                });
            }
            drop(result_tx);

            let mut next_frontier: Vec<Task> = Vec::new();
            let mut completed = 0usize;

            // Responses arrive in completion order, not submission order.
            while let Some((task, candidates)) = result_rx.recv().await {
                let mut accepted = 0usize;
                for candidate in candidates {
                    if self.config.max_splits > 0 && accepted == self.config.max_splits {
                        break;
                    }
                    // The best candidate is exempt from the cutoff so every
                    // live task produces at least one successor.
                    if accepted > 0 && candidate.probability < cutoff {
                        break;
                    }
                    accepted += 1;

                    let new_prompt = format!("{}{}", task.prompt, candidate.token);
                    let new_score = task.score + candidate.probability;
                    let depth = self.config.max_depth - depth_remaining;

                    // The budget check counts this round's unprocessed
                    // responses as potentially still-live beams, so emission
                    // may overshoot max_beams by up to the in-flight count.
                    let budget_exhausted = self.config.max_beams > 0
                        && done_beams + (submitted - completed) >= self.config.max_beams;

                    if depth_remaining == 0 || budget_exhausted {
                        let _ = thread_tx.send(Thread {
                            probability: new_score,
                            text: new_prompt,
                            depth,
                        });
                        done_beams += 1;
                        continue;
                    }

                    let suffix = &new_prompt[initial_prompt.len()..];
                    if let Some(end) = find_stop_end(suffix, &self.config.stop_tokens) {
                        let _ = thread_tx.send(Thread {
                            probability: new_score,
                            text: format!("{initial_prompt}{}", &suffix[..end]),
                            depth,
                        });
                        done_beams += 1;
                        continue;
                    }

                    next_frontier.push(Task::new(new_prompt, new_score));
                }
                completed += 1;
            }

            cutoff *= self.config.multiplier;
            depth_remaining = depth_remaining.saturating_sub(1);
            frontier = next_frontier;
        }

        debug!(done_beams, "search frontier exhausted");
        Ok(())
    }
}

/// Scan generated text for a stop token and return the byte offset one
/// character past its first occurrence.
///
/// A stop token sitting at the very start of the suffix is skipped for
/// detection (prompt boilerplate punctuation must not stop a beam
/// immediately); the strip is cumulative across the stop-token list, and the
/// truncation offset is located in the full suffix.
fn find_stop_end(suffix: &str, stop_tokens: &[String]) -> Option<usize> {
    let mut remainder = suffix;
    for stop in stop_tokens {
        if stop.is_empty() {
            continue;
        }
        if let Some(rest) = remainder.strip_prefix(stop.as_str()) {
            remainder = rest;
        }
        if remainder.contains(stop.as_str()) {
            let idx = suffix.find(stop.as_str())?;
            let first = suffix[idx..].chars().next()?;
            return Some(idx + first.len_utf8());
        }
    }
    None
}
