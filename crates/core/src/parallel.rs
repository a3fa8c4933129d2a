//! Racing partitions across a worker pool
//!
//! Every partition gets its own [`Engine`] seeded from the shared body hash
//! plus the partition prefix, so workers never share hash state. The first
//! worker to find a solution raises the shared [`StopSignal`]; the others
//! notice it at their next subtree boundary and return.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::SearchParams;
use crate::SearchReport;
use crate::engine::{Engine, NotFoundReason, SearchResult, StopSignal};
use crate::error::SearchError;
use crate::partition::Partition;
use crate::payload::CommitPayload;

/// Multi-worker search configuration.
#[derive(Debug, Clone, Default)]
pub struct ParallelSearch {
    workers: usize,
    timeout: Option<Duration>,
}

impl ParallelSearch {
    /// Search with at most `workers` threads (0 = one per CPU).
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            timeout: None,
        }
    }

    /// Give up with [`NotFoundReason::DeadlineExpired`] after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Race one engine per partition and return the first solution observed.
    ///
    /// The solution is the smallest nonce within the partition that found it,
    /// not necessarily across the whole space.
    pub fn run(
        &self,
        payload: &CommitPayload,
        params: &SearchParams,
        partitions: &[Partition],
    ) -> Result<SearchReport, SearchError> {
        if partitions.is_empty() {
            return Err(SearchError::InvalidPartition(
                "need at least one partition".to_string(),
            ));
        }
        if let Some(p) = partitions.iter().find(|p| p.len() > params.nonce_len()) {
            return Err(SearchError::InvalidPartition(format!(
                "prefix of {} characters exceeds nonce length {}",
                p.len(),
                params.nonce_len()
            )));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("vanity-worker-{}", i))
            .build()
            .map_err(|e| SearchError::WorkerPool(e.to_string()))?;

        let start = Instant::now();
        let stop = match self.timeout {
            Some(timeout) => StopSignal::with_deadline(start + timeout),
            None => StopSignal::new(),
        };
        let shared = Shared {
            payload,
            params,
            stop: &stop,
            candidates: AtomicU64::new(0),
            interrupted: AtomicBool::new(false),
        };

        tracing::debug!(
            partitions = partitions.len(),
            workers = pool.current_num_threads(),
            "starting partitioned search"
        );

        let found = pool.install(|| {
            partitions
                .par_iter()
                .map(|partition| shared.work(partition))
                .find_map_any(|outcome| match outcome {
                    Ok(SearchResult::Found(solution)) => Some(Ok(solution)),
                    Ok(SearchResult::NotFound(_)) => None,
                    Err(e) => Some(Err(e)),
                })
        });

        let result = match found.transpose()? {
            Some(solution) => SearchResult::Found(solution),
            None if shared.interrupted.load(Ordering::SeqCst) => {
                SearchResult::NotFound(stop.reason())
            }
            None => SearchResult::NotFound(NotFoundReason::Exhausted),
        };

        Ok(SearchReport {
            result,
            candidates: shared.candidates.load(Ordering::Relaxed),
            elapsed: start.elapsed(),
        })
    }
}

/// Read-only inputs plus counters shared by all workers of one run.
struct Shared<'a> {
    payload: &'a CommitPayload,
    params: &'a SearchParams,
    stop: &'a StopSignal,
    candidates: AtomicU64,
    interrupted: AtomicBool,
}

impl Shared<'_> {
    fn work(&self, partition: &Partition) -> Result<SearchResult, SearchError> {
        let remaining = self.params.nonce_len() - partition.len();
        let mut engine =
            Engine::new(self.params.alphabet(), self.params.prefix()).with_stop(self.stop);

        let outcome = self
            .payload
            .seed(partition.prefix(), remaining)
            .and_then(|seed| engine.run(seed));
        self.candidates
            .fetch_add(engine.candidates(), Ordering::Relaxed);

        match &outcome {
            Ok(SearchResult::Found(solution)) => {
                self.stop.raise();
                tracing::debug!(
                    partition = partition.index(),
                    nonce = %solution.nonce,
                    "worker found solution"
                );
            }
            Ok(SearchResult::NotFound(NotFoundReason::Exhausted)) => {
                tracing::trace!(partition = partition.index(), "partition exhausted");
            }
            Ok(SearchResult::NotFound(reason)) => {
                self.interrupted.store(true, Ordering::SeqCst);
                tracing::trace!(partition = partition.index(), %reason, "worker stopped");
            }
            Err(e) => {
                self.stop.raise();
                tracing::warn!(partition = partition.index(), error = %e, "worker failed");
            }
        }

        outcome
    }
}
