//! Collecting query results, optionally in budgeted batches.
//!
//! [`Materializer`] is a pull-based evaluator for large candidate sets. Each
//! call to [`Materializer::next_batch`] processes records until its budget
//! runs out, decoding payloads the query needs on the way, and reports
//! progress. Dropping it part way leaves nothing running.

use crate::record::CandidateRecord;
use crate::search::types::CompiledQuery;
use crate::tag::DecoderRegistry;
use std::time::{Duration, Instant};

/// Collect a lazy result sequence, in order.
pub fn materialize<'a>(
    results: impl IntoIterator<Item = &'a CandidateRecord>,
) -> Vec<&'a CandidateRecord> {
    results.into_iter().collect()
}

/// Decides when a batch should stop.
pub trait Budget {
    /// Called at the start of every batch.
    fn start(&mut self);

    /// Whether the batch is done after `processed` records.
    fn exhausted(&self, processed: usize) -> bool;
}

/// Stop a batch after a wall-clock duration.
#[derive(Debug, Clone, Copy)]
pub struct TimeBudget {
    limit: Duration,
    started: Instant,
}

impl TimeBudget {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            started: Instant::now(),
        }
    }
}

impl Default for TimeBudget {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

impl Budget for TimeBudget {
    fn start(&mut self) {
        self.started = Instant::now();
    }

    fn exhausted(&self, _processed: usize) -> bool {
        self.started.elapsed() >= self.limit
    }
}

/// Stop a batch after a fixed number of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountBudget(pub usize);

impl Budget for CountBudget {
    fn start(&mut self) {}

    fn exhausted(&self, processed: usize) -> bool {
        processed >= self.0
    }
}

/// Receives `processed / total` after every batch.
pub trait ProgressSink {
    fn report(&mut self, processed: usize, total: usize);
}

impl<F: FnMut(usize, usize)> ProgressSink for F {
    fn report(&mut self, processed: usize, total: usize) {
        self(processed, total)
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _processed: usize, _total: usize) {}
}

pub struct Materializer<'a> {
    query: &'a CompiledQuery,
    records: &'a [CandidateRecord],
    decoders: &'a dyn DecoderRegistry,
    budget: Box<dyn Budget + 'a>,
    progress: Box<dyn ProgressSink + 'a>,
    position: usize,
}

impl<'a> Materializer<'a> {
    /// Materialize the query's own search targets.
    pub fn new(query: &'a CompiledQuery, decoders: &'a dyn DecoderRegistry) -> Self {
        Self::over(query, &query.search_targets, decoders)
    }

    /// Materialize an explicit record slice.
    pub fn over(
        query: &'a CompiledQuery,
        records: &'a [CandidateRecord],
        decoders: &'a dyn DecoderRegistry,
    ) -> Self {
        Self {
            query,
            records,
            decoders,
            budget: Box::new(TimeBudget::default()),
            progress: Box::new(NoProgress),
            position: 0,
        }
    }

    pub fn with_budget(mut self, budget: impl Budget + 'a) -> Self {
        self.budget = Box::new(budget);
        self
    }

    pub fn with_progress(mut self, progress: impl ProgressSink + 'a) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn processed(&self) -> usize {
        self.position
    }

    pub fn is_done(&self) -> bool {
        self.position >= self.records.len()
    }

    /// Process the next batch, returning its matches. `None` once every
    /// record has been processed. A batch always makes progress.
    pub fn next_batch(&mut self) -> Option<Vec<&'a CandidateRecord>> {
        if self.is_done() {
            return None;
        }
        self.budget.start();
        let records = self.records;
        let mut matches = Vec::new();
        let mut in_batch = 0;
        while let Some(record) = records.get(self.position) {
            self.query.prepare(record, self.decoders);
            if self.query.matches(record) {
                matches.push(record);
            }
            self.position += 1;
            in_batch += 1;
            if self.budget.exhausted(in_batch) {
                break;
            }
        }
        let total = self.total();
        self.progress.report(self.position, total);
        log::debug!(
            "batch of {} records, {} matched ({}/{})",
            in_batch,
            matches.len(),
            self.position,
            total
        );
        Some(matches)
    }

    /// Run every remaining batch and collect the matches in order.
    pub fn run(self) -> Vec<&'a CandidateRecord> {
        self.flatten().collect()
    }
}

impl<'a> Iterator for Materializer<'a> {
    type Item = Vec<&'a CandidateRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch()
    }
}
