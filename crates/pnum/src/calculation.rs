//! Calculation worker - walks the primes of one exponent range.
//!
//! Each worker runs on its own OS thread and owns its range exclusively. For
//! every prime `p` in the range it builds `(2^p - 1) * 2^(p - 1)` and hands it
//! to a [`DivisorSumEvaluator`]. Hits and the final state of the worker are
//! reported to the supervisor over the event channel.

use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::candidate::{Primes, euclid_euler};
use crate::divisor::{DivisorSumEvaluator, Outcome};
use crate::error::{Result, SearchError};
use crate::protocol::{Discovery, ExponentRange, SlotIndex, WorkerEvent};

/// How a worker left its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Exhausted,
    Stopped,
}

pub struct CalculationWorker {
    slot: SlotIndex,
    range: ExponentRange,
    evaluator: DivisorSumEvaluator,
    events: mpsc::UnboundedSender<WorkerEvent>,
    cancel: CancellationToken,
}

impl CalculationWorker {
    pub fn new(
        slot: SlotIndex,
        range: ExponentRange,
        evaluator: DivisorSumEvaluator,
        events: mpsc::UnboundedSender<WorkerEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            slot,
            range,
            evaluator,
            events,
            cancel,
        }
    }

    /// Start the worker on a dedicated thread.
    pub fn spawn(self) -> Result<JoinHandle<Result<Completion>>> {
        let slot = self.slot;
        thread::Builder::new()
            .name(format!("calc-worker-{slot}"))
            .spawn(move || self.run())
            .map_err(|source| SearchError::SpawnCalculationWorker { slot, source })
    }

    /// Search the range, then announce how the worker ended. The terminal
    /// event is always the last message this worker sends.
    pub fn run(self) -> Result<Completion> {
        let result = self.search();

        let (slot, range) = (self.slot, self.range);
        let event = match &result {
            Ok(Completion::Exhausted) => WorkerEvent::Exhausted { slot, range },
            Ok(Completion::Stopped) => WorkerEvent::Stopped { slot, range },
            Err(e) => {
                tracing::error!(%slot, error = %e, "Calculation worker failed");
                WorkerEvent::Failed { slot, range }
            }
        };
        self.send(event);

        result
    }

    fn search(&self) -> Result<Completion> {
        tracing::debug!(slot = %self.slot, range = %self.range, "Calculation worker started");

        for p in Primes::in_range(self.range) {
            if self.cancel.is_cancelled() {
                return Ok(Completion::Stopped);
            }

            info!("P={}", p);

            let candidate = euclid_euler(p);
            let evaluation = self.evaluator.evaluate(&candidate, &self.cancel)?;

            match evaluation.outcome {
                Outcome::Perfect => {
                    info!(
                        "Thread {} - Found one: {} (P: {})",
                        self.slot, candidate, p
                    );
                    self.send(WorkerEvent::Found(Discovery {
                        slot: self.slot,
                        exponent: p,
                        value: candidate,
                    }));
                }
                Outcome::Cancelled => return Ok(Completion::Stopped),
                Outcome::Deficient | Outcome::Abundant => {
                    tracing::trace!(
                        slot = %self.slot,
                        exponent = p,
                        outcome = ?evaluation.outcome,
                        early_exit = evaluation.early_exit,
                        "Candidate is not perfect"
                    );
                }
            }
        }

        Ok(Completion::Exhausted)
    }

    fn send(&self, event: WorkerEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!(slot = %self.slot, "Supervisor gone, dropping worker event");
        }
    }
}
