//! Arbitration supervisor - hands out exponent ranges and respawns workers.
//!
//! Flow:
//! 1. Every slot starts out needing work
//! 2. Assign each such slot the next contiguous range and spawn a worker
//! 3. Wait for the next worker event (or shutdown)
//! 4. On exhaustion: reap the worker thread, mark the slot as needing work,
//!    go to 2
//!
//! Runs until shutdown, or until the assignment budget (if any) is spent and
//! every slot has gone idle.

use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::calculation::{CalculationWorker, Completion};
use crate::config::SearchConfig;
use crate::divisor::DivisorSumEvaluator;
use crate::error::{Result, SearchError};
use crate::protocol::{Discovery, ExponentRange, SlotIndex, WorkerEvent};
use crate::slot::WorkerSlot;

/// One range handed to one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub slot: SlotIndex,
    #[serde(flatten)]
    pub range: ExponentRange,
}

/// What a supervisor run assigned and found, in order.
#[derive(Debug, Default)]
pub struct SearchReport {
    /// Number of ranges handed out.
    pub assigned: u64,
    /// Every assignment, recorded only when the run has an assignment budget.
    pub assignments: Vec<Assignment>,
    pub discoveries: Vec<Discovery>,
}

pub struct Supervisor {
    config: SearchConfig,
    evaluator: DivisorSumEvaluator,
    slots: Vec<WorkerSlot>,
    next_range: ExponentRange,
    events_tx: mpsc::UnboundedSender<WorkerEvent>,
    events_rx: mpsc::UnboundedReceiver<WorkerEvent>,
    shutdown: CancellationToken,
    report: SearchReport,
}

impl Supervisor {
    pub fn new(config: SearchConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let slots = (0..config.slots.get())
            .map(|i| WorkerSlot::new(SlotIndex::new(i)))
            .collect();
        let first = config.first_exponent;

        Self {
            evaluator: DivisorSumEvaluator::new(config.sum_workers),
            slots,
            next_range: ExponentRange::new(first, first.saturating_add(config.range_width)),
            events_tx,
            events_rx,
            shutdown: CancellationToken::new(),
            report: SearchReport::default(),
            config,
        }
    }

    /// Token that stops the search when cancelled. Cancellation reaches every
    /// running calculation worker and, through it, its sum workers.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn run(mut self) -> Result<SearchReport> {
        let mut needs_work: Vec<SlotIndex> = self.slots.iter().map(WorkerSlot::index).collect();

        loop {
            for slot in needs_work.drain(..) {
                self.respawn(slot)?;
            }

            if !self.slots.iter().any(WorkerSlot::is_running) {
                debug!(
                    assigned = self.report.assigned,
                    "Assignment budget spent and all slots idle"
                );
                break;
            }

            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested, stopping calculation workers");
                    self.drain().await?;
                    break;
                }

                event = self.events_rx.recv() => {
                    // We hold a sender ourselves, so the channel cannot close.
                    let Some(event) = event else {
                        let running = self.slots.iter().filter(|s| s.is_running()).count();
                        return Err(SearchError::EventChannelClosed(running));
                    };
                    if let Some(slot) = self.handle_event(event).await? {
                        needs_work.push(slot);
                    }
                }
            }
        }

        Ok(self.report)
    }

    fn budget_spent(&self) -> bool {
        self.config
            .assignment_budget
            .is_some_and(|budget| self.report.assigned >= budget)
    }

    /// Give `slot` the next range and start a worker on it.
    fn respawn(&mut self, slot: SlotIndex) -> Result<()> {
        if self.budget_spent() {
            debug!(%slot, "No assignments left, slot stays idle");
            return Ok(());
        }

        let range = self.next_range;
        self.next_range = range.next(self.config.range_width);

        info!(
            "Assigning work to calc thread {} from {} to {}",
            slot, range.start, range.end
        );

        let cancel = self.shutdown.child_token();
        let worker = CalculationWorker::new(
            slot,
            range,
            self.evaluator,
            self.events_tx.clone(),
            cancel.clone(),
        );
        let handle = worker.spawn()?;

        self.slots[slot.get()].occupy(range, handle, cancel);
        self.report.assigned += 1;
        if self.config.assignment_budget.is_some() {
            self.report.assignments.push(Assignment { slot, range });
        }
        Ok(())
    }

    /// Returns the slot to respawn, if the event freed one.
    async fn handle_event(&mut self, event: WorkerEvent) -> Result<Option<SlotIndex>> {
        match event {
            WorkerEvent::Found(discovery) => {
                debug!(
                    slot = %discovery.slot,
                    exponent = discovery.exponent,
                    "Discovery recorded"
                );
                self.report.discoveries.push(discovery);
                Ok(None)
            }
            WorkerEvent::Exhausted { slot, range } => {
                debug!(%slot, %range, "Calculation worker exhausted its range");
                self.reap(slot).await?;
                Ok(Some(slot))
            }
            WorkerEvent::Stopped { slot, range } => {
                debug!(%slot, %range, "Calculation worker stopped");
                self.reap(slot).await?;
                Ok(None)
            }
            WorkerEvent::Failed { slot, .. } => {
                // The thread result carries the error.
                self.reap(slot).await?;
                Ok(None)
            }
        }
    }

    async fn reap(&mut self, slot: SlotIndex) -> Result<()> {
        let Some(handle) = self.slots[slot.get()].release() else {
            return Ok(());
        };
        let completion = WorkerSlot::reap(slot, handle).await?;
        tracing::trace!(%slot, ?completion, "Calculation worker joined");
        Ok(())
    }

    /// Cancel and join every running worker, then collect any discoveries
    /// still queued. The first worker error wins.
    async fn drain(&mut self) -> Result<()> {
        for slot in &self.slots {
            slot.cancel();
        }

        let mut first_error = None;
        for slot in &mut self.slots {
            let range = slot.range();
            let Some(handle) = slot.release() else {
                continue;
            };
            debug!(slot = %slot.index(), ?range, "Joining cancelled calculation worker");
            match WorkerSlot::reap(slot.index(), handle).await {
                Ok(Completion::Exhausted | Completion::Stopped) => {}
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        while let Ok(event) = self.events_rx.try_recv() {
            if let WorkerEvent::Found(discovery) = event {
                self.report.discoveries.push(discovery);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
