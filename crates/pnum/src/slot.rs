//! WorkerSlot - one position in the calculation worker pool.
//!
//! Slots are created once at startup and reused for every respawn. Only the
//! supervisor mutates them.

use std::thread::JoinHandle;

use tokio_util::sync::CancellationToken;

use crate::calculation::Completion;
use crate::error::{Result, SearchError};
use crate::protocol::{ExponentRange, SlotIndex};

type WorkerHandle = JoinHandle<Result<Completion>>;

pub struct WorkerSlot {
    index: SlotIndex,
    range: Option<ExponentRange>,
    handle: Option<WorkerHandle>,
    cancel: Option<CancellationToken>,
}

impl WorkerSlot {
    pub fn new(index: SlotIndex) -> Self {
        Self {
            index,
            range: None,
            handle: None,
            cancel: None,
        }
    }

    pub fn index(&self) -> SlotIndex {
        self.index
    }

    /// Range most recently assigned to this slot.
    pub fn range(&self) -> Option<ExponentRange> {
        self.range
    }

    /// Whether a worker thread is attached and not yet reaped.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Attach a freshly spawned worker. The previous worker must have been
    /// reaped first.
    pub fn occupy(
        &mut self,
        range: ExponentRange,
        handle: WorkerHandle,
        cancel: CancellationToken,
    ) {
        debug_assert!(self.handle.is_none(), "slot occupied twice");
        self.range = Some(range);
        self.handle = Some(handle);
        self.cancel = Some(cancel);
    }

    /// Request cooperative cancellation of the attached worker, if any.
    pub fn cancel(&self) {
        if let Some(cancel) = &self.cancel {
            cancel.cancel();
        }
    }

    /// Detach the worker so it can be joined. The range is kept.
    pub fn release(&mut self) -> Option<WorkerHandle> {
        self.cancel = None;
        self.handle.take()
    }

    /// Join a released worker handle off the async runtime.
    pub async fn reap(index: SlotIndex, handle: WorkerHandle) -> Result<Completion> {
        match tokio::task::spawn_blocking(move || handle.join()).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) | Err(_) => Err(SearchError::WorkerPanicked(index)),
        }
    }
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        if self.handle.is_some() {
            tracing::warn!(slot = %self.index, "Slot dropped with a running worker; cancelling it");
            self.cancel();
        }
    }
}
