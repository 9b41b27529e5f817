use thiserror::Error;

use crate::protocol::SlotIndex;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("failed to spawn calculation worker for slot {slot}: {source}")]
    SpawnCalculationWorker {
        slot: SlotIndex,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn sum worker {index}: {source}")]
    SpawnSumWorker {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("worker event channel closed while {0} slot(s) were still running")]
    EventChannelClosed(usize),

    #[error("calculation worker for slot {0} panicked")]
    WorkerPanicked(SlotIndex),
}

pub type Result<T> = std::result::Result<T, SearchError>;
