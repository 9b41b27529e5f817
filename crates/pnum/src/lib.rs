//! pnum: concurrent search for perfect numbers of the Euclid-Euler form.

mod calculation;
mod slot;

pub mod candidate;
pub mod config;
pub mod divisor;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod supervisor;

pub use calculation::{CalculationWorker, Completion};
pub use config::SearchConfig;
pub use divisor::{DivisorSumEvaluator, Evaluation, Outcome};
pub use error::{Result, SearchError};
pub use protocol::{Discovery, ExponentRange, SlotIndex, WorkerEvent};
pub use slot::WorkerSlot;
pub use supervisor::{Assignment, SearchReport, Supervisor};
