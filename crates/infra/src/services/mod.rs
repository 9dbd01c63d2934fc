//! Engine services over a [`LedgerStore`](crate::store::LedgerStore).

pub mod journal;
pub mod limits;
pub mod recorder;
pub mod registry;

pub use journal::{JournalEntryDetail, JournalLineView, JournalService, Reversal};
pub use limits::LimitService;
pub use recorder::{RecordedTransaction, TransactionRecorder};
pub use registry::Registry;
