pub mod refresh;

pub use refresh::{CycleReport, RefreshHandle, RefreshScheduler};
