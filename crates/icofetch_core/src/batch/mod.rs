//! Bounded-concurrency batch execution.

mod executor;

pub use executor::{run_batch, BatchItem, BatchOutcome, BatchReport};
