//! Fixed worker pool over a shared cursor.
//!
//! # Responsibility
//! - Run N independent work units under a concurrency cap, preserving
//!   per-item result ordering.
//!
//! # Invariants
//! - Result slot `i` always holds the outcome of input `i`, regardless of
//!   completion order.
//! - Items are pulled one at a time from a shared cursor; they are never
//!   pre-partitioned across workers.
//! - Fail-fast mode is strictly sequential and stops dispatching after the
//!   first failure; later items are `Skipped`, never attempted.
//! - No timeout and no mid-batch cancellation beyond fail-fast; dispatched
//!   work runs to completion.

use log::info;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Terminal state of one work unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome<R, E> {
    /// The worker completed the unit.
    Ok(R),
    /// The worker attempted the unit and it failed.
    Failed(E),
    /// Never attempted because an earlier unit failed in fail-fast mode.
    Skipped,
}

impl<R, E> BatchOutcome<R, E> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// One positionally-indexed batch result.
///
/// `index` always equals the item's position in the original input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem<T, R, E> {
    pub index: usize,
    pub input: T,
    pub outcome: BatchOutcome<R, E>,
}

/// Aggregate accounting for one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchReport {
    /// Tallies outcomes from finished batch items.
    pub fn from_items<T, R, E>(items: &[BatchItem<T, R, E>]) -> Self {
        let mut report = Self {
            total: items.len(),
            ..Self::default()
        };
        for item in items {
            match &item.outcome {
                BatchOutcome::Ok(_) => {
                    report.attempted += 1;
                    report.succeeded += 1;
                }
                BatchOutcome::Failed(_) => {
                    report.attempted += 1;
                    report.failed += 1;
                }
                BatchOutcome::Skipped => report.skipped += 1,
            }
        }
        report
    }

    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

/// Runs `worker` over every item under a concurrency cap.
///
/// Concurrency is clamped to `1..=items.len()`. In fail-fast mode execution
/// is sequential and stops at the first failure. Otherwise a fixed pool of
/// scoped threads pulls items from a shared atomic cursor, so a slow item
/// never starves the pool through pre-partitioning.
pub fn run_batch<T, R, E, F>(
    items: Vec<T>,
    concurrency: usize,
    fail_fast: bool,
    worker: F,
) -> Vec<BatchItem<T, R, E>>
where
    T: Send + Sync,
    R: Send,
    E: Send,
    F: Fn(&T) -> Result<R, E> + Sync,
{
    if items.is_empty() {
        return Vec::new();
    }

    let outcomes = if fail_fast {
        run_sequential_fail_fast(&items, &worker)
    } else {
        run_pooled(&items, concurrency, &worker)
    };

    let results: Vec<BatchItem<T, R, E>> = items
        .into_iter()
        .zip(outcomes)
        .enumerate()
        .map(|(index, (input, outcome))| BatchItem {
            index,
            input,
            outcome,
        })
        .collect();

    let report = BatchReport::from_items(&results);
    info!(
        "event=batch_done module=batch total={} attempted={} succeeded={} failed={} skipped={} fail_fast={fail_fast}",
        report.total, report.attempted, report.succeeded, report.failed, report.skipped
    );
    results
}

fn run_sequential_fail_fast<T, R, E, F>(items: &[T], worker: &F) -> Vec<BatchOutcome<R, E>>
where
    F: Fn(&T) -> Result<R, E>,
{
    let mut outcomes = Vec::with_capacity(items.len());
    let mut halted = false;
    for item in items {
        if halted {
            outcomes.push(BatchOutcome::Skipped);
            continue;
        }
        match worker(item) {
            Ok(value) => outcomes.push(BatchOutcome::Ok(value)),
            Err(err) => {
                halted = true;
                outcomes.push(BatchOutcome::Failed(err));
            }
        }
    }
    outcomes
}

fn run_pooled<T, R, E, F>(items: &[T], concurrency: usize, worker: &F) -> Vec<BatchOutcome<R, E>>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(&T) -> Result<R, E> + Sync,
{
    let total = items.len();
    let workers = concurrency.clamp(1, total);
    let cursor = AtomicUsize::new(0);
    let slots: Mutex<Vec<Option<BatchOutcome<R, E>>>> =
        Mutex::new((0..total).map(|_| None).collect());

    std::thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                if index >= total {
                    break;
                }
                let outcome = match worker(&items[index]) {
                    Ok(value) => BatchOutcome::Ok(value),
                    Err(err) => BatchOutcome::Failed(err),
                };
                slots.lock()
                    .unwrap_or_else(PoisonError::into_inner)[index] = Some(outcome);
            });
        }
    });

    slots
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
        .into_iter()
        // Every slot below `total` was claimed by exactly one worker.
        .map(|slot| slot.unwrap_or(BatchOutcome::Skipped))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{run_batch, BatchOutcome, BatchReport};

    #[test]
    fn returns_positionally_stable_results_for_every_concurrency() {
        let items: Vec<usize> = (0..9).collect();
        for concurrency in 1..=items.len() {
            let results = run_batch(items.clone(), concurrency, false, |n| {
                if n % 3 == 0 {
                    Err(format!("item {n} failed"))
                } else {
                    Ok(n * 10)
                }
            });

            assert_eq!(results.len(), items.len());
            for (position, item) in results.iter().enumerate() {
                assert_eq!(item.index, position);
                assert_eq!(item.input, position);
                match &item.outcome {
                    BatchOutcome::Ok(value) => assert_eq!(*value, position * 10),
                    BatchOutcome::Failed(message) => {
                        assert_eq!(message, &format!("item {position} failed"))
                    }
                    BatchOutcome::Skipped => panic!("nothing is skipped without fail-fast"),
                }
            }
        }
    }

    #[test]
    fn non_fail_fast_attempts_everything_even_when_all_fail() {
        let results = run_batch((0..5).collect::<Vec<_>>(), 3, false, |_| {
            Err::<(), _>("boom".to_string())
        });
        let report = BatchReport::from_items(&results);
        assert_eq!(report.total, 5);
        assert_eq!(report.attempted, 5);
        assert_eq!(report.failed, 5);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn fail_fast_stops_dispatching_after_first_failure() {
        let results = run_batch((0..6).collect::<Vec<_>>(), 4, true, |n| {
            if *n == 2 {
                Err("boom".to_string())
            } else {
                Ok(*n)
            }
        });

        let report = BatchReport::from_items(&results);
        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.attempted + report.skipped, report.total);

        assert!(matches!(results[2].outcome, BatchOutcome::Failed(_)));
        assert!(matches!(results[3].outcome, BatchOutcome::Skipped));
        assert!(matches!(results[5].outcome, BatchOutcome::Skipped));
    }

    #[test]
    fn concurrency_is_clamped_to_item_count() {
        // More workers than items must not panic or drop results.
        let results = run_batch(vec![1, 2], 64, false, |n| Ok::<_, String>(*n));
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|item| item.outcome.is_ok()));

        // Zero requested concurrency degrades to one worker.
        let results = run_batch(vec![1, 2, 3], 0, false, |n| Ok::<_, String>(*n));
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let results = run_batch(Vec::<u8>::new(), 4, false, |_| Ok::<_, String>(()));
        assert!(results.is_empty());
    }

    #[test]
    fn report_counts_match_outcomes() {
        let results = run_batch((0..4).collect::<Vec<_>>(), 2, false, |n| {
            if *n == 1 {
                Err("one".to_string())
            } else {
                Ok(*n)
            }
        });
        let report = BatchReport::from_items(&results);
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failed, 1);
        assert!(!report.all_succeeded());
    }
}
