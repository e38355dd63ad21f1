//! # Pool Module
//!
//! The bounded worker pool shared by the hashing and execution phases.
//!
//! `workers == 0` runs every item inline on the calling thread. Otherwise
//! exactly `workers` scoped threads pull items from one closing channel:
//! once the last item is queued the sender is dropped, each worker drains
//! what is left and exits, and the pool joins every worker before
//! returning. No worker outlives the call.

use crate::error::WorkerPanic;
use std::thread;
use tracing::debug;

/// A fixed-size pool of scoped workers
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Create a pool with `workers` threads (0 = run inline)
    pub fn new(workers: usize) -> Self {
        Self { workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task` exactly once for every item.
    ///
    /// Items are produced on the calling thread while workers consume them.
    pub fn run<T, I, F>(&self, items: I, task: F) -> Result<(), WorkerPanic>
    where
        T: Send,
        I: IntoIterator<Item = T>,
        F: Fn(T) + Sync,
    {
        if self.workers == 0 {
            items.into_iter().for_each(task);
            return Ok(());
        }

        let (sender, receiver) = crossbeam_channel::unbounded::<T>();
        let task = &task;

        thread::scope(|scope| {
            let handles: Vec<_> = (0..self.workers)
                .map(|id| {
                    let receiver = receiver.clone();
                    scope.spawn(move || {
                        debug!(worker = id, "pool worker started");
                        for item in receiver.iter() {
                            task(item);
                        }
                        debug!(worker = id, "pool worker drained queue");
                    })
                })
                .collect();
            drop(receiver);

            for item in items {
                // Every receiver is gone only if every worker panicked.
                if sender.send(item).is_err() {
                    break;
                }
            }
            drop(sender);

            let panicked = handles
                .into_iter()
                .map(|handle| handle.join())
                .filter(Result::is_err)
                .count();

            if panicked == 0 {
                Ok(())
            } else {
                Err(WorkerPanic {
                    panicked,
                    workers: self.workers,
                })
            }
        })
    }
}
