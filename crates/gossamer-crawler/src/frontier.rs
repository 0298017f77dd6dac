//! Deduplication and completion detection for one crawl session.
//!
//! Two single-owner tasks coordinate the traversal: a dedup task owning
//! the visited set and a counter task owning the pending-work count. All
//! producers talk to them through channels, so neither piece of state is
//! ever touched by two tasks.

use std::collections::HashSet;

use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};

use crate::page::Location;

/// Producer handle to a frontier. Cloned into every fetch worker; the
/// session keeps one for seeding the root.
#[derive(Debug, Clone)]
pub struct Frontier {
    tx_queue: mpsc::UnboundedSender<Location>,
    tx_pending: mpsc::UnboundedSender<i64>,
}

impl Frontier {
    /// Builds a frontier and returns it along with its output: the
    /// stream of distinct locations to fetch. The output channel closes
    /// exactly once, when no pending work remains.
    pub fn build() -> (Self, mpsc::UnboundedReceiver<Location>) {
        let (tx_queue, mut rx_queue) = mpsc::unbounded_channel::<Location>();
        let (tx_pending, mut rx_pending) = mpsc::unbounded_channel::<i64>();
        let (tx_locations, rx_locations) = mpsc::unbounded_channel::<Location>();
        let (tx_done, mut rx_done) = oneshot::channel::<()>();

        // Counter task: the only owner of the pending count. Every unit
        // of admitted work contributes +1 before it exists on the queue
        // and exactly one -1 once resolved, so the first zero is the
        // real end of the traversal. Signalling done exactly once closes
        // the pipeline.
        tokio::spawn(async move {
            let mut pending: i64 = 0;
            while let Some(delta) = rx_pending.recv().await {
                pending += delta;
                if pending == 0 {
                    let _ = tx_done.send(());
                    break;
                }
            }
        });

        // Dedup task: the only owner of the visited set. Distinct
        // locations go to the output, duplicates resolve as -1 pending.
        // Dropping `tx_locations` on exit is the single stop signal the
        // workers observe.
        let tx_pending_dedup = tx_pending.clone();
        tokio::spawn(async move {
            let mut visited: HashSet<String> = HashSet::new();
            loop {
                tokio::select! {
                    _ = &mut rx_done => break,
                    loc = rx_queue.recv() => {
                        let Some(loc) = loc else { break };
                        if visited.insert(loc.url.as_str().to_owned()) {
                            if tx_locations.send(loc).is_err() {
                                break;
                            }
                        } else {
                            log::debug!("already visited {}", loc.url);
                            if tx_pending_dedup.send(-1).is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        (
            Self {
                tx_queue,
                tx_pending,
            },
            rx_locations,
        )
    }

    /// Admits the root location: one pending unit, one intake message.
    /// Errors only if the frontier has already shut down.
    pub fn seed(&self, loc: Location) -> anyhow::Result<()> {
        self.tx_pending
            .send(1)
            .map_err(|_| anyhow!("frontier is closed"))?;
        self.tx_queue
            .send(loc)
            .map_err(|_| anyhow!("frontier is closed"))?;
        Ok(())
    }

    /// Reports one fetched location as resolved together with the K
    /// children it discovered. The single `K - 1` delta is sent before
    /// the children are enqueued: the increments for the children must
    /// reach the counter before any dedup or completion decrement for
    /// them can, otherwise the counter could transiently read zero with
    /// work still in flight.
    pub fn complete(&self, children: Vec<Location>) {
        let delta = children.len() as i64 - 1;
        if self.tx_pending.send(delta).is_err() {
            log::debug!("frontier closed, dropping pending delta {delta}");
            return;
        }
        for child in children {
            if self.tx_queue.send(child).is_err() {
                log::debug!("frontier closed, dropping discovered location");
                return;
            }
        }
    }
}
