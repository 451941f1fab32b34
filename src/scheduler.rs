//! Fixed-period sampling loop.
//!
//! Each tick either starts one collection task or, if the previous one is
//! still running, is skipped. Successful cycles are published through the
//! [`SnapshotStore`]; failures are logged and leave the published snapshot as
//! it was. Every outcome is also reported as a [`CycleEvent`] when an event
//! sender is attached.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::system::collector::Collector;
use crate::system::host::PlatformSource;
use crate::system::sensors::SensorSource;
use crate::system::store::SnapshotStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleEvent {
    Published {
        sequence: u64,
    },
    /// The cycle succeeded but a newer snapshot had already been published.
    Superseded {
        sequence: u64,
    },
    Failed {
        sequence: u64,
        component: &'static str,
        message: String,
    },
    /// A tick fired while a cycle was still in flight.
    Skipped,
}

pub enum TickOutcome {
    Started {
        sequence: u64,
        handle: JoinHandle<CycleEvent>,
    },
    Skipped,
}

pub struct Scheduler<P, S> {
    collector: Collector<P, S>,
    store: SnapshotStore,
    interval: Duration,
    next_sequence: AtomicU64,
    in_flight: AtomicBool,
    events: Option<mpsc::UnboundedSender<CycleEvent>>,
}

impl<P, S> Scheduler<P, S>
where
    P: PlatformSource + 'static,
    S: SensorSource + 'static,
{
    pub fn new(collector: Collector<P, S>, store: SnapshotStore, interval: Duration) -> Self {
        Scheduler {
            collector,
            store,
            interval,
            next_sequence: AtomicU64::new(1),
            in_flight: AtomicBool::new(false),
            events: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: mpsc::UnboundedSender<CycleEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run one cycle to completion on the caller's task.
    ///
    /// This bypasses the in-flight guard; ordering between overlapping calls
    /// is still enforced by sequence number at publish time.
    pub async fn run_once(&self) -> CycleEvent {
        let sequence = self.allocate_sequence();
        self.run_cycle(sequence).await
    }

    /// Start a cycle in the background unless one is already running.
    pub fn on_tick(self: &Arc<Self>) -> TickOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("previous sampling cycle still running, skipping tick");
            self.emit(CycleEvent::Skipped);
            return TickOutcome::Skipped;
        }

        let sequence = self.allocate_sequence();
        let scheduler = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let _in_flight = InFlight(&scheduler.in_flight);
            scheduler.run_cycle(sequence).await
        });

        TickOutcome::Started { sequence, handle }
    }

    /// Start the periodic loop. The first tick fires immediately.
    pub fn spawn(self) -> SchedulerHandle {
        let (stopper, stop_rx) = oneshot::channel();
        let scheduler = Arc::new(self);
        let task = tokio::spawn(scheduler.run(stop_rx));
        SchedulerHandle { stopper, task }
    }

    async fn run(self: Arc<Self>, mut stopper: oneshot::Receiver<()>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut current = None;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let TickOutcome::Started { handle, .. } = self.on_tick() {
                        current = Some(handle);
                    }
                }
                _ = &mut stopper => {
                    tracing::debug!("stopping scheduler");
                    break;
                }
            }
        }

        if let Some(handle) = current
            && let Err(e) = handle.await
        {
            tracing::error!(error = %e, "sampling task ended abnormally");
        }
    }

    async fn run_cycle(&self, sequence: u64) -> CycleEvent {
        let event = match self.collector.collect(sequence).await {
            Ok(snapshot) => {
                if self.store.publish(snapshot) {
                    tracing::debug!(sequence, "snapshot published");
                    CycleEvent::Published { sequence }
                } else {
                    tracing::debug!(sequence, "newer snapshot already published, dropping");
                    CycleEvent::Superseded { sequence }
                }
            }
            Err(e) => {
                tracing::warn!(
                    component = e.component(),
                    sequence,
                    error = %e,
                    "sampling cycle failed"
                );
                CycleEvent::Failed {
                    sequence,
                    component: e.component(),
                    message: e.to_string(),
                }
            }
        };

        self.emit(event.clone());
        event
    }

    fn allocate_sequence(&self) -> u64 {
        self.next_sequence.fetch_add(1, Ordering::Relaxed)
    }

    fn emit(&self, event: CycleEvent) {
        if let Some(events) = &self.events {
            // receiver gone just means nobody is listening
            let _ = events.send(event);
        }
    }
}

/// Clears the in-flight flag when a cycle task ends, including by panic.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Stops a spawned [`Scheduler`]. Dropping the handle also stops the loop.
pub struct SchedulerHandle {
    stopper: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop ticking and wait for the cycle in flight, if any.
    pub async fn shutdown(self) {
        let _ = self.stopper.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "scheduler task ended abnormally");
        }
    }
}
