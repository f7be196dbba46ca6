//! Background saving of published snapshots.
//!
//! One worker thread per store drains the queue in order. When several
//! snapshots are queued it only saves the newest, and it never saves a
//! revision older than one it already saved.

use std::sync::{Arc, Condvar, Mutex, PoisonError};

use remap_core::ProfileCollection;
use tokio::sync::mpsc;

use crate::app_core::StoreEvent;
use crate::ports::ProfileGateway;
use crate::subscription::Broadcaster;

#[derive(Default)]
struct Progress {
    queued: u64,
    done: u64,
}

#[derive(Default)]
struct Tracker {
    progress: Mutex<Progress>,
    cond: Condvar,
}

pub(crate) struct SaveQueue {
    tx: mpsc::UnboundedSender<Arc<ProfileCollection>>,
    tracker: Arc<Tracker>,
}

impl SaveQueue {
    pub(crate) fn start(
        gateway: Arc<dyn ProfileGateway>,
        broadcaster: Broadcaster,
    ) -> std::io::Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Arc<ProfileCollection>>();
        let tracker = Arc::new(Tracker::default());
        let worker_tracker = tracker.clone();

        std::thread::Builder::new()
            .name("remap-save-profiles".into())
            .spawn(move || {
                let mut last_saved: Option<u64> = None;

                while let Some(first) = rx.blocking_recv() {
                    let mut latest = first;
                    let mut taken = 1u64;
                    while let Ok(next) = rx.try_recv() {
                        latest = next;
                        taken += 1;
                    }

                    let revision = latest.revision();
                    if last_saved.is_some_and(|saved| saved >= revision) {
                        tracing::debug!("skipping save of stale revision {}", revision);
                    } else {
                        match gateway.save(&latest) {
                            Ok(()) => {
                                tracing::debug!("saved revision {}", revision);
                                last_saved = Some(revision);
                            }
                            Err(e) => {
                                tracing::warn!("failed to save revision {}: {:#}", revision, e);
                                broadcaster.send(StoreEvent::PersistenceFailed {
                                    revision,
                                    message: format!("{e:#}"),
                                });
                            }
                        }
                    }

                    let mut progress = worker_tracker
                        .progress
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    progress.done += taken;
                    worker_tracker.cond.notify_all();
                }
            })?;

        Ok(Self { tx, tracker })
    }

    pub(crate) fn enqueue(&self, snapshot: Arc<ProfileCollection>) {
        let mut progress = self
            .tracker
            .progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.tx.send(snapshot).is_ok() {
            progress.queued += 1;
        } else {
            tracing::error!("save worker is gone, snapshot will not be persisted");
        }
    }

    /// Blocks until every snapshot queued so far has been handled.
    pub(crate) fn flush(&self) {
        let mut progress = self
            .tracker
            .progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while progress.done < progress.queued {
            progress = self
                .tracker
                .cond
                .wait(progress)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}
