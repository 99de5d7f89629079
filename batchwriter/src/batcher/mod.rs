//! The buffering engine.
//!
//! A [`Batcher`] owns one background task that collects submitted points and
//! hands them to a [`Sink`] in batches: when a batch reaches
//! `max_buffered_points`, when `max_flush_interval` has passed since the last
//! flush, and one final time on [`Batcher::close`].
//!
//! Delivery is at most once. A batch the sink refuses is logged, counted in
//! the [`FlushSummary`] and dropped. Every point accepted before `close` is
//! called reaches the sink. Once `close` has begun every submission, from
//! the batcher or any [`IngestHandle`], is rejected with `false` and never
//! reaches the sink. Buffered points live only in memory and are lost if the
//! process dies before they are flushed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use communication::Point;

use crate::sink::Sink;

mod batch_error;
mod buffer_config;
mod flush_loop;
mod point_buffer;

pub use batch_error::BatchError;
pub use buffer_config::BufferConfig;
pub use flush_loop::FlushSummary;

use flush_loop::{FlushLoop, ShutdownAck};

pub struct Batcher {
    shutdown: oneshot::Sender<ShutdownAck>,
    ingest: IngestHandle,
    task: JoinHandle<()>,
}

impl Batcher {
    /// Validates the config, provisions the target database through the sink
    /// and spawns the flush loop. Must be called inside a tokio runtime.
    pub async fn start<S: Sink>(config: BufferConfig, sink: S) -> Result<Batcher, BatchError> {
        config.validate()?;
        sink.provision(&config.target_database)
            .await
            .map_err(BatchError::Provision)?;

        log::info!(
            "starting batcher for {}: {} points or {:?} per batch, queue of {}",
            config.target_database,
            config.max_buffered_points,
            config.max_flush_interval,
            config.queue_capacity(),
        );

        let (tx, rx) = mpsc::channel(config.queue_capacity());
        let (shutdown, shutdown_rx) = oneshot::channel();
        let ingest = IngestHandle {
            tx,
            closing: Arc::new(AtomicBool::new(false)),
            enqueue_timeout: config.enqueue_timeout,
        };
        let task = tokio::spawn(FlushLoop::new(config, sink, rx, shutdown_rx).run());

        Ok(Batcher {
            shutdown,
            ingest,
            task,
        })
    }

    pub async fn submit(&self, point: Point) -> bool {
        self.ingest.submit(point).await
    }

    pub fn try_submit(&self, point: Point) -> bool {
        self.ingest.try_submit(point)
    }

    /// A cloneable producer handle, for submitting from other tasks.
    pub fn ingest_handle(&self) -> IngestHandle {
        self.ingest.clone()
    }

    /// Stops intake, flushes everything that was queued and waits for the
    /// final sink call to return. Consumes the batcher: there is exactly one
    /// close per batcher.
    pub async fn close(self) -> Result<FlushSummary, BatchError> {
        let Batcher {
            shutdown,
            ingest,
            task,
        } = self;

        // Handles must refuse points before the loop is asked to stop: it may
        // be inside a sink call and not close the queue for a while.
        ingest.closing.store(true, Ordering::SeqCst);

        let (ack, ack_rx) = oneshot::channel();
        // Request shutdown before letting go of our sender, so the loop sees
        // the request rather than a queue with no producers.
        let requested = shutdown.send(ack).is_ok();
        drop(ingest);

        let summary = if requested { ack_rx.await.ok() } else { None };
        match (summary, task.await) {
            (Some(summary), _) => Ok(summary),
            (None, joined) => Err(BatchError::LoopTerminated(joined.err())),
        }
    }
}

/// Producer side of the ingest queue.
#[derive(Debug, Clone)]
pub struct IngestHandle {
    tx: mpsc::Sender<Point>,
    /// Raised by `Batcher::close`, shared by every clone.
    closing: Arc<AtomicBool>,
    enqueue_timeout: Duration,
}

impl IngestHandle {
    /// Queues a point, waiting up to the configured enqueue timeout for
    /// space. `false` means the point was not accepted: the queue stayed full
    /// or the batcher is shutting down.
    pub async fn submit(&self, point: Point) -> bool {
        if self.is_closing() {
            log::debug!("batcher is closing, rejecting point");
            return false;
        }
        match tokio::time::timeout(self.enqueue_timeout, self.tx.reserve()).await {
            Ok(Ok(permit)) => {
                // close may have begun while we waited for a slot.
                if self.is_closing() {
                    log::debug!("batcher is closing, rejecting point");
                    return false;
                }
                permit.send(point);
                true
            }
            Ok(Err(_)) => {
                log::debug!("batcher is closed, rejecting point");
                false
            }
            Err(_) => {
                log::warn!(
                    "ingest queue stayed full for {:?}, rejecting point",
                    self.enqueue_timeout
                );
                false
            }
        }
    }

    /// Queues a point without waiting.
    pub fn try_submit(&self, point: Point) -> bool {
        if self.is_closing() {
            log::debug!("batcher is closing, rejecting point");
            return false;
        }
        match self.tx.try_send(point) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::warn!("ingest queue is full, rejecting point");
                false
            }
            Err(TrySendError::Closed(_)) => {
                log::debug!("batcher is closed, rejecting point");
                false
            }
        }
    }

    /// True once `close` has begun or the flush loop has stopped.
    pub fn is_closed(&self) -> bool {
        self.is_closing() || self.tx.is_closed()
    }

    fn is_closing(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }
}
