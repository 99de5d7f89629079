use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, Instant, Sleep};

use communication::Point;

use super::buffer_config::BufferConfig;
use super::point_buffer::PointBuffer;
use crate::sink::Sink;

pub(crate) type ShutdownAck = oneshot::Sender<FlushSummary>;

/// What the flush loop did over its lifetime. Handed back by `close`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    pub points_flushed: u64,
    pub batches_flushed: u64,
    pub failed_batches: u64,
    /// Points in batches the sink refused. They are not retried.
    pub points_lost: u64,
}

/// The single owner of the buffer, the timer and the sink.
///
/// Nothing else touches these; producers only reach the loop through the
/// ingest queue and the shutdown oneshot.
pub(super) struct FlushLoop<S> {
    sink: S,
    database: String,
    max_flush_interval: Duration,
    buffer: PointBuffer,
    ingest: mpsc::Receiver<Point>,
    shutdown: oneshot::Receiver<ShutdownAck>,
    timer: Pin<Box<Sleep>>,
    summary: FlushSummary,
}

impl<S: Sink> FlushLoop<S> {
    pub fn new(
        config: BufferConfig,
        sink: S,
        ingest: mpsc::Receiver<Point>,
        shutdown: oneshot::Receiver<ShutdownAck>,
    ) -> Self {
        Self {
            sink,
            buffer: PointBuffer::with_capacity(config.max_buffered_points),
            timer: Box::pin(sleep(config.max_flush_interval)),
            max_flush_interval: config.max_flush_interval,
            database: config.target_database,
            ingest,
            shutdown,
            summary: FlushSummary::default(),
        }
    }

    pub async fn run(mut self) {
        log::debug!("flush loop started for {}", self.database);
        loop {
            tokio::select! {
                // Shutdown first, then the timer, so neither a busy queue nor
                // a pending flush can starve termination.
                biased;

                request = &mut self.shutdown => {
                    // A dropped Batcher still gets its points flushed, it just
                    // has nobody to acknowledge.
                    self.shut_down(request.ok()).await;
                    return;
                }
                _ = self.timer.as_mut() => {
                    self.flush().await;
                }
                received = self.ingest.recv() => match received {
                    Some(point) => self.accept(point).await,
                    None => {
                        self.shut_down(None).await;
                        return;
                    }
                },
            }
        }
    }

    async fn accept(&mut self, point: Point) {
        self.buffer.push(point);
        if self.buffer.is_full() {
            self.flush().await;
        }
    }

    /// Hands the buffer to the sink and rearms the timer. The buffer is
    /// cleared whether or not the sink succeeded.
    async fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let count = self.buffer.len() as u64;
            match self.sink.write(self.buffer.points(), &self.database).await {
                Ok(()) => {
                    log::debug!("flushed {} points to {}", count, self.database);
                    self.summary.points_flushed += count;
                    self.summary.batches_flushed += 1;
                }
                Err(error) => {
                    log::error!(
                        "dropping batch of {} points for {}: {:?}",
                        count,
                        self.database,
                        error
                    );
                    self.summary.failed_batches += 1;
                    self.summary.points_lost += count;
                }
            }
            self.buffer.clear();
        }
        self.timer
            .as_mut()
            .reset(Instant::now() + self.max_flush_interval);
    }

    async fn shut_down(&mut self, ack: Option<ShutdownAck>) {
        // After close() every new send fails, but sends that already hold a
        // queue slot still land; recv() returns None once those are drained.
        self.ingest.close();
        let mut drained: u64 = 0;
        while let Some(point) = self.ingest.recv().await {
            drained += 1;
            self.accept(point).await;
        }
        self.flush().await;

        log::info!(
            "flush loop for {} stopped after draining {} queued points: {:?}",
            self.database,
            drained,
            self.summary
        );
        if let Some(ack) = ack {
            if ack.send(self.summary).is_err() {
                log::warn!("close requester went away before shutdown was acknowledged");
            }
        }
    }
}
