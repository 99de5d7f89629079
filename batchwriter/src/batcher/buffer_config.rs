use std::time::Duration;

use super::batch_error::BatchError;

/// How the flush loop batches. Fixed for the lifetime of one `Batcher`.
#[derive(Debug, Clone)]
pub struct BufferConfig {
    /// A batch is flushed as soon as it holds this many points.
    pub max_buffered_points: usize,
    /// No point waits longer than this between flushes.
    pub max_flush_interval: Duration,
    /// Passed to the sink with every batch.
    pub target_database: String,
    /// Bound of the ingest queue. Defaults to four batches' worth.
    pub queue_capacity: Option<usize>,
    /// How long a submission may wait for queue space before it is rejected.
    pub enqueue_timeout: Duration,
}

const QUEUED_BATCHES: usize = 4;

impl BufferConfig {
    pub fn new(target_database: impl Into<String>) -> Self {
        Self {
            max_buffered_points: 1000,
            max_flush_interval: Duration::from_secs(1),
            target_database: target_database.into(),
            queue_capacity: None,
            enqueue_timeout: Duration::from_millis(250),
        }
    }

    #[must_use]
    pub fn with_max_buffered_points(mut self, max_buffered_points: usize) -> Self {
        self.max_buffered_points = max_buffered_points;
        self
    }

    #[must_use]
    pub fn with_max_flush_interval(mut self, max_flush_interval: Duration) -> Self {
        self.max_flush_interval = max_flush_interval;
        self
    }

    #[must_use]
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = Some(queue_capacity);
        self
    }

    #[must_use]
    pub fn with_enqueue_timeout(mut self, enqueue_timeout: Duration) -> Self {
        self.enqueue_timeout = enqueue_timeout;
        self
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
            .unwrap_or_else(|| self.max_buffered_points.saturating_mul(QUEUED_BATCHES))
    }

    pub fn validate(&self) -> Result<(), BatchError> {
        if self.max_buffered_points == 0 {
            return Err(BatchError::InvalidConfig(
                "max_buffered_points must be at least 1".to_string(),
            ));
        }
        if self.max_flush_interval.is_zero() {
            return Err(BatchError::InvalidConfig(
                "max_flush_interval must be longer than zero".to_string(),
            ));
        }
        if self.queue_capacity() == 0 {
            return Err(BatchError::InvalidConfig(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.target_database.trim().is_empty() {
            return Err(BatchError::InvalidConfig(
                "target_database must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
