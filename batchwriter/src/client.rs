use communication::{ConnectionConfig, FieldValue, Fields, Point, StoreConnection, Tags};

use crate::batcher::{BatchError, Batcher, BufferConfig, FlushSummary, IngestHandle};
use crate::sink::{Sink, StoreSink};

/// The field `add` stores its value under.
pub const VALUE_FIELD: &str = "value";

/// Buffered writes to a time-series store.
///
/// `add` only queues; batches are written in the background by the
/// [`Batcher`]. Call [`BufferedClient::close`] to flush what is left.
pub struct BufferedClient {
    batcher: Batcher,
}

impl BufferedClient {
    /// Connects to the store over http and makes sure the target database
    /// exists before accepting points.
    pub async fn connect(
        connection: ConnectionConfig,
        buffer: BufferConfig,
    ) -> Result<BufferedClient, BatchError> {
        let connection = StoreConnection::new(connection)?;
        Self::with_sink(StoreSink::new(connection), buffer).await
    }

    pub async fn with_sink<S: Sink>(
        sink: S,
        buffer: BufferConfig,
    ) -> Result<BufferedClient, BatchError> {
        let batcher = Batcher::start(buffer, sink).await?;
        Ok(BufferedClient { batcher })
    }

    /// Queues one measurement stamped with the current time. `value` is
    /// stored as the `value` field and overrides a `value` entry in `fields`.
    /// Returns whether the point was accepted.
    pub async fn add(
        &self,
        measurement: &str,
        value: impl Into<FieldValue>,
        tags: Tags,
        fields: Option<Fields>,
    ) -> bool {
        match build_point(measurement, value.into(), tags, fields) {
            Some(point) => self.batcher.submit(point).await,
            None => false,
        }
    }

    /// Like [`BufferedClient::add`] but never waits for queue space.
    pub fn try_add(
        &self,
        measurement: &str,
        value: impl Into<FieldValue>,
        tags: Tags,
        fields: Option<Fields>,
    ) -> bool {
        match build_point(measurement, value.into(), tags, fields) {
            Some(point) => self.batcher.try_submit(point),
            None => false,
        }
    }

    pub async fn add_point(&self, point: Point) -> bool {
        self.batcher.submit(point).await
    }

    pub fn handle(&self) -> IngestHandle {
        self.batcher.ingest_handle()
    }

    /// Flushes everything accepted so far and stops the background task.
    pub async fn close(self) -> Result<FlushSummary, BatchError> {
        self.batcher.close().await
    }
}

fn build_point(
    measurement: &str,
    value: FieldValue,
    tags: Tags,
    fields: Option<Fields>,
) -> Option<Point> {
    let mut fields = fields.unwrap_or_default();
    fields.insert(VALUE_FIELD.to_string(), value);

    match Point::new(measurement, tags, fields, None) {
        Ok(point) => Some(point),
        Err(e) => {
            log::warn!("rejecting point: {e}");
            None
        }
    }
}
