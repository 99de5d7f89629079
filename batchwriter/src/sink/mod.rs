use async_trait::async_trait;

use communication::Point;

pub mod logging_sink;
pub mod sink_error;
pub mod store_sink;

pub use logging_sink::LoggingSink;
pub use sink_error::SinkError;
pub use store_sink::StoreSink;

/// Where flushed batches go.
///
/// The flush loop awaits each call before doing anything else, so an
/// implementation never sees two calls at once from the same `Batcher`.
#[async_trait]
pub trait Sink: Send + Sync + 'static {
    /// Called once while the `Batcher` starts. An error aborts startup.
    async fn provision(&self, _database: &str) -> Result<(), SinkError> {
        Ok(())
    }

    /// Never called with an empty batch.
    async fn write(&self, batch: &[Point], database: &str) -> Result<(), SinkError>;
}
