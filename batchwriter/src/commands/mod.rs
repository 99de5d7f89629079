use communication::ConnectionConfig;

use crate::batcher::{BatchError, BufferConfig, FlushSummary};
use crate::client::BufferedClient;
use crate::config::options::{Options, PointInput};
use crate::sink::LoggingSink;

pub mod pipe_points;
pub mod send_points;

const STARTUP_FAILED: u8 = 2;

/// Builds the client the options describe: the http store, or a logging
/// sink for `--dry-run`.
pub async fn open_client(options: &Options) -> Result<BufferedClient, BatchError> {
    let mut buffer = BufferConfig::new(&options.database)
        .with_max_buffered_points(options.max_buffered_points)
        .with_max_flush_interval(options.max_flush_interval);
    if let Some(queue_capacity) = options.queue_capacity {
        buffer = buffer.with_queue_capacity(queue_capacity);
    }

    if options.dry_run {
        return BufferedClient::with_sink(LoggingSink::new(options.precision), buffer).await;
    }

    BufferedClient::connect(connection_config(options), buffer).await
}

fn connection_config(options: &Options) -> ConnectionConfig {
    let mut connection = ConnectionConfig::new(&options.server).with_precision(options.precision);
    if let Some(username) = &options.username {
        connection = connection.with_credentials(
            username,
            options.password.clone().unwrap_or_default(),
        );
    }
    if let Some(retention_policy) = &options.retention_policy {
        connection = connection.with_retention_policy(retention_policy);
    }
    connection
}

async fn add_input(client: &BufferedClient, input: PointInput) -> bool {
    client
        .add(&input.measurement, input.value, input.tags, input.fields)
        .await
}

/// Logs how the run went and turns it into a process exit code: 0 when
/// every point was written, 1 when some were rejected or lost, 2 when the
/// batcher could not shut down cleanly.
fn report(result: Result<FlushSummary, BatchError>, rejected: usize) -> u8 {
    match result {
        Ok(summary) => {
            log::info!(
                "wrote {} points in {} batches; {} points lost in {} failed batches; {} rejected",
                summary.points_flushed,
                summary.batches_flushed,
                summary.points_lost,
                summary.failed_batches,
                rejected,
            );
            if summary.failed_batches > 0 || rejected > 0 {
                1
            } else {
                0
            }
        }
        Err(e) => {
            log::error!("failed to close cleanly: {:?}", e);
            2
        }
    }
}
