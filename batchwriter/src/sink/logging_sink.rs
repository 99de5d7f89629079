use async_trait::async_trait;

use communication::{encode_point, Point, Precision, Tags};

use super::{Sink, SinkError};

/// Logs each batch as line protocol instead of sending it anywhere.
#[derive(Debug, Default, Clone)]
pub struct LoggingSink {
    precision: Precision,
}

impl LoggingSink {
    pub fn new(precision: Precision) -> Self {
        Self { precision }
    }
}

#[async_trait]
impl Sink for LoggingSink {
    async fn provision(&self, database: &str) -> Result<(), SinkError> {
        log::info!("dry run: not creating database {database}");
        Ok(())
    }

    async fn write(&self, batch: &[Point], database: &str) -> Result<(), SinkError> {
        log::info!("dry run: batch of {} points for {database}", batch.len());
        let mut line = String::new();
        for point in batch {
            line.clear();
            encode_point(point, self.precision, &Tags::new(), &mut line);
            log::info!("{}", line.trim_end());
        }
        Ok(())
    }
}
