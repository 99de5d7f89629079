use async_trait::async_trait;

use communication::{Point, StoreConnection};

use super::{Sink, SinkError};

/// Writes batches to the remote store over http.
#[derive(Debug, Clone)]
pub struct StoreSink {
    connection: StoreConnection,
}

impl StoreSink {
    pub fn new(connection: StoreConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl Sink for StoreSink {
    async fn provision(&self, database: &str) -> Result<(), SinkError> {
        self.connection.create_database(database).await?;
        Ok(())
    }

    async fn write(&self, batch: &[Point], database: &str) -> Result<(), SinkError> {
        self.connection.write(batch, database).await?;
        Ok(())
    }
}
