#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use batchwriter::sink::{Sink, SinkError};
use communication::{FieldValue, Fields, Point, Tags};

#[derive(Debug, Clone)]
pub struct RecordedBatch {
    pub points: Vec<Point>,
    pub database: String,
    pub at: Instant,
    pub succeeded: bool,
}

/// A sink that remembers every write attempt. It can be told to fail,
/// to take its time, or to never return.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    recorded: Arc<Mutex<Vec<RecordedBatch>>>,
    failures_left: Arc<AtomicUsize>,
    write_delay: Duration,
    refuse_provision: bool,
    hang: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(failures: usize) -> Self {
        let sink = Self::default();
        sink.failures_left.store(failures, Ordering::SeqCst);
        sink
    }

    pub fn with_write_delay(write_delay: Duration) -> Self {
        Self {
            write_delay,
            ..Self::default()
        }
    }

    pub fn refusing_provision() -> Self {
        Self {
            refuse_provision: true,
            ..Self::default()
        }
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn recorded(&self) -> Vec<RecordedBatch> {
        self.recorded.lock().unwrap().clone()
    }

    /// Point ids per write attempt, in call order.
    pub fn batches(&self) -> Vec<Vec<i64>> {
        self.recorded().iter().map(|batch| ids(&batch.points)).collect()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    async fn provision(&self, database: &str) -> Result<(), SinkError> {
        if self.refuse_provision {
            return Err(SinkError::Rejected {
                reason: format!("database {database} is not allowed"),
            });
        }
        Ok(())
    }

    async fn write(&self, batch: &[Point], database: &str) -> Result<(), SinkError> {
        assert!(!batch.is_empty(), "sink called with an empty batch");
        if self.hang {
            std::future::pending::<()>().await;
        }
        if !self.write_delay.is_zero() {
            tokio::time::sleep(self.write_delay).await;
        }

        let succeeded = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_err();
        self.recorded.lock().unwrap().push(RecordedBatch {
            points: batch.to_vec(),
            database: database.to_string(),
            at: Instant::now(),
            succeeded,
        });

        if succeeded {
            Ok(())
        } else {
            Err(SinkError::Rejected {
                reason: "store unavailable".to_string(),
            })
        }
    }
}

/// A point whose `value` field doubles as its identity.
pub fn point(id: i64) -> Point {
    Point::new(
        "test",
        Tags::new(),
        Fields::from([("value".to_string(), FieldValue::Integer(id))]),
        None,
    )
    .unwrap()
}

pub fn ids(points: &[Point]) -> Vec<i64> {
    points
        .iter()
        .map(|point| match point.fields()["value"] {
            FieldValue::Integer(id) => id,
            ref other => panic!("unexpected value {other:?}"),
        })
        .collect()
}
