use thiserror::Error;

use communication::ConnectionError;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("store connection error")]
    Connection(#[from] ConnectionError),

    #[error("batch rejected: {reason}")]
    Rejected { reason: String },
}
