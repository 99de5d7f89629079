use thiserror::Error;

use communication::ConnectionError;

use crate::sink::sink_error::SinkError;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("invalid buffer configuration: {0}")]
    InvalidConfig(String),

    #[error("could not connect to the store")]
    Connection(#[from] ConnectionError),

    #[error("could not provision the target database")]
    Provision(#[source] SinkError),

    #[error("flush loop stopped before acknowledging shutdown")]
    LoopTerminated(#[source] Option<tokio::task::JoinError>),
}
