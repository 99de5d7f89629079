use std::time::Duration;

use clap::Parser;
use lazy_static::lazy_static;
use serde::Deserialize;

use super::cli_config::default_dir;
use communication::{Fields, FieldValue, Precision, Tags};

lazy_static! {
    static ref DEFAULT_DIR: String = default_dir();
}

#[derive(Debug, Parser)]
#[clap(about = "Buffered writer for a time-series store", args_override_self = true)]
pub struct Options {
    #[clap(long, default_value = &**DEFAULT_DIR)]
    pub config_file: String,
    #[clap(long, default_value = "http://localhost:8086")]
    pub server: String,
    #[clap(long, default_value = "batchwriter")]
    pub database: String,
    #[clap(long)]
    pub retention_policy: Option<String>,
    #[clap(long)]
    pub username: Option<String>,
    #[clap(long, env = "BATCHWRITER_PASSWORD")]
    pub password: Option<String>,
    #[clap(long, default_value = "ns", value_parser = parse_precision)]
    pub precision: Precision,
    #[clap(long, default_value = "1000")]
    pub max_buffered_points: usize,
    #[clap(long, default_value = "1s", value_parser = humantime::parse_duration)]
    pub max_flush_interval: Duration,
    #[clap(long, help = "Ingest queue bound. Defaults to 4x max-buffered-points")]
    pub queue_capacity: Option<usize>,
    #[clap(long, default_value = "info")]
    pub log_level: String,
    #[clap(long, help = "Log batches instead of writing them to the server")]
    pub dry_run: bool,

    #[clap(subcommand)]
    pub command: Subcommand,
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    #[clap(about = "Send points given as json arguments")]
    Send {
        #[arg(value_parser = parse_point)]
        points: Vec<PointInput>,
    },
    #[clap(about = "Send json points read line by line from stdin")]
    Pipe,
}

/// One point as written on the command line or stdin, e.g.
/// `{"measurement": "cpu", "value": 0.5, "tags": {"host": "a"}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PointInput {
    pub measurement: String,
    pub value: FieldValue,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub fields: Option<Fields>,
}

pub fn parse_point(value: &str) -> anyhow::Result<PointInput> {
    serde_json::from_str(value).map_err(|e| anyhow::anyhow!("could not parse point: {e:?}"))
}

fn parse_precision(value: &str) -> anyhow::Result<Precision> {
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("could not parse precision: {e}"))
}
