use clap::Parser;

use batchwriter::commands::{pipe_points::pipe_points, send_points::send_points};
use batchwriter::config::options::{Options, Subcommand};

fn dry_run(command: &[&str]) -> Options {
    let mut args = vec![
        "batchwriter",
        "--config-file",
        "/nonexistent/batchwriter.config",
        "--dry-run",
        "--max-buffered-points",
        "2",
    ];
    args.extend_from_slice(command);
    Options::try_parse_from(args).unwrap()
}

#[tokio::test]
async fn send_dry_run_writes_every_point() {
    let options = dry_run(&[
        "send",
        r#"{"measurement": "cpu", "value": 0.5, "tags": {"host": "a"}}"#,
        r#"{"measurement": "cpu", "value": 1, "fields": {"load": 3}}"#,
        r#"{"measurement": "mem", "value": true}"#,
    ]);
    let points = match &options.command {
        Subcommand::Send { points } => points.clone(),
        other => panic!("unexpected command {other:?}"),
    };

    assert_eq!(send_points(points, &options).await, 0);
}

#[tokio::test]
async fn send_dry_run_reports_rejected_points() {
    let options = dry_run(&[
        "send",
        r#"{"measurement": "", "value": 1}"#,
        r#"{"measurement": "cpu", "value": 1}"#,
    ]);
    let points = match &options.command {
        Subcommand::Send { points } => points.clone(),
        other => panic!("unexpected command {other:?}"),
    };

    assert_eq!(send_points(points, &options).await, 1);
}

#[tokio::test]
async fn pipe_dry_run_reads_until_eof() {
    let options = dry_run(&["pipe"]);
    let input = concat!(
        r#"{"measurement": "cpu", "value": 0.5}"#,
        "\n\n",
        r#"{"measurement": "cpu", "value": 0.75, "tags": {"host": "b"}}"#,
        "\n",
    );

    assert_eq!(pipe_points(&options, input.as_bytes()).await, 0);
}

#[tokio::test]
async fn pipe_dry_run_counts_unparseable_lines() {
    let options = dry_run(&["pipe"]);
    let input = "{not json\n{\"measurement\": \"cpu\", \"value\": 1}\n";

    assert_eq!(pipe_points(&options, input.as_bytes()).await, 1);
}
