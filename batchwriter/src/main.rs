use std::process::ExitCode;

use tokio::io::BufReader;

use batchwriter::commands::{pipe_points::pipe_points, send_points::send_points};
use batchwriter::config::{cli_config::get_args, options::Subcommand};

#[tokio::main]
async fn main() -> ExitCode {
    let args = get_args();

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .default_filter_or(&args.log_level)
            .default_write_style_or("always"),
    )
    .init();

    let code = match &args.command {
        Subcommand::Send { points } => send_points(points.clone(), &args).await,
        Subcommand::Pipe => pipe_points(&args, BufReader::new(tokio::io::stdin())).await,
    };
    ExitCode::from(code)
}
