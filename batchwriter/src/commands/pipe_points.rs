use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::options::{parse_point, Options};

use super::{add_input, open_client, report, STARTUP_FAILED};

/// Reads one json point per line until EOF. Returns the process exit code.
pub async fn pipe_points<R>(options: &Options, input: R) -> u8
where
    R: AsyncBufRead + Unpin,
{
    let client = match open_client(options).await {
        Ok(client) => client,
        Err(e) => {
            log::error!("failed to start: {:?}", e);
            return STARTUP_FAILED;
        }
    };

    let mut lines = input.lines();
    let mut rejected = 0;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("failed to read input: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_point(&line) {
            Ok(point) => {
                if !add_input(&client, point).await {
                    rejected += 1;
                }
            }
            Err(e) => {
                log::warn!("skipping line: {e}");
                rejected += 1;
            }
        }
    }

    report(client.close().await, rejected)
}
