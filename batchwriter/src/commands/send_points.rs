use crate::config::options::{Options, PointInput};

use super::{add_input, open_client, report, STARTUP_FAILED};

/// Returns the process exit code.
pub async fn send_points(points: Vec<PointInput>, options: &Options) -> u8 {
    let client = match open_client(options).await {
        Ok(client) => client,
        Err(e) => {
            log::error!("failed to start: {:?}", e);
            return STARTUP_FAILED;
        }
    };

    let mut rejected = 0;
    for point in points {
        log::debug!("sending: {:?}", point);
        if !add_input(&client, point).await {
            rejected += 1;
        }
    }

    report(client.close().await, rejected)
}
