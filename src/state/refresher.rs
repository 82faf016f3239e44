use crate::state::messages::NetworkRequest;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Reloads results and brackets once a minute so the leaderboard follows
/// the games and other players' submissions.
pub struct PeriodicRefresher {
    network_requests: mpsc::Sender<NetworkRequest>,
}

impl PeriodicRefresher {
    pub fn new(network_requests: mpsc::Sender<NetworkRequest>) -> Self {
        Self { network_requests }
    }

    pub async fn run(self) {
        let mut pool_interval = interval(REFRESH_INTERVAL);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        pool_interval.tick().await;

        loop {
            pool_interval.tick().await;
            if self
                .network_requests
                .send(NetworkRequest::RefreshPool)
                .await
                .is_err()
            {
                break;
            }
        }
    }
}
