use crate::state::messages::{NetworkRequest, NetworkResponse, SubmitRequest};
use log::{debug, error, info};
use playoff_api::client::{ApiError, PoolApi, decode_rows};
use playoff_api::records::{Edit, Submission, partition, submit_bracket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

pub struct NetworkWorker {
    client: PoolApi,
    year: u16,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: PoolApi,
        year: u16,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            year,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = match request {
                NetworkRequest::LoadPool { year } => {
                    self.year = year;
                    self.handle_load_pool().await
                }
                NetworkRequest::RefreshPool => self.handle_load_pool().await,
                NetworkRequest::Submit(submit) => self.handle_submit(submit).await,
            };

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_pool(&self) -> Result<NetworkResponse, ApiError> {
        debug!("loading pool for {}", self.year);
        let season = self.client.fetch_season(self.year).await?;
        let records = if self.client.is_offline() {
            Vec::new()
        } else {
            self.client.fetch_records(self.year, None).await?
        };
        Ok(NetworkResponse::PoolLoaded { season, records })
    }

    /// Apply a submission to the group as currently stored, then write it back.
    ///
    /// The lock flag comes from the requested year only; a store outage is
    /// reported as an error rather than judged against a fallback season.
    async fn handle_submit(&self, request: SubmitRequest) -> Result<NetworkResponse, ApiError> {
        let season = self.client.fetch_season_exact(request.key.year).await?;
        let rows = self.client.fetch_group_rows(&request.key).await?;
        let (players, _) = partition(decode_rows(rows));

        let submission = Submission {
            key: &request.key,
            device_id: &request.device_id,
            display_name: request.display_name.as_deref(),
            bracket: request.bracket,
            edit: request.edit,
            games_started: season.games_started,
            join_existing: request.join_existing,
        };
        let player = match submit_bracket(&players, &submission) {
            Ok(player) => player,
            Err(reason) => return Ok(NetworkResponse::SubmitRejected { reason }),
        };

        if player.brackets.is_empty() {
            info!("removing {} from {}", player.name, request.key);
            self.client.delete_player(&request.key, &player.name).await?;
            return Ok(NetworkResponse::Submitted { player: None, edit: request.edit });
        }

        match request.edit {
            Edit::Add => info!("adding a bracket for {} in {}", player.name, request.key),
            Edit::Replace(i) => info!("saving {} #{} in {}", player.name, i + 1, request.key),
            Edit::Delete(i) => info!("deleting {} #{} in {}", player.name, i + 1, request.key),
        }
        self.client.save_player(&player).await?;
        Ok(NetworkResponse::Submitted { player: Some(player), edit: request.edit })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
