use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use playoff_api::Season;
use playoff_api::records::{BracketEntry, Edit, PlayerRecord, PoolKey, PoolRecord, RecordError};

/// Everything the worker needs to apply a bracket change against fresh store data.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub key: PoolKey,
    pub device_id: String,
    pub display_name: Option<String>,
    pub bracket: BracketEntry,
    pub edit: Edit,
    pub join_existing: bool,
}

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadPool { year: u16 },
    RefreshPool,
    Submit(SubmitRequest),
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    PoolLoaded { season: Season, records: Vec<PoolRecord> },
    /// The player row as stored; `None` when the last bracket was deleted.
    Submitted { player: Option<PlayerRecord>, edit: Edit },
    SubmitRejected { reason: RecordError },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
