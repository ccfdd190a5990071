use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use picks_api::{AutofillPayload, AutofillStrategy, RegionTeams, SubmitRequest, TeamSource};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadTeams,
    Autofill { strategy: AutofillStrategy },
    Submit { request: SubmitRequest },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    TeamsLoaded { teams: RegionTeams, source: TeamSource },
    AutofillLoaded { payload: AutofillPayload },
    Submitted { message: String },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
