use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, Dialog, PendingAction, StatusLine};
use crate::state::messages::NetworkRequest;
use log::{debug, info, warn};
use picks_api::{
    AutofillPayload, AutofillStrategy, BracketError, Evicted, RegionTeams, SubmitRequest,
    Successor, TeamSource,
};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Bracket,
    Picks,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        Self { state: AppState::new(), settings }
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_teams_loaded(&mut self, teams: RegionTeams, source: TeamSource) {
        self.state.pending = None;
        match self.state.engine.load_initial_teams(&teams) {
            Ok(()) => {
                self.set_status(StatusLine::info(format!("Loaded 64 teams from the {source}")));
                self.state.teams_source = Some(source);
            }
            Err(e) => self.on_error(format!("Could not load teams from the {source}: {e}")),
        }
    }

    pub fn on_autofill_loaded(&mut self, payload: AutofillPayload) {
        self.state.pending = None;
        match self.state.engine.apply_autofill(&payload) {
            Ok(()) => {
                let picks = self.state.engine.serialize().pick_count();
                let strategy = self.state.strategy.map_or("server", |s| s.label());
                self.set_status(StatusLine::info(format!(
                    "Autofill ({strategy}) made {picks} picks"
                )));
                if self.state.teams_source.is_none() {
                    self.state.teams_source = Some(TeamSource::Server);
                }
            }
            Err(e) => self.on_error(format!("Autofill rejected: {e}")),
        }
    }

    pub fn on_submitted(&mut self, message: String) {
        self.state.pending = None;
        info!("submission accepted: {message}");
        self.set_status(StatusLine::info(message));
    }

    pub fn on_error(&mut self, message: String) {
        self.state.pending = None;
        self.set_status(StatusLine::error(message));
    }

    fn set_status(&mut self, status: StatusLine) {
        self.state.status = Some(status);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        if next == MenuItem::Picks {
            self.state.picks_scroll = 0;
        }
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn picks_scroll_down(&mut self) {
        self.state.picks_scroll = self.state.picks_scroll.saturating_add(1);
    }

    pub fn picks_scroll_up(&mut self) {
        self.state.picks_scroll = self.state.picks_scroll.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Picking
    // -----------------------------------------------------------------------

    /// Pick the team under the cursor as its matchup's winner. Placeholders
    /// are ignored.
    pub fn select_under_cursor(&mut self) {
        let slot = self.state.picker.slot_ref();
        let name = self
            .state
            .engine
            .bracket()
            .slot(slot)
            .and_then(|s| s.name())
            .map(str::to_string);

        match self.state.engine.select(slot) {
            Ok(outcome) => {
                let name = name.unwrap_or_default();
                let mut text = match outcome.advanced_to {
                    Some(Successor::Slot(target)) => {
                        format!("{name} advances to the {}", target.container.label())
                    }
                    Some(Successor::Champion) => format!("{name} is your National Champion"),
                    None => format!("{name} picked"),
                };
                if !outcome.evicted.is_empty() {
                    let cleared: Vec<String> = outcome
                        .evicted
                        .iter()
                        .map(|e| match e {
                            Evicted::Slot(at, team) => {
                                format!("{} ({})", team.name, at.container.label())
                            }
                            Evicted::Champion(team) => format!("{} (champion)", team.name),
                        })
                        .collect();
                    text.push_str(&format!("; cleared {}", cleared.join(", ")));
                }
                self.set_status(StatusLine::info(text));
            }
            Err(BracketError::Placeholder(slot)) => debug!("ignoring pick on empty {slot}"),
            Err(e) => {
                warn!("pick failed: {e}");
                self.on_error(e.to_string());
            }
        }
    }

    pub fn cycle_strategy(&mut self) {
        self.state.strategy = AutofillStrategy::cycle(self.state.strategy);
        let label = self.state.strategy.map_or("none", |s| s.label());
        self.set_status(StatusLine::info(format!("Autofill strategy: {label}")));
    }

    // -----------------------------------------------------------------------
    // Server actions. Each returns the request to send, if any.
    // -----------------------------------------------------------------------

    pub fn start_loading_teams(&mut self) -> NetworkRequest {
        self.state.pending = Some(PendingAction::LoadTeams);
        NetworkRequest::LoadTeams
    }

    pub fn request_autofill(&mut self) -> Option<NetworkRequest> {
        if self.refuse_while_pending() {
            return None;
        }
        let name = self.state.strategy.map_or("none", |s| s.name());
        let strategy = match AutofillStrategy::parse(name) {
            Ok(strategy) => strategy,
            Err(e) => {
                self.set_status(StatusLine::error(e.to_string()));
                return None;
            }
        };
        self.state.pending = Some(PendingAction::Autofill);
        self.set_status(StatusLine::info(format!("Requesting autofill ({})...", strategy.label())));
        Some(NetworkRequest::Autofill { strategy })
    }

    /// Submit right away when every pick is made, otherwise ask first.
    pub fn request_submit(&mut self) -> Option<NetworkRequest> {
        if self.refuse_while_pending() {
            return None;
        }
        let warnings = self.state.engine.completeness_warnings();
        if warnings.is_empty() {
            return Some(self.submit_request());
        }
        self.state.dialog = Some(Dialog::ConfirmSubmit { warnings });
        None
    }

    pub fn request_reset(&mut self) {
        if self.refuse_while_pending() {
            return;
        }
        self.state.dialog = Some(Dialog::ConfirmReset);
    }

    /// `y` in a dialog.
    pub fn confirm_dialog(&mut self) -> Option<NetworkRequest> {
        match self.state.dialog.take()? {
            Dialog::ConfirmSubmit { .. } => Some(self.submit_request()),
            Dialog::ConfirmReset => {
                self.state.engine.reset();
                self.set_status(StatusLine::info("Bracket reset"));
                None
            }
        }
    }

    /// `n` or Esc in a dialog.
    pub fn cancel_dialog(&mut self) {
        if self.state.dialog.take().is_some() {
            debug!("dialog dismissed");
        }
    }

    fn submit_request(&mut self) -> NetworkRequest {
        self.state.pending = Some(PendingAction::Submit);
        self.set_status(StatusLine::info("Submitting bracket..."));
        NetworkRequest::Submit {
            request: SubmitRequest {
                user_id: self.settings.user_id.clone(),
                bracket: self.state.engine.serialize(),
            },
        }
    }

    fn refuse_while_pending(&mut self) -> bool {
        let Some(pending) = self.state.pending else {
            return false;
        };
        self.set_status(StatusLine::error(format!("{} already in progress", pending.label())));
        true
    }
}
