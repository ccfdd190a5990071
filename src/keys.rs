use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::error;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Runs with the app locked from start to finish, so a pick and its cascade
/// never interleave with a network response.
pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    if guard.state.dialog.is_some() {
        let request = match (key_event.code, key_event.modifiers) {
            (Char('y') | Char('Y') | KeyCode::Enter, _) => guard.confirm_dialog(),
            (Char('n') | Char('N') | KeyCode::Esc, _) => {
                guard.cancel_dialog();
                None
            }
            (Char('c'), KeyModifiers::CONTROL) => quit(),
            _ => None,
        };
        send(network_requests, request).await;
        return;
    }

    let request = match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => quit(),

        // Tab switching
        (_, Char('1'), _) => {
            guard.update_tab(MenuItem::Bracket);
            None
        }
        (_, Char('2'), _) => {
            guard.update_tab(MenuItem::Picks);
            None
        }
        (_, Char('?'), _) => {
            guard.update_tab(MenuItem::Help);
            None
        }
        (MenuItem::Help, KeyCode::Esc, _) => {
            guard.exit_help();
            None
        }

        // Cursor
        (MenuItem::Bracket, Char('l') | KeyCode::Right, _) => {
            guard.state.picker.move_right();
            None
        }
        (MenuItem::Bracket, Char('h') | KeyCode::Left, _) => {
            guard.state.picker.move_left();
            None
        }
        (MenuItem::Bracket, Char('j') | KeyCode::Down, _) => {
            guard.state.picker.move_down();
            None
        }
        (MenuItem::Bracket, Char('k') | KeyCode::Up, _) => {
            guard.state.picker.move_up();
            None
        }
        (MenuItem::Bracket, Char('r') | KeyCode::Tab, _) => {
            guard.state.picker.cycle_page();
            None
        }
        (MenuItem::Bracket, KeyCode::Enter | Char(' '), _) => {
            guard.select_under_cursor();
            None
        }

        // Picks list
        (MenuItem::Picks, Char('j') | KeyCode::Down, _) => {
            guard.picks_scroll_down();
            None
        }
        (MenuItem::Picks, Char('k') | KeyCode::Up, _) => {
            guard.picks_scroll_up();
            None
        }

        // Server actions
        (_, Char('t'), _) => {
            guard.cycle_strategy();
            None
        }
        (_, Char('a'), _) => guard.request_autofill(),
        (_, Char('s'), _) => guard.request_submit(),
        (_, Char('R'), _) => {
            guard.request_reset();
            None
        }

        // Display
        (_, Char('f'), _) => {
            guard.toggle_full_screen();
            None
        }
        (_, Char('"'), _) => {
            guard.toggle_show_logs();
            None
        }
        _ => None,
    };

    send(network_requests, request).await;
}

async fn send(network_requests: &mpsc::Sender<NetworkRequest>, request: Option<NetworkRequest>) {
    if let Some(request) = request
        && let Err(e) = network_requests.send(request).await
    {
        error!("Failed to queue network request: {e}");
    }
}

fn quit() -> ! {
    crate::cleanup_terminal();
    std::process::exit(0);
}
