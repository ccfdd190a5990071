use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::bracket::{BracketGrid, FinalFourView, RegionView, scroll_to_show};
use crate::components::theme::{ThemeColor, resolve};
use crate::state::app_state::{Dialog, Page};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;

static TABS: &[&str; 2] = &["Bracket", "Picks"];

/// 63 games plus the champion.
const TOTAL_PICKS: usize = 64;

const KEY_LEGEND: &str =
    "Keys: h/l=round  j/k=slot  Tab=region  Enter=pick  t=strategy  a=autofill  s=submit  R=reset";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Bracket => draw_bracket(f, layout.main, app),
            MenuItem::Picks => draw_picks(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        draw_status(f, layout.status, app);

        if let Some(dialog) = &app.state.dialog {
            draw_dialog(f, f.area(), dialog);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Bracket => 0,
        MenuItem::Picks => 1,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_bracket(f: &mut Frame, area: Rect, app: &mut App) {
    let page = app.state.picker.page;
    let block = default_border(Color::White).title(format!(" {} ", page.label()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if !app.state.teams_loaded() {
        let msg = match app.state.status.as_ref().filter(|s| s.is_error) {
            Some(status) => format!("Could not load teams:\n{}", status.text),
            None => "Loading teams...".to_string(),
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let [header, key_legend, content] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let strategy = app.state.strategy.map_or("none", |s| s.label());
    let picks = app.state.engine.serialize().pick_count();
    let header_text =
        format!("{} | picks {picks}/{TOTAL_PICKS} | autofill: {strategy}", page.label());
    f.render_widget(Paragraph::new(header_text).style(resolve(ThemeColor::Primary)), header);
    f.render_widget(
        Paragraph::new(KEY_LEGEND).style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    let cursor = app.state.picker.slot_ref();
    match page {
        Page::Region(region) => {
            let grid = BracketGrid::for_region(region, content.width);
            if let Some(cell) = grid.cell_for(cursor) {
                let row = cell.slot_row(cursor.position);
                app.state.picker.scroll_offset =
                    scroll_to_show(row, app.state.picker.scroll_offset, content.height);
            }
            f.render_widget(
                RegionView {
                    bracket: app.state.engine.bracket(),
                    region,
                    grid: &grid,
                    cursor: Some(cursor),
                    scroll_offset: app.state.picker.scroll_offset,
                },
                content,
            );
        }
        Page::FinalFour => f.render_widget(
            FinalFourView { bracket: app.state.engine.bracket(), cursor: Some(cursor) },
            content,
        ),
    }
}

fn draw_picks(f: &mut Frame, area: Rect, app: &App) {
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);

    let payload = app.state.engine.serialize();
    let json = serde_json::to_string_pretty(&payload)
        .unwrap_or_else(|e| format!("could not serialize picks: {e}"));
    let user = app.settings.user_id.as_deref().unwrap_or("anonymous");
    let block = default_border(Color::White).title(format!(" Picks for {user} "));
    f.render_widget(
        Paragraph::new(json)
            .block(block)
            .scroll((app.state.picks_scroll, 0)),
        left,
    );

    let missing = app.state.engine.missing_picks();
    let block = default_border(Color::DarkGray).title(format!(" Missing ({}) ", missing.len()));
    let lines: Vec<Line> = if missing.is_empty() {
        vec![Line::styled("Every pick is made.", resolve(ThemeColor::Winner))]
    } else {
        missing.into_iter().map(Line::from).collect()
    };
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .scroll((app.state.picks_scroll, 0)),
        right,
    );
}

fn draw_help(f: &mut Frame, area: Rect) {
    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("{k:>12}  "), resolve(ThemeColor::Accent)),
            Span::raw(what),
        ])
    };
    let lines = vec![
        key("h/l ←/→", "previous / next round"),
        key("j/k ↓/↑", "move between slots"),
        key("Tab r", "next region page (West, South, East, Midwest, Final Four)"),
        key("Enter Space", "pick the team under the cursor"),
        key("t", "cycle the autofill strategy"),
        key("a", "autofill the whole bracket from the server"),
        key("s", "submit your picks"),
        key("R", "reset every pick"),
        key("1 2", "Bracket / Picks tab"),
        key("f", "full screen"),
        key("\"", "show logs"),
        key("Esc", "leave help"),
        key("q", "quit"),
    ];
    f.render_widget(
        Paragraph::new(lines).block(default_border(Color::DarkGray).title(" Help ")),
        area,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    f.render_widget(
        TuiLoggerWidget::default()
            .block(default_border(Color::DarkGray).title(" Logs "))
            .style_error(resolve(ThemeColor::Error))
            .style_warn(Style::default().fg(Color::Yellow))
            .style_info(Style::default().fg(Color::Gray)),
        area,
    );
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    if let Some(status) = &app.state.status {
        let style = if status.is_error {
            resolve(ThemeColor::Error)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!("[{}] ", status.at), resolve(ThemeColor::Dim)));
        spans.push(Span::styled(status.text.clone(), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_dialog(f: &mut Frame, area: Rect, dialog: &Dialog) {
    let (title, mut lines) = match dialog {
        Dialog::ConfirmSubmit { warnings } => {
            let mut lines = vec![Line::from("Your bracket is incomplete:"), Line::from("")];
            lines.extend(
                warnings
                    .iter()
                    .map(|w| Line::styled(format!("  {w}"), Style::default().fg(Color::Yellow))),
            );
            lines.push(Line::from(""));
            lines.push(Line::from("Submit anyway?"));
            (" Submit ", lines)
        }
        Dialog::ConfirmReset => (
            " Reset ",
            vec![Line::from("Clear every pick and start over?")],
        ),
    };
    lines.push(Line::from(""));
    lines.push(Line::styled("y = yes   n/Esc = no", resolve(ThemeColor::Dim)));

    let height = (lines.len() as u16 + 2).min(area.height);
    let width = 60.min(area.width);
    let rect = centered(area, width, height);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines)
            .block(default_border(Color::Yellow).title(title))
            .wrap(Wrap { trim: false }),
        rect,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;
    use picks_api::TeamSource;
    use picks_api::client::embedded_teams;
    use tui::backend::TestBackend;

    fn rendered(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        draw(&mut terminal, app, LoadingState::default());
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        let mut app = App::new(AppSettings::default());
        app.on_teams_loaded(embedded_teams().unwrap(), TeamSource::Embedded(2025));
        app
    }

    #[test]
    fn region_page_shows_the_first_round() {
        let mut app = app();
        let screen = rendered(&mut app, 120, 45);
        assert!(screen.contains("Florida"), "{screen}");
        assert!(screen.contains("TBD"));
        assert!(screen.contains("picks 0/64"));
    }

    #[test]
    fn cursor_far_down_scrolls_the_region() {
        let mut app = app();
        for _ in 0..15 {
            app.state.picker.move_down();
        }
        rendered(&mut app, 120, 24);
        assert!(app.state.picker.scroll_offset > 0);
    }

    #[test]
    fn final_four_page_shows_the_champion() {
        let mut app = app();
        for _ in 0..4 {
            app.state.picker.cycle_page();
        }
        let screen = rendered(&mut app, 120, 30);
        assert!(screen.contains("Champion: TBD"), "{screen}");
    }

    #[test]
    fn dialog_lists_the_warnings() {
        let mut app = app();
        app.request_submit();
        let screen = rendered(&mut app, 120, 45);
        assert!(screen.contains("No National Champion selected."), "{screen}");
        assert!(screen.contains("Submit anyway?"));
    }

    #[test]
    fn picks_tab_shows_the_payload() {
        let mut app = app();
        app.select_under_cursor();
        app.update_tab(MenuItem::Picks);
        let screen = rendered(&mut app, 140, 45);
        assert!(screen.contains("\"west_r64\""), "{screen}");
        assert!(screen.contains("Missing"));
    }
}
