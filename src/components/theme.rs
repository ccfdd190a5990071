use picks_api::SlotStatus;
use tui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeColor {
    Primary,
    Accent,
    Dim,
    Winner,
    Error,
}

pub fn resolve(color: ThemeColor) -> Style {
    match color {
        ThemeColor::Primary => Style::default().fg(Color::Rgb(0, 122, 195)),
        ThemeColor::Accent => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ThemeColor::Dim => Style::default().fg(Color::Indexed(240)),
        ThemeColor::Winner => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ThemeColor::Error => Style::default().fg(Color::Red),
    }
}

/// Style of one slot line. The cursor adds reverse video on top of the
/// status style so marks stay visible under it.
pub fn slot_style(status: SlotStatus, under_cursor: bool) -> Style {
    let style = match status {
        SlotStatus::Selected => resolve(ThemeColor::Winner),
        SlotStatus::Eliminated => resolve(ThemeColor::Dim).add_modifier(Modifier::CROSSED_OUT),
        SlotStatus::Placeholder => resolve(ThemeColor::Dim),
        SlotStatus::Open => Style::default().fg(Color::Gray),
    };
    if under_cursor {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_slots_are_bold_winner_colour() {
        let style = slot_style(SlotStatus::Selected, false);
        assert_eq!(style.fg, Some(Color::Green));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn eliminated_slots_are_dim_and_crossed_out() {
        let style = slot_style(SlotStatus::Eliminated, false);
        assert_eq!(style.fg, Some(Color::Indexed(240)));
        assert!(style.add_modifier.contains(Modifier::CROSSED_OUT));
        assert!(!style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn cursor_reverses_without_losing_status() {
        let style = slot_style(SlotStatus::Eliminated, true);
        assert!(style.add_modifier.contains(Modifier::REVERSED));
        assert!(style.add_modifier.contains(Modifier::CROSSED_OUT));
        assert!(!slot_style(SlotStatus::Open, false).add_modifier.contains(Modifier::REVERSED));
    }
}
