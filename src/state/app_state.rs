use crate::app::MenuItem;
use chrono::Local;
use picks_api::{
    AutofillStrategy, BracketEngine, ContainerId, Position, Region, RegionRound, SlotRef,
    TeamSource,
};

// ---------------------------------------------------------------------------
// Picker cursor
// ---------------------------------------------------------------------------

/// One screen of the bracket tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Region(Region),
    FinalFour,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Region(Region::West),
        Page::Region(Region::South),
        Page::Region(Region::East),
        Page::Region(Region::Midwest),
        Page::FinalFour,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Page::Region(region) => region.label(),
            Page::FinalFour => "Final Four",
        }
    }

    fn next(self) -> Self {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// East and Midwest are drawn right to left.
    fn mirrored(self) -> bool {
        matches!(self, Page::Region(Region::East | Region::Midwest))
    }

    fn columns(self) -> usize {
        match self {
            Page::Region(_) => RegionRound::ALL.len(),
            Page::FinalFour => 3,
        }
    }

    fn container(self, column: usize) -> ContainerId {
        match self {
            Page::Region(region) => ContainerId::regional(region, RegionRound::ALL[column]),
            Page::FinalFour => crate::components::bracket::FINAL_FOUR_COLUMNS[column],
        }
    }

    fn rows(self, column: usize) -> usize {
        self.container(column).capacity() * 2
    }
}

/// Cursor over the slots of the current page. A column is a round (or one
/// of the three Final Four containers) and a row is a slot within it, two
/// per matchup.
#[derive(Debug, Clone)]
pub struct PickerState {
    pub page: Page,
    pub column: usize,
    pub row: usize,
    /// Vertical scroll for region pages taller than the pane.
    pub scroll_offset: u16,
}

impl Default for PickerState {
    fn default() -> Self {
        Self { page: Page::Region(Region::West), column: 0, row: 0, scroll_offset: 0 }
    }
}

impl PickerState {
    pub fn slot_ref(&self) -> SlotRef {
        SlotRef::new(
            self.page.container(self.column),
            self.row / 2,
            Position::from_index(self.row),
        )
    }

    pub fn cycle_page(&mut self) {
        self.page = self.page.next();
        self.column = 0;
        self.row = 0;
        self.scroll_offset = 0;
    }

    pub fn move_left(&mut self) {
        if self.page.mirrored() { self.toward_final() } else { self.toward_first() }
    }

    pub fn move_right(&mut self) {
        if self.page.mirrored() { self.toward_first() } else { self.toward_final() }
    }

    pub fn move_down(&mut self) {
        let max = self.page.rows(self.column).saturating_sub(1);
        self.row = (self.row + 1).min(max);
    }

    pub fn move_up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    /// One round later: the slot this matchup's winner lands in.
    fn toward_final(&mut self) {
        match self.page {
            Page::Region(_) => {
                let Some(next) = RegionRound::ALL[self.column].next() else { return };
                self.column = next.depth();
                self.row /= 2;
            }
            Page::FinalFour => {
                if self.column + 1 < self.page.columns() {
                    self.column += 1;
                }
            }
        }
    }

    /// One round earlier: the top slot of the matchup feeding this slot.
    fn toward_first(&mut self) {
        match self.page {
            Page::Region(_) => {
                let Some(prev) = RegionRound::ALL[self.column].prev() else { return };
                self.column = prev.depth();
                self.row *= 2;
            }
            Page::FinalFour => self.column = self.column.saturating_sub(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests, dialogs and the status line
// ---------------------------------------------------------------------------

/// A server round trip that blocks starting another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    LoadTeams,
    Autofill,
    Submit,
}

impl PendingAction {
    pub fn label(&self) -> &'static str {
        match self {
            PendingAction::LoadTeams => "Loading teams",
            PendingAction::Autofill => "Autofill",
            PendingAction::Submit => "Submission",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    /// Picks are incomplete; lists what is missing before sending anyway.
    ConfirmSubmit { warnings: Vec<String> },
    ConfirmReset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
    pub at: String,
}

impl StatusLine {
    pub fn info(text: impl Into<String>) -> Self {
        Self::at_now(text.into(), false)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::at_now(text.into(), true)
    }

    fn at_now(text: String, is_error: bool) -> Self {
        Self { text, is_error, at: Local::now().format("%H:%M:%S").to_string() }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub engine: BracketEngine,
    /// Set once the Round of 64 field is in the store.
    pub teams_source: Option<TeamSource>,
    /// `None` until the user picks one with `t`.
    pub strategy: Option<AutofillStrategy>,
    pub pending: Option<PendingAction>,
    pub dialog: Option<Dialog>,
    pub status: Option<StatusLine>,
    pub picker: PickerState,
    pub picks_scroll: u16,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn teams_loaded(&self) -> bool {
        self.teams_source.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker(page: Page) -> PickerState {
        PickerState { page, ..PickerState::default() }
    }

    #[test]
    fn starts_on_west_first_slot() {
        let p = PickerState::default();
        assert_eq!(
            p.slot_ref(),
            SlotRef::new(ContainerId::regional(Region::West, RegionRound::R64), 0, Position::Top)
        );
    }

    #[test]
    fn rows_map_to_matchup_and_position() {
        let mut p = PickerState::default();
        for _ in 0..5 {
            p.move_down();
        }
        let slot = p.slot_ref();
        assert_eq!(slot.index, 2);
        assert_eq!(slot.position, Position::Bottom);
    }

    #[test]
    fn moving_down_stops_at_the_last_slot() {
        let mut p = PickerState::default();
        for _ in 0..40 {
            p.move_down();
        }
        assert_eq!(p.row, 15);
        p.move_up();
        assert_eq!(p.row, 14);
    }

    #[test]
    fn moving_toward_the_final_follows_the_winner() {
        let mut p = PickerState::default();
        p.row = 13; // r64[6] bottom
        p.move_right();
        assert_eq!(
            p.slot_ref(),
            SlotRef::new(ContainerId::regional(Region::West, RegionRound::R32), 3, Position::Top)
        );
        p.move_right();
        p.move_right();
        assert_eq!(p.slot_ref().container, ContainerId::regional(Region::West, RegionRound::E8));
        assert_eq!(p.slot_ref().position, Position::Bottom);
        p.move_right();
        assert_eq!(p.column, 3);
    }

    #[test]
    fn moving_back_lands_on_the_feeding_matchup() {
        let mut p = PickerState::default();
        p.column = 2;
        p.row = 3; // s16[1] bottom, fed by r32[3]
        p.move_left();
        assert_eq!(
            p.slot_ref(),
            SlotRef::new(ContainerId::regional(Region::West, RegionRound::R32), 3, Position::Top)
        );
        p.column = 0;
        p.move_left();
        assert_eq!(p.column, 0);
    }

    #[test]
    fn mirrored_regions_swap_directions() {
        let mut p = picker(Page::Region(Region::East));
        p.move_left();
        assert_eq!(p.slot_ref().container, ContainerId::regional(Region::East, RegionRound::R32));
        p.move_right();
        assert_eq!(p.slot_ref().container, ContainerId::regional(Region::East, RegionRound::R64));
    }

    #[test]
    fn final_four_page_has_three_columns_of_two() {
        let mut p = picker(Page::FinalFour);
        assert_eq!(p.slot_ref(), SlotRef::new(ContainerId::FfLeft, 0, Position::Top));
        p.move_down();
        p.move_down();
        assert_eq!(p.slot_ref(), SlotRef::new(ContainerId::FfLeft, 0, Position::Bottom));
        p.move_right();
        assert_eq!(p.slot_ref(), SlotRef::new(ContainerId::Championship, 0, Position::Bottom));
        p.move_right();
        p.move_right();
        assert_eq!(p.slot_ref().container, ContainerId::FfRight);
    }

    #[test]
    fn cycling_pages_visits_every_region_then_final_four() {
        let mut p = PickerState::default();
        p.row = 7;
        let mut seen = vec![p.page];
        for _ in 0..4 {
            p.cycle_page();
            seen.push(p.page);
        }
        assert_eq!(seen, Page::ALL.to_vec());
        assert_eq!(p.row, 0);
        p.cycle_page();
        assert_eq!(p.page, Page::Region(Region::West));
    }
}
