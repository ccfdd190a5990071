use picks_api::{
    Bracket, ContainerId, Matchup, MatchupState, Position, Region, RegionRound, Slot, SlotRef,
};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::Style;
use tui::widgets::Widget;

use crate::components::theme::{ThemeColor, resolve, slot_style};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per matchup cell: top slot, state line, bottom slot.
pub const MATCHUP_HEIGHT: u16 = 3;

/// Slot heights for each bracket depth (d=0 = Round of 64 leaf, d=3 = Elite Eight root).
/// Formula: SH[0] = MATCHUP_HEIGHT; SH[d] = 2 * SH[d-1] + 1.
const SH: [u16; 4] = [
    MATCHUP_HEIGHT,                                   // R64: 3
    2 * MATCHUP_HEIGHT + 1,                           // R32: 7
    2 * (2 * MATCHUP_HEIGHT + 1) + 1,                 // S16: 15
    2 * (2 * (2 * MATCHUP_HEIGHT + 1) + 1) + 1,       // E8:  31
];

/// Total terminal rows consumed by one regional bracket. Equals SH[3] = 31.
pub const REGION_HEIGHT: u16 = SH[3];

/// Width of the connector zone drawn between adjacent round columns.
pub const CONNECTOR_WIDTH: u16 = 3;

/// Maximum matchup cell width in wider terminals.
const CELL_W_FULL: u16 = 24;

// ---------------------------------------------------------------------------
// MatchupCell: pre-computed position for one matchup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MatchupCell {
    /// Row of the state line (center of the 3-row cell), relative to the top
    /// of the region. Not scroll-adjusted.
    pub center_row: u16,
    /// Starting x-column within the grid.
    pub col: u16,
    pub cell_width: u16,
    pub round: RegionRound,
    /// Index of this matchup within its round.
    pub index: usize,
}

impl MatchupCell {
    /// Bracket-relative row of a slot line.
    pub fn slot_row(&self, position: Position) -> u16 {
        match position {
            Position::Top => self.center_row.saturating_sub(1),
            Position::Bottom => self.center_row.saturating_add(1),
        }
    }
}

// ---------------------------------------------------------------------------
// BracketGrid: layout engine for one regional bracket
// ---------------------------------------------------------------------------

/// Pre-computed layout for one region (Round of 64 → Elite Eight).
///
/// Column order left → right: R64 | conn | R32 | conn | S16 | conn | E8
#[derive(Debug, Clone)]
pub struct BracketGrid {
    /// All cells in depth-major order: 8 + 4 + 2 + 1 = 15 cells.
    pub cells: Vec<MatchupCell>,
    /// Starting x-column for each round column, indexed by depth.
    pub round_cols: [u16; 4],
    pub cell_width: u16,
    /// When true, the Round of 64 is on the right and the Elite Eight on the
    /// left. Used for the East and Midwest, which feed the right semifinal.
    pub mirrored: bool,
}

impl BracketGrid {
    /// Compute the layout for the given width.
    ///
    /// `4 * cell_width + 3 * CONNECTOR_WIDTH <= width`. Center rows follow
    /// `center[d][i] = SH[d]/2 + i * (SH[d+1] - SH[d])`:
    ///   R64 (d=0): [1, 5, 9, 13, 17, 21, 25, 29]
    ///   R32 (d=1): [3, 11, 19, 27]
    ///   S16 (d=2): [7, 23]
    ///   E8  (d=3): [15]
    pub fn compute(width: u16) -> Self {
        Self::compute_inner(width, false)
    }

    pub fn compute_mirrored(width: u16) -> Self {
        Self::compute_inner(width, true)
    }

    pub fn for_region(region: Region, width: u16) -> Self {
        match region {
            Region::West | Region::South => Self::compute(width),
            Region::East | Region::Midwest => Self::compute_mirrored(width),
        }
    }

    fn compute_inner(width: u16, mirrored: bool) -> Self {
        let connector_total = CONNECTOR_WIDTH * 3;
        let per_col = width.saturating_sub(connector_total) / 4;
        let cell_width: u16 = per_col.clamp(1, CELL_W_FULL);
        let stride = cell_width + CONNECTOR_WIDTH;
        let round_cols = if mirrored {
            [stride * 3, stride * 2, stride, 0u16]
        } else {
            [0u16, stride, stride * 2, stride * 3]
        };

        let first_center = [SH[0] / 2, SH[1] / 2, SH[2] / 2, SH[3] / 2];
        let spacing: [u16; 4] = [SH[1] - SH[0], SH[2] - SH[1], SH[3] - SH[2], 0];

        let mut cells = Vec::with_capacity(15);
        for round in RegionRound::ALL {
            let d = round.depth();
            for i in 0..round.matchup_count() {
                cells.push(MatchupCell {
                    center_row: first_center[d] + i as u16 * spacing[d],
                    col: round_cols[d],
                    cell_width,
                    round,
                    index: i,
                });
            }
        }

        Self { cells, round_cols, cell_width, mirrored }
    }

    /// Cells for a specific depth (0 = Round of 64 .. 3 = Elite Eight).
    pub fn cells_for_depth(&self, depth: usize) -> &[MatchupCell] {
        const OFFSETS: [usize; 5] = [0, 8, 12, 14, 15];
        &self.cells[OFFSETS[depth]..OFFSETS[depth + 1]]
    }

    pub fn cell(&self, round: RegionRound, index: usize) -> Option<&MatchupCell> {
        self.cells_for_depth(round.depth()).get(index)
    }

    /// The cell drawing `slot`, if it belongs to a regional round.
    pub fn cell_for(&self, slot: SlotRef) -> Option<&MatchupCell> {
        match slot.container {
            ContainerId::Regional { round, .. } => self.cell(round, slot.index),
            _ => None,
        }
    }
}

/// Scroll offset that keeps `row` visible in a window of `height` rows,
/// moving as little as possible from `current`.
pub fn scroll_to_show(row: u16, current: u16, height: u16) -> u16 {
    if height == 0 {
        return current;
    }
    let max_scroll = REGION_HEIGHT.saturating_sub(height);
    let scroll = if row < current {
        row
    } else if row >= current + height {
        row + 1 - height
    } else {
        current
    };
    scroll.min(max_scroll)
}

// ---------------------------------------------------------------------------
// RegionView widget
// ---------------------------------------------------------------------------

/// Renders one region's four rounds from the bracket store.
pub struct RegionView<'a> {
    pub bracket: &'a Bracket,
    pub region: Region,
    pub grid: &'a BracketGrid,
    pub cursor: Option<SlotRef>,
    pub scroll_offset: u16,
}

impl Widget for RegionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < MATCHUP_HEIGHT {
            return;
        }

        for cell in &self.grid.cells {
            let id = ContainerId::regional(self.region, cell.round);
            let matchup = self.bracket.container(id).get(cell.index);
            let x = area.x + cell.col;
            if x >= area.x + area.width {
                continue;
            }
            let avail = (area.x + area.width - x) as usize;
            for position in [Position::Top, Position::Bottom] {
                let Some(y) = screen_y(cell.slot_row(position), self.scroll_offset, area) else {
                    continue;
                };
                let here = SlotRef::new(id, cell.index, position);
                let under_cursor = self.cursor == Some(here);
                let (text, style) =
                    slot_line(matchup, position, cell.cell_width as usize, under_cursor);
                let text: String = text.chars().take(avail).collect();
                buf.set_string(x, y, &text, style);
            }
            if let Some(y) = screen_y(cell.center_row, self.scroll_offset, area) {
                let text: String =
                    state_line(matchup, cell.cell_width as usize).chars().take(avail).collect();
                buf.set_string(x, y, &text, resolve(ThemeColor::Dim));
            }
        }

        for depth in 0..3usize {
            let children = self.grid.cells_for_depth(depth);
            let parents = self.grid.cells_for_depth(depth + 1);
            let conn_x = if self.grid.mirrored {
                area.x + self.grid.round_cols[depth].saturating_sub(CONNECTOR_WIDTH)
            } else {
                area.x + self.grid.round_cols[depth] + self.grid.cell_width
            };
            for (j, parent) in parents.iter().enumerate() {
                draw_connector(
                    children[2 * j].center_row,
                    parent.center_row,
                    children[2 * j + 1].center_row,
                    conn_x,
                    area,
                    self.scroll_offset,
                    self.grid.mirrored,
                    buf,
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FinalFourView widget
// ---------------------------------------------------------------------------

/// The two semifinals, the final and the champion display:
///
/// ```text
///              ── FINAL FOUR ──
///
///  1 Florida      ──  1 Florida     ──   1 Duke
///
///  1 Auburn            1 Duke            1 Houston
///
///              Champion: 1 Florida
/// ```
pub struct FinalFourView<'a> {
    pub bracket: &'a Bracket,
    pub cursor: Option<SlotRef>,
}

/// Left to right on the Final Four page.
pub const FINAL_FOUR_COLUMNS: [ContainerId; 3] =
    [ContainerId::FfLeft, ContainerId::Championship, ContainerId::FfRight];

impl Widget for FinalFourView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 7 || area.width < 20 {
            return;
        }
        let accent = resolve(ThemeColor::Accent);
        let dim = resolve(ThemeColor::Dim);

        let title = "── FINAL FOUR ──";
        let tx = area.x + area.width.saturating_sub(title.chars().count() as u16) / 2;
        buf.set_string(tx, area.y, title, accent);

        let gap: u16 = 4;
        let cell_w: u16 = ((area.width.saturating_sub(gap * 2)) / 3).min(CELL_W_FULL);
        let total_w = cell_w * 3 + gap * 2;
        let x0 = area.x + area.width.saturating_sub(total_w) / 2;
        let center_y = area.y + 3;

        for (col, id) in FINAL_FOUR_COLUMNS.into_iter().enumerate() {
            let x = x0 + col as u16 * (cell_w + gap);
            let matchup = self.bracket.container(id).first();
            buf.set_string(x, center_y - 2, id.label(), dim);
            for (dy, position) in [(0u16, Position::Top), (2, Position::Bottom)] {
                let here = SlotRef::new(id, 0, position);
                let under_cursor = self.cursor == Some(here);
                let (text, style) = slot_line(matchup, position, cell_w as usize, under_cursor);
                buf.set_string(x, center_y - 1 + dy, &text, style);
            }
            let state: String = state_line(matchup, cell_w as usize);
            buf.set_string(x, center_y, &state, dim);
        }

        for cx in (x0 + cell_w)..(x0 + cell_w + gap) {
            put_char(buf, cx, center_y, '─', dim);
        }
        for cx in (x0 + cell_w * 2 + gap)..(x0 + (cell_w + gap) * 2) {
            put_char(buf, cx, center_y, '─', dim);
        }

        let champion = self.bracket.champion();
        let (text, style) = match champion.display.as_deref() {
            Some(name) => (format!("Champion: {name}"), resolve(ThemeColor::Winner)),
            None => ("Champion: TBD".to_string(), dim),
        };
        let y = center_y + 3;
        if y < area.y + area.height {
            let cx = area.x + area.width.saturating_sub(text.chars().count() as u16) / 2;
            buf.set_string(cx, y, &text, style);
        }
    }
}

// ---------------------------------------------------------------------------
// Shared drawing helpers
// ---------------------------------------------------------------------------

/// Text and style of one slot line.
pub fn slot_line(
    matchup: Option<&Matchup>,
    position: Position,
    width: usize,
    under_cursor: bool,
) -> (String, Style) {
    let empty = Slot::default();
    let slot = matchup.map(|m| m.slot(position)).unwrap_or(&empty);
    let status = matchup
        .map(|m| m.status(position))
        .unwrap_or(picks_api::SlotStatus::Placeholder);
    (format_slot_line(slot, width), slot_style(status, under_cursor))
}

/// `"[seed] [name    ]"`, padded or clipped to exactly `width` characters.
pub fn format_slot_line(slot: &Slot, width: usize) -> String {
    let (seed, name) = match &slot.occupant {
        Some(team) => (format!("{:2}", team.seed), team.name.as_str()),
        None => ("  ".to_string(), "TBD"),
    };
    let line = format!("{seed} {name}");
    let clipped: String = line.chars().take(width).collect();
    format!("{clipped:<width$}")
}

fn state_line(matchup: Option<&Matchup>, width: usize) -> String {
    let text = match matchup.map(Matchup::state) {
        Some(MatchupState::TwoFilledUndecided) => "   ·",
        _ => "",
    };
    format!("{text:<width$}")
}

fn screen_y(bracket_row: u16, scroll: u16, area: Rect) -> Option<u16> {
    if bracket_row < scroll {
        return None;
    }
    let rel = bracket_row - scroll;
    if rel >= area.height {
        return None;
    }
    Some(area.y + rel)
}

/// Box-drawing connector from two child matchups to the parent they feed.
///
/// ```text
///  child_top  ──┐
///               │
///  parent       ├──
///               │
///  child_bot  ──┘
/// ```
#[allow(clippy::too_many_arguments)]
fn draw_connector(
    r_top: u16,
    r_mid: u16,
    r_bot: u16,
    conn_base_x: u16,
    area: Rect,
    scroll: u16,
    mirrored: bool,
    buf: &mut Buffer,
) {
    let style = resolve(ThemeColor::Dim);
    let (col_a, col_b, col_c) = (conn_base_x, conn_base_x + 1, conn_base_x + 2);
    let limit_x = area.x + area.width;

    let mut put = |x: u16, row: u16, ch: char| {
        if x < limit_x {
            if let Some(sy) = screen_y(row, scroll, area) {
                put_char(buf, x, sy, ch, style);
            }
        }
    };

    let (outer, inner_top, inner_mid, inner_bot) = if mirrored {
        (col_c, '┌', '┤', '└')
    } else {
        (col_a, '┐', '├', '┘')
    };
    let toward_parent = if mirrored { col_a } else { col_c };

    put(outer, r_top, '─');
    put(col_b, r_top, inner_top);
    for row in (r_top + 1)..r_bot {
        put(col_b, row, '│');
    }
    put(col_b, r_mid, inner_mid);
    put(toward_parent, r_mid, '─');
    put(outer, r_bot, '─');
    put(col_b, r_bot, inner_bot);
}

fn put_char(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
