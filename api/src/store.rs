use crate::error::BracketError;
use crate::{ContainerId, MatchupRef, Position, Region, RegionRound, SlotRef, Team};
use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};

/// Teams per region in the Round of 64.
pub const REGION_TEAMS: usize = 16;

// ---------------------------------------------------------------------------
// Slot / Matchup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    /// `None` = placeholder, the round has not been reached yet.
    pub occupant: Option<Team>,
    /// Upstream matchup whose winner was placed here. `None` for Round of 64
    /// slots, which are seeded rather than advanced into.
    pub fed_by: Option<MatchupRef>,
}

impl Slot {
    pub fn seeded(team: Team) -> Self {
        Self { occupant: Some(team), fed_by: None }
    }

    pub fn is_placeholder(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn name(&self) -> Option<&str> {
        self.occupant.as_ref().map(|t| t.name.as_str())
    }
}

/// How a slot should be shown. Derived from the matchup's winner, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Placeholder,
    Open,
    Selected,
    Eliminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchupState {
    Empty,
    OneFilled,
    TwoFilledUndecided,
    Decided,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matchup {
    pub top: Slot,
    pub bottom: Slot,
    /// At most one winner per matchup; the other occupied slot is eliminated.
    pub winner: Option<Position>,
}

impl Matchup {
    pub fn new(top: Option<Team>, bottom: Option<Team>) -> Self {
        Self {
            top: Slot { occupant: top, fed_by: None },
            bottom: Slot { occupant: bottom, fed_by: None },
            winner: None,
        }
    }

    pub fn slot(&self, position: Position) -> &Slot {
        match position {
            Position::Top => &self.top,
            Position::Bottom => &self.bottom,
        }
    }

    pub fn slot_mut(&mut self, position: Position) -> &mut Slot {
        match position {
            Position::Top => &mut self.top,
            Position::Bottom => &mut self.bottom,
        }
    }

    /// Both slots are unfilled placeholders: the round has not been reached.
    pub fn is_placeholder(&self) -> bool {
        self.top.is_placeholder() && self.bottom.is_placeholder()
    }

    pub fn status(&self, position: Position) -> SlotStatus {
        if self.slot(position).is_placeholder() {
            return SlotStatus::Placeholder;
        }
        match self.winner {
            Some(w) if w == position => SlotStatus::Selected,
            Some(_) => SlotStatus::Eliminated,
            None => SlotStatus::Open,
        }
    }

    pub fn state(&self) -> MatchupState {
        if self.winner.is_some() {
            return MatchupState::Decided;
        }
        match (self.top.is_placeholder(), self.bottom.is_placeholder()) {
            (true, true) => MatchupState::Empty,
            (false, false) => MatchupState::TwoFilledUndecided,
            _ => MatchupState::OneFilled,
        }
    }

    pub fn winning_team(&self) -> Option<&Team> {
        self.winner.and_then(|w| self.slot(w).occupant.as_ref())
    }

    pub fn position_of(&self, name: &str) -> Option<Position> {
        [Position::Top, Position::Bottom]
            .into_iter()
            .find(|p| self.slot(*p).name() == Some(name))
    }
}

// ---------------------------------------------------------------------------
// Champion display
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChampionSlot {
    pub team: Option<Team>,
    pub fed_by: Option<MatchupRef>,
    /// What the display shows: `"{seed} {name}"` after a live pick, the bare
    /// name after autofill.
    pub display: Option<String>,
}

impl ChampionSlot {
    pub fn name(&self) -> Option<&str> {
        self.team.as_ref().map(|t| t.name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Bracket store
// ---------------------------------------------------------------------------

/// Every round container plus the champion display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bracket {
    containers: BTreeMap<ContainerId, Vec<Matchup>>,
    champion: ChampionSlot,
}

impl Default for Bracket {
    fn default() -> Self {
        Self::new()
    }
}

impl Bracket {
    /// An empty bracket with every container pre-filled with placeholder
    /// matchups, so the layout is stable before any pick exists.
    pub fn new() -> Self {
        let containers = ContainerId::matchup_containers()
            .map(|id| (id, vec![Matchup::default(); id.capacity()]))
            .collect();
        Self { containers, champion: ChampionSlot::default() }
    }

    /// Seed the Round of 64 from four lists of 16 teams in seed-line order.
    /// Validates everything before touching the store.
    pub fn load_initial_teams(
        &mut self,
        regions: &BTreeMap<Region, Vec<Team>>,
    ) -> Result<(), BracketError> {
        let mut names = HashSet::new();
        for region in Region::ALL {
            let teams = regions.get(&region).ok_or(BracketError::MissingRegion(region))?;
            if teams.len() != REGION_TEAMS {
                return Err(BracketError::RegionSize { region, found: teams.len() });
            }
            for team in teams {
                validate_team(team)?;
                if !names.insert(team.name.as_str()) {
                    return Err(BracketError::DuplicateTeam(team.name.clone()));
                }
            }
        }

        *self = Bracket::new();
        for region in Region::ALL {
            let teams = &regions[&region];
            let container = ContainerId::regional(region, RegionRound::R64);
            let matchups = teams
                .chunks_exact(2)
                .map(|pair| Matchup {
                    top: Slot::seeded(pair[0].clone()),
                    bottom: Slot::seeded(pair[1].clone()),
                    winner: None,
                })
                .collect();
            self.containers.insert(container, matchups);
        }
        debug!("loaded {} teams into the round of 64", names.len());
        Ok(())
    }

    pub fn container(&self, id: ContainerId) -> &[Matchup] {
        self.containers.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn matchup(&self, m: MatchupRef) -> Option<&Matchup> {
        self.containers.get(&m.container)?.get(m.index)
    }

    pub fn slot(&self, s: SlotRef) -> Option<&Slot> {
        self.matchup(s.matchup()).map(|m| m.slot(s.position))
    }

    pub fn status(&self, s: SlotRef) -> SlotStatus {
        self.matchup(s.matchup())
            .map(|m| m.status(s.position))
            .unwrap_or(SlotStatus::Placeholder)
    }

    pub fn champion(&self) -> &ChampionSlot {
        &self.champion
    }

    /// Mutable access to a matchup, growing the container up to its capacity
    /// if needed. Containers are pre-filled, so growth only happens if a
    /// container was replaced with a short list. Logs and returns `None` on a
    /// topology miss.
    pub fn ensure_matchup(&mut self, m: MatchupRef) -> Option<&mut Matchup> {
        if m.index >= m.container.capacity() {
            warn!("topology miss: {m} is outside the bracket");
            return None;
        }
        let matchups = self.containers.entry(m.container).or_default();
        if matchups.len() <= m.index {
            debug!("growing {} to {} matchups", m.container, m.index + 1);
            matchups.resize_with(m.index + 1, Matchup::default);
        }
        matchups.get_mut(m.index)
    }

    fn matchup_mut(&mut self, m: MatchupRef) -> Option<&mut Matchup> {
        let found = self.containers.get_mut(&m.container).and_then(|c| c.get_mut(m.index));
        if found.is_none() {
            warn!("topology miss: no matchup at {m}");
        }
        found
    }

    /// Mark the slot holding `name` as this matchup's winner; its sibling, if
    /// occupied, becomes eliminated. No-op (logged) if the matchup does not
    /// exist or does not hold that team.
    pub fn place_winner(&mut self, m: MatchupRef, name: &str) -> bool {
        let Some(matchup) = self.matchup_mut(m) else {
            return false;
        };
        match matchup.position_of(name) {
            Some(position) => {
                matchup.winner = Some(position);
                true
            }
            None => {
                warn!("{name} is not playing in {m}");
                false
            }
        }
    }

    /// Write `team` into a successor slot, recording which matchup produced
    /// it. Returns the prior occupant so the caller can decide whether an
    /// eviction cascade is needed.
    pub fn set_successor(&mut self, s: SlotRef, team: Team, fed_by: MatchupRef) -> Option<Team> {
        let matchup = self.ensure_matchup(s.matchup())?;
        let slot = matchup.slot_mut(s.position);
        slot.fed_by = Some(fed_by);
        slot.occupant.replace(team)
    }

    /// Reset a slot to a placeholder. If the slot was its matchup's winner
    /// the matchup becomes undecided. Returns the removed team.
    pub fn clear_slot(&mut self, s: SlotRef) -> Option<Team> {
        let matchup = self.matchup_mut(s.matchup())?;
        if matchup.winner == Some(s.position) {
            matchup.winner = None;
        }
        let slot = matchup.slot_mut(s.position);
        slot.fed_by = None;
        slot.occupant.take()
    }

    /// Drop the winner of a matchup, leaving both occupants in place.
    pub fn undecide(&mut self, m: MatchupRef) {
        if let Some(matchup) = self.matchup_mut(m) {
            matchup.winner = None;
        }
    }

    /// Discard every pick. Round of 64 teams stay seeded; every later round
    /// goes back to placeholders.
    pub fn reset(&mut self) {
        let seeded: Vec<(ContainerId, Vec<Matchup>)> = Region::ALL
            .into_iter()
            .map(|region| ContainerId::regional(region, RegionRound::R64))
            .map(|id| {
                let matchups = self
                    .container(id)
                    .iter()
                    .map(|m| Matchup { winner: None, ..m.clone() })
                    .collect();
                (id, matchups)
            })
            .collect();
        *self = Bracket::new();
        for (id, matchups) in seeded {
            self.replace_container(id, matchups);
        }
    }

    pub fn set_champion(&mut self, team: Team, fed_by: MatchupRef) -> Option<Team> {
        self.champion.display = Some(team.label());
        self.champion.fed_by = Some(fed_by);
        self.champion.team.replace(team)
    }

    pub fn clear_champion(&mut self) -> Option<Team> {
        self.champion.display = None;
        self.champion.fed_by = None;
        self.champion.team.take()
    }

    pub(crate) fn set_champion_display(&mut self, team: Team, display: String, fed_by: MatchupRef) {
        self.champion =
            ChampionSlot { team: Some(team), fed_by: Some(fed_by), display: Some(display) };
    }

    pub(crate) fn replace_container(&mut self, id: ContainerId, mut matchups: Vec<Matchup>) {
        let capacity = id.capacity();
        matchups.truncate(capacity);
        matchups.resize_with(capacity, Matchup::default);
        self.containers.insert(id, matchups);
    }

    /// One human-readable entry per reached matchup without a pick, plus one
    /// for an unset champion. Matchups whose slots are both placeholders are
    /// exempt.
    pub fn all_missing_picks(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for id in ContainerId::matchup_containers() {
            for (index, matchup) in self.container(id).iter().enumerate() {
                if matchup.is_placeholder() || matchup.winner.is_some() {
                    continue;
                }
                missing.push(format!("{}, game {}: no winner picked", id.label(), index + 1));
            }
        }
        if self.champion.team.is_none() {
            missing.push("No National Champion selected.".to_string());
        }
        missing
    }

    /// Missing picks counted per container, in layout order.
    pub fn missing_by_container(&self) -> Vec<(ContainerId, usize)> {
        ContainerId::matchup_containers()
            .filter_map(|id| {
                let count = self
                    .container(id)
                    .iter()
                    .filter(|m| !m.is_placeholder() && m.winner.is_none())
                    .count();
                (count > 0).then_some((id, count))
            })
            .collect()
    }

    pub fn pick_count(&self) -> usize {
        let picks: usize = self
            .containers
            .values()
            .flat_map(|c| c.iter())
            .filter(|m| m.winner.is_some())
            .count();
        picks + usize::from(self.champion.team.is_some())
    }
}

pub(crate) fn validate_team(team: &Team) -> Result<(), BracketError> {
    if team.name.trim().is_empty() {
        return Err(BracketError::InvalidTeam("team name is empty".into()));
    }
    if !(1..=16).contains(&team.seed) {
        return Err(BracketError::InvalidTeam(format!(
            "{} has seed {}, expected 1-16",
            team.name, team.seed
        )));
    }
    Ok(())
}
