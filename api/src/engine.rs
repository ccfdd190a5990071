use crate::autofill::AutofillPayload;
use crate::error::BracketError;
use crate::store::Bracket;
use crate::submission::{self, SubmissionPayload};
use crate::topology::{self, Successor, next_slot};
use crate::{Region, SlotRef, Team};
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// A team removed from a later round because the pick that put it there
/// was changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evicted {
    Slot(SlotRef, Team),
    Champion(Team),
}

/// What a single selection changed downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectOutcome {
    /// Where the winner was written. `None` only on a topology miss.
    pub advanced_to: Option<Successor>,
    /// Every stale placement the cascade removed, nearest round first.
    pub evicted: Vec<Evicted>,
}

/// Owns the one bracket of a session and is the only way to mutate it.
#[derive(Debug, Clone, Default)]
pub struct BracketEngine {
    bracket: Bracket,
}

impl BracketEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_teams(regions: &BTreeMap<Region, Vec<Team>>) -> Result<Self, BracketError> {
        let mut engine = Self::new();
        engine.load_initial_teams(regions)?;
        Ok(engine)
    }

    pub fn bracket(&self) -> &Bracket {
        &self.bracket
    }

    pub fn load_initial_teams(
        &mut self,
        regions: &BTreeMap<Region, Vec<Team>>,
    ) -> Result<(), BracketError> {
        self.bracket.load_initial_teams(regions)
    }

    /// Pick the team in `slot` as the winner of its matchup and advance it.
    ///
    /// If the successor slot held a different team, that team is evicted and
    /// every later placement that depended on it is unwound.
    pub fn select(&mut self, slot: SlotRef) -> Result<SelectOutcome, BracketError> {
        let from = slot.matchup();
        let Some(matchup) = self.bracket.matchup(from) else {
            warn!("topology miss: select on {slot}");
            return Err(BracketError::MissingMatchup(from));
        };
        let team = matchup
            .slot(slot.position)
            .occupant
            .clone()
            .ok_or(BracketError::Placeholder(slot))?;

        self.bracket.place_winner(from, &team.name);
        debug!("{} wins {from}", team.name);

        let mut outcome = SelectOutcome::default();
        match next_slot(from.container, from.index) {
            Some(Successor::Champion) => {
                outcome.advanced_to = Some(Successor::Champion);
                if let Some(prior) = self.bracket.set_champion(team.clone(), from) {
                    if prior.name != team.name {
                        info!("champion changed from {} to {}", prior.name, team.name);
                        outcome.evicted.push(Evicted::Champion(prior));
                    }
                }
            }
            Some(Successor::Slot(target)) => {
                outcome.advanced_to = Some(Successor::Slot(target));
                if let Some(prior) = self.bracket.set_successor(target, team.clone(), from) {
                    if prior.name != team.name {
                        self.cascade(target, prior, &mut outcome.evicted);
                    }
                }
            }
            None => warn!("topology miss: {from} has no successor"),
        }
        Ok(outcome)
    }

    /// `prior` was displaced from `at`. Walk forward along the back-references
    /// and remove every placement it earned from there.
    fn cascade(&mut self, mut at: SlotRef, prior: Team, evicted: &mut Vec<Evicted>) {
        let mut was_winner = self
            .bracket
            .matchup(at.matchup())
            .is_some_and(|m| m.winner == Some(at.position));
        if was_winner {
            self.bracket.undecide(at.matchup());
        }
        evicted.push(Evicted::Slot(at, prior.clone()));

        for _ in 0..topology::MAX_DEPTH {
            if !was_winner {
                break;
            }
            let from = at.matchup();
            debug!("{from} undecided after evicting {}", prior.name);
            match next_slot(from.container, from.index) {
                Some(Successor::Champion) => {
                    let champion = self.bracket.champion();
                    if champion.fed_by == Some(from)
                        && champion.name() == Some(prior.name.as_str())
                    {
                        if let Some(team) = self.bracket.clear_champion() {
                            evicted.push(Evicted::Champion(team));
                        }
                    }
                    break;
                }
                Some(Successor::Slot(next)) => {
                    let stale = self.bracket.slot(next).is_some_and(|s| {
                        s.fed_by == Some(from) && s.name() == Some(prior.name.as_str())
                    });
                    if !stale {
                        break;
                    }
                    was_winner = self
                        .bracket
                        .matchup(next.matchup())
                        .is_some_and(|m| m.winner == Some(next.position));
                    if let Some(team) = self.bracket.clear_slot(next) {
                        evicted.push(Evicted::Slot(next, team));
                    }
                    at = next;
                }
                None => break,
            }
        }
    }

    /// Replace the whole bracket with a server-filled one. Runs no cascades.
    /// On error the current bracket is left untouched.
    pub fn apply_autofill(&mut self, payload: &AutofillPayload) -> Result<(), BracketError> {
        let filled = payload.build()?;
        self.bracket = filled;
        info!("autofill applied, {} picks", self.bracket.pick_count());
        Ok(())
    }

    /// Discard every pick, keeping the seeded Round of 64.
    pub fn reset(&mut self) {
        self.bracket.reset();
        info!("bracket reset");
    }

    pub fn serialize(&self) -> SubmissionPayload {
        SubmissionPayload::from_bracket(&self.bracket)
    }

    pub fn missing_picks(&self) -> Vec<String> {
        self.bracket.all_missing_picks()
    }

    pub fn completeness_warnings(&self) -> Vec<String> {
        submission::completeness_warnings(&self.bracket)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::tests::field;
    use crate::store::SlotStatus;
    use crate::{ContainerId, MatchupRef, Position, RegionRound};

    fn west(round: RegionRound) -> ContainerId {
        ContainerId::regional(Region::West, round)
    }

    fn top(container: ContainerId, index: usize) -> SlotRef {
        SlotRef::new(container, index, Position::Top)
    }

    fn bottom(container: ContainerId, index: usize) -> SlotRef {
        SlotRef::new(container, index, Position::Bottom)
    }

    fn name_at(engine: &BracketEngine, slot: SlotRef) -> Option<String> {
        engine.bracket().slot(slot).and_then(|s| s.name().map(str::to_string))
    }

    /// West 1 is "Alpha", West 16 "Omega", South 1 "Beta".
    fn engine() -> BracketEngine {
        let mut teams = field();
        let w = teams.get_mut(&Region::West).unwrap();
        w[0].name = "Alpha".into();
        w[1].name = "Omega".into();
        teams.get_mut(&Region::South).unwrap()[0].name = "Beta".into();
        BracketEngine::with_teams(&teams).unwrap()
    }

    /// Advance the top team of the region's first matchup all the way to the
    /// Final Four.
    fn run_top_through_region(engine: &mut BracketEngine, region: Region) {
        for round in RegionRound::ALL {
            engine.select(top(ContainerId::regional(region, round), 0)).unwrap();
        }
    }

    /// Every team in a later round got there from the matchup its slot points
    /// back to, where it is the picked winner, and that matchup feeds exactly
    /// this slot.
    pub(crate) fn assert_no_orphans(bracket: &Bracket) {
        for id in ContainerId::matchup_containers() {
            for (index, matchup) in bracket.container(id).iter().enumerate() {
                for position in [Position::Top, Position::Bottom] {
                    let here = SlotRef::new(id, index, position);
                    let slot = matchup.slot(position);
                    let Some(team) = &slot.occupant else { continue };
                    if matches!(id, ContainerId::Regional { round: RegionRound::R64, .. }) {
                        continue;
                    }
                    let from = slot.fed_by.unwrap_or_else(|| panic!("{here} has no feeder"));
                    let upstream = bracket.matchup(from).unwrap();
                    assert_eq!(upstream.winning_team(), Some(team), "{here} fed by {from}");
                    assert_eq!(next_slot(from.container, from.index), Some(Successor::Slot(here)));
                }
            }
        }
        let champion = bracket.champion();
        if let Some(team) = &champion.team {
            let from = champion.fed_by.unwrap();
            assert_eq!(from, MatchupRef::new(ContainerId::Championship, 0));
            assert_eq!(bracket.matchup(from).unwrap().winning_team(), Some(team));
        }
    }

    fn assert_single_winner(bracket: &Bracket) {
        for id in ContainerId::matchup_containers() {
            for matchup in bracket.container(id) {
                let selected = [Position::Top, Position::Bottom]
                    .into_iter()
                    .filter(|p| matchup.status(*p) == SlotStatus::Selected)
                    .count();
                assert!(selected <= 1);
            }
        }
    }

    #[test]
    fn selecting_in_round_of_64_advances_to_round_of_32() {
        let mut engine = engine();
        let outcome = engine.select(top(west(RegionRound::R64), 0)).unwrap();

        let target = top(west(RegionRound::R32), 0);
        assert_eq!(outcome.advanced_to, Some(Successor::Slot(target)));
        assert!(outcome.evicted.is_empty());
        assert_eq!(name_at(&engine, target).as_deref(), Some("Alpha"));
        assert_eq!(engine.bracket().status(top(west(RegionRound::R64), 0)), SlotStatus::Selected);
        assert_eq!(
            engine.bracket().status(bottom(west(RegionRound::R64), 0)),
            SlotStatus::Eliminated
        );
    }

    #[test]
    fn winners_reach_the_final_four_and_championship() {
        let mut engine = engine();
        run_top_through_region(&mut engine, Region::West);
        assert_eq!(name_at(&engine, top(ContainerId::FfLeft, 0)).as_deref(), Some("Alpha"));

        run_top_through_region(&mut engine, Region::South);
        assert_eq!(name_at(&engine, bottom(ContainerId::FfLeft, 0)).as_deref(), Some("Beta"));

        engine.select(top(ContainerId::FfLeft, 0)).unwrap();
        assert_eq!(name_at(&engine, top(ContainerId::Championship, 0)).as_deref(), Some("Alpha"));
        assert_no_orphans(engine.bracket());
    }

    #[test]
    fn changing_an_early_pick_unwinds_later_rounds() {
        let mut engine = engine();
        run_top_through_region(&mut engine, Region::West);
        run_top_through_region(&mut engine, Region::South);
        engine.select(top(ContainerId::FfLeft, 0)).unwrap();

        let outcome = engine.select(bottom(west(RegionRound::R64), 0)).unwrap();

        assert_eq!(name_at(&engine, top(west(RegionRound::R32), 0)).as_deref(), Some("Omega"));
        for slot in [
            top(west(RegionRound::S16), 0),
            top(west(RegionRound::E8), 0),
            top(ContainerId::FfLeft, 0),
            top(ContainerId::Championship, 0),
        ] {
            assert_eq!(name_at(&engine, slot), None, "{slot}");
        }
        // The replaced slot plus four later placements.
        assert_eq!(outcome.evicted.len(), 5);
        assert!(
            outcome.evicted.iter().all(|e| matches!(e, Evicted::Slot(_, t) if t.name == "Alpha"))
        );

        // Siblings are back to open and can be picked again.
        let bracket = engine.bracket();
        assert_eq!(bracket.status(top(west(RegionRound::R32), 0)), SlotStatus::Open);
        assert_eq!(bracket.status(bottom(ContainerId::FfLeft, 0)), SlotStatus::Open);
        assert_eq!(bracket.matchup(MatchupRef::new(ContainerId::FfLeft, 0)).unwrap().winner, None);
        assert_no_orphans(bracket);
        assert_single_winner(bracket);
    }

    #[test]
    fn changing_a_pick_removes_the_champion() {
        let mut engine = engine();
        run_top_through_region(&mut engine, Region::West);
        run_top_through_region(&mut engine, Region::South);
        for region in [Region::East, Region::Midwest] {
            run_top_through_region(&mut engine, region);
        }
        engine.select(top(ContainerId::FfLeft, 0)).unwrap();
        engine.select(top(ContainerId::FfRight, 0)).unwrap();
        let outcome = engine.select(top(ContainerId::Championship, 0)).unwrap();
        assert_eq!(outcome.advanced_to, Some(Successor::Champion));
        assert_eq!(engine.bracket().champion().display.as_deref(), Some("1 Alpha"));

        engine.select(top(west(RegionRound::R64), 1)).unwrap();
        let outcome = engine.select(bottom(west(RegionRound::R32), 0)).unwrap();
        assert_eq!(outcome.evicted.last(), Some(&Evicted::Champion(Team::new(1, "Alpha"))));
        assert_eq!(engine.bracket().champion().team, None);
        assert_eq!(engine.bracket().champion().display, None);
        // West 8 now sits in the Sweet 16, nothing above it.
        assert_eq!(name_at(&engine, top(west(RegionRound::S16), 0)).as_deref(), Some("W8"));
        assert_eq!(name_at(&engine, top(west(RegionRound::E8), 0)), None);
        assert_eq!(name_at(&engine, bottom(ContainerId::Championship, 0)).as_deref(), Some("E1"));
        assert_no_orphans(engine.bracket());
    }

    #[test]
    fn cascade_stops_where_the_evicted_team_was_not_the_winner() {
        let mut engine = engine();
        engine.select(top(west(RegionRound::R64), 0)).unwrap();
        engine.select(top(west(RegionRound::R64), 1)).unwrap();
        // W8 beats Alpha in the second round.
        engine.select(bottom(west(RegionRound::R32), 0)).unwrap();
        engine.select(top(west(RegionRound::S16), 0)).unwrap();

        let outcome = engine.select(bottom(west(RegionRound::R64), 0)).unwrap();
        assert_eq!(
            outcome.evicted,
            vec![Evicted::Slot(top(west(RegionRound::R32), 0), Team::new(1, "Alpha"))]
        );
        // The second-round result stands.
        let r32 = engine.bracket().matchup(MatchupRef::new(west(RegionRound::R32), 0)).unwrap();
        assert_eq!(r32.winner, Some(Position::Bottom));
        assert_eq!(name_at(&engine, top(west(RegionRound::S16), 0)).as_deref(), Some("W8"));
        assert_eq!(name_at(&engine, top(west(RegionRound::E8), 0)).as_deref(), Some("W8"));
        assert_no_orphans(engine.bracket());
    }

    #[test]
    fn reselecting_the_same_winner_changes_nothing() {
        let mut engine = engine();
        run_top_through_region(&mut engine, Region::West);
        let before = engine.bracket().clone();
        let outcome = engine.select(top(west(RegionRound::R64), 0)).unwrap();
        assert!(outcome.evicted.is_empty());
        assert_eq!(engine.bracket(), &before);
    }

    #[test]
    fn placeholders_cannot_be_selected() {
        let mut engine = engine();
        let slot = top(west(RegionRound::S16), 1);
        assert_eq!(engine.select(slot), Err(BracketError::Placeholder(slot)));
        let missing = top(west(RegionRound::R64), 8);
        assert_eq!(engine.select(missing), Err(BracketError::MissingMatchup(missing.matchup())));
        assert!(matches!(
            engine.select(top(ContainerId::Champion, 0)),
            Err(BracketError::MissingMatchup(_))
        ));
    }

    #[test]
    fn arbitrary_click_sequences_keep_the_bracket_consistent() {
        let mut engine = engine();
        let slots: Vec<SlotRef> = ContainerId::matchup_containers()
            .flat_map(|id| {
                (0..id.capacity()).flat_map(move |i| [top(id, i), bottom(id, i)])
            })
            .collect();

        // Small LCG so the sequence is reproducible.
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..5000 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let slot = slots[(state >> 33) as usize % slots.len()];
            let _ = engine.select(slot);
            assert_single_winner(engine.bracket());
        }
        assert_no_orphans(engine.bracket());
    }

    #[test]
    fn reset_clears_picks_but_keeps_the_field() {
        let mut engine = engine();
        run_top_through_region(&mut engine, Region::West);
        engine.reset();
        assert_eq!(engine.bracket().pick_count(), 0);
        assert_eq!(name_at(&engine, top(west(RegionRound::R64), 0)).as_deref(), Some("Alpha"));
        assert_eq!(name_at(&engine, top(west(RegionRound::R32), 0)), None);
        assert_eq!(engine.missing_picks().len(), 33);
    }

    #[test]
    fn missing_picks_shrink_as_rounds_are_picked() {
        let mut engine = engine();
        engine.select(top(west(RegionRound::R64), 0)).unwrap();
        engine.select(top(west(RegionRound::R64), 1)).unwrap();
        let missing = engine.missing_picks();
        // 30 first-round games, one second-round game, the champion.
        assert_eq!(missing.len(), 32);
        assert!(missing.contains(&"West Round of 32, game 1: no winner picked".to_string()));
    }
}
