use crate::error::BracketError;
use crate::store::{Bracket, Matchup, validate_team};
use crate::topology::{Successor, fed_container, next_slot};
use crate::{ContainerId, MatchupRef, Position, Region, RegionRound, Team};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A whole bracket as filled by the server: every container's teams in
/// pairs, plus the champion's name. Winners are not listed; a team won its
/// matchup if it shows up in the round its matchup feeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutofillPayload {
    #[serde(default)]
    pub champion: Option<String>,
    #[serde(flatten)]
    pub containers: BTreeMap<ContainerId, Vec<Team>>,
}

impl AutofillPayload {
    pub fn from_json(text: &str) -> Result<Self, BracketError> {
        serde_json::from_str(text).map_err(|e| BracketError::Payload(e.to_string()))
    }

    fn teams(&self, id: ContainerId) -> &[Team] {
        self.containers.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    fn champion_name(&self) -> Option<&str> {
        self.champion.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// Build a fresh bracket from the payload. Nothing is replayed through
    /// the selection path, so no cascades run.
    pub fn build(&self) -> Result<Bracket, BracketError> {
        self.validate()?;

        let mut bracket = Bracket::new();
        for id in ContainerId::matchup_containers() {
            let teams = self.teams(id);
            if teams.len() % 2 == 1 {
                warn!("{id}: ignoring unpaired team {}", teams[teams.len() - 1].name);
            }
            let matchups = teams
                .chunks_exact(2)
                .map(|pair| Matchup::new(Some(pair[0].clone()), Some(pair[1].clone())))
                .collect();
            bracket.replace_container(id, matchups);
        }

        for id in ContainerId::matchup_containers() {
            let Some(fed) = fed_container(id) else { continue };
            // Only teams that made it into a pair count as having advanced.
            let advanced: HashSet<String> = if fed == ContainerId::Champion {
                self.champion_name().map(str::to_string).into_iter().collect()
            } else {
                bracket
                    .container(fed)
                    .iter()
                    .flat_map(|m| [m.top.name(), m.bottom.name()])
                    .flatten()
                    .map(str::to_string)
                    .collect()
            };

            for index in 0..id.capacity() {
                let from = MatchupRef::new(id, index);
                let Some(matchup) = bracket.matchup(from) else { continue };
                let winners: Vec<Position> = [Position::Top, Position::Bottom]
                    .into_iter()
                    .filter(|p| matchup.slot(*p).name().is_some_and(|n| advanced.contains(n)))
                    .collect();
                let team = match winners.as_slice() {
                    [] => None,
                    [one] => matchup.slot(*one).occupant.clone(),
                    _ => {
                        return Err(BracketError::Payload(format!(
                            "both teams of {from} advance"
                        )));
                    }
                };
                let sent = team.as_ref().map(|t| t.name.as_str());

                match next_slot(id, index) {
                    Some(Successor::Slot(target)) => {
                        let placed = bracket.slot(target).and_then(|s| s.name());
                        if placed != sent {
                            return Err(BracketError::Payload(format!(
                                "{target} holds {} but {from} sends {}",
                                placed.unwrap_or("nobody"),
                                sent.unwrap_or("nobody")
                            )));
                        }
                        if let Some(team) = team {
                            bracket.place_winner(from, &team.name);
                            if let Some(matchup) = bracket.ensure_matchup(target.matchup()) {
                                matchup.slot_mut(target.position).fed_by = Some(from);
                            }
                        }
                    }
                    Some(Successor::Champion) => {
                        if let Some(team) = team {
                            bracket.place_winner(from, &team.name);
                            let display = team.name.clone();
                            bracket.set_champion_display(team, display, from);
                        }
                    }
                    None => {}
                }
            }
        }

        if let Some(name) = self.champion_name() {
            if bracket.champion().name() != Some(name) {
                return Err(BracketError::Payload(format!(
                    "champion {name:?} did not play in the championship"
                )));
            }
        }

        debug!("autofill payload built {} picks", bracket.pick_count());
        Ok(bracket)
    }

    fn validate(&self) -> Result<(), BracketError> {
        if self.containers.contains_key(&ContainerId::Champion) {
            return Err(BracketError::Payload("champion must be a name, not a list".into()));
        }
        for (id, teams) in &self.containers {
            let most = id.capacity() * 2;
            if teams.len() > most {
                return Err(BracketError::Payload(format!(
                    "{id} lists {} teams, at most {most} fit",
                    teams.len()
                )));
            }
            let mut names = HashSet::new();
            for team in teams {
                validate_team(team)?;
                if !names.insert(team.name.as_str()) {
                    return Err(BracketError::Payload(format!(
                        "{} appears twice in {id}",
                        team.name
                    )));
                }
            }
        }

        // Winners are matched by name, so the field must be unique across regions.
        let mut seeded = HashSet::new();
        for region in Region::ALL {
            for team in self.teams(ContainerId::regional(region, RegionRound::R64)) {
                if !seeded.insert(team.name.as_str()) {
                    return Err(BracketError::Payload(format!(
                        "{} is seeded in more than one region",
                        team.name
                    )));
                }
            }
        }
        Ok(())
    }
}
