pub mod autofill;
pub mod client;
pub mod engine;
pub mod error;
pub mod store;
pub mod submission;
pub mod topology;

pub use autofill::AutofillPayload;
pub use client::{ApiError, ApiResult, AutofillStrategy, BracketApi, RegionTeams, TeamSource};
pub use engine::{BracketEngine, Evicted, SelectOutcome};
pub use error::BracketError;
pub use store::{Bracket, ChampionSlot, Matchup, MatchupState, Slot, SlotStatus};
pub use submission::{SubmissionPayload, SubmitRequest};
pub use topology::{Successor, next_slot};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Domain types: bracket model, independent of any view or wire format
// ---------------------------------------------------------------------------

/// A seeded team. Identity inside one bracket is `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub seed: u8,
    pub name: String,
}

impl Team {
    pub fn new(seed: u8, name: impl Into<String>) -> Self {
        Self { seed, name: name.into() }
    }

    /// Text shown in the champion display after a live pick.
    pub fn label(&self) -> String {
        format!("{} {}", self.seed, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    West,
    South,
    East,
    Midwest,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::West, Region::South, Region::East, Region::Midwest];

    pub fn id(&self) -> &'static str {
        match self {
            Region::West => "west",
            Region::South => "south",
            Region::East => "east",
            Region::Midwest => "midwest",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::West => "West",
            Region::South => "South",
            Region::East => "East",
            Region::Midwest => "Midwest",
        }
    }
}

impl FromStr for Region {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|r| r.id() == s)
            .ok_or_else(|| BracketError::UnknownContainer(s.to_string()))
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(FromStrVisitor::<Region>::new("a region id"))
    }
}

/// The four rounds played inside a region, earliest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegionRound {
    R64,
    R32,
    S16,
    E8,
}

impl RegionRound {
    pub const ALL: [RegionRound; 4] =
        [RegionRound::R64, RegionRound::R32, RegionRound::S16, RegionRound::E8];

    pub fn id(&self) -> &'static str {
        match self {
            RegionRound::R64 => "r64",
            RegionRound::R32 => "r32",
            RegionRound::S16 => "s16",
            RegionRound::E8 => "e8",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RegionRound::R64 => "Round of 64",
            RegionRound::R32 => "Round of 32",
            RegionRound::S16 => "Sweet 16",
            RegionRound::E8 => "Elite Eight",
        }
    }

    /// Next round inside the region. `None` for the Elite Eight, which feeds
    /// the Final Four by region instead of by index.
    pub fn next(self) -> Option<Self> {
        match self {
            RegionRound::R64 => Some(RegionRound::R32),
            RegionRound::R32 => Some(RegionRound::S16),
            RegionRound::S16 => Some(RegionRound::E8),
            RegionRound::E8 => None,
        }
    }

    pub fn prev(self) -> Option<Self> {
        match self {
            RegionRound::R64 => None,
            RegionRound::R32 => Some(RegionRound::R64),
            RegionRound::S16 => Some(RegionRound::R32),
            RegionRound::E8 => Some(RegionRound::S16),
        }
    }

    /// 0 for the Round of 64 up to 3 for the Elite Eight.
    pub fn depth(&self) -> usize {
        match self {
            RegionRound::R64 => 0,
            RegionRound::R32 => 1,
            RegionRound::S16 => 2,
            RegionRound::E8 => 3,
        }
    }

    pub fn matchup_count(&self) -> usize {
        8 >> self.depth()
    }
}

/// Identity of a round container: a regional round, one of the national
/// rounds, or the single-team champion display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContainerId {
    Regional { region: Region, round: RegionRound },
    FfLeft,
    FfRight,
    Championship,
    Champion,
}

impl ContainerId {
    pub fn regional(region: Region, round: RegionRound) -> Self {
        ContainerId::Regional { region, round }
    }

    /// The 19 containers that hold matchups, in layout order.
    pub fn matchup_containers() -> impl Iterator<Item = ContainerId> {
        Region::ALL
            .into_iter()
            .flat_map(|region| {
                RegionRound::ALL
                    .into_iter()
                    .map(move |round| ContainerId::Regional { region, round })
            })
            .chain([ContainerId::FfLeft, ContainerId::FfRight, ContainerId::Championship])
    }

    /// Number of matchups this container holds in a 64-team field.
    pub fn capacity(&self) -> usize {
        match self {
            ContainerId::Regional { round, .. } => round.matchup_count(),
            ContainerId::FfLeft | ContainerId::FfRight | ContainerId::Championship => 1,
            ContainerId::Champion => 0,
        }
    }

    pub fn region(&self) -> Option<Region> {
        match self {
            ContainerId::Regional { region, .. } => Some(*region),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            ContainerId::Regional { region, round } => {
                format!("{} {}", region.label(), round.label())
            }
            ContainerId::FfLeft => "Final Four (West/South)".to_string(),
            ContainerId::FfRight => "Final Four (East/Midwest)".to_string(),
            ContainerId::Championship => "Championship".to_string(),
            ContainerId::Champion => "National Champion".to_string(),
        }
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerId::Regional { region, round } => write!(f, "{}_{}", region.id(), round.id()),
            ContainerId::FfLeft => f.write_str("ff_left"),
            ContainerId::FfRight => f.write_str("ff_right"),
            ContainerId::Championship => f.write_str("championship"),
            ContainerId::Champion => f.write_str("champion"),
        }
    }
}

impl FromStr for ContainerId {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ff_left" => return Ok(ContainerId::FfLeft),
            "ff_right" => return Ok(ContainerId::FfRight),
            "championship" => return Ok(ContainerId::Championship),
            "champion" => return Ok(ContainerId::Champion),
            _ => {}
        }
        let unknown = || BracketError::UnknownContainer(s.to_string());
        let (region, round) = s.split_once('_').ok_or_else(unknown)?;
        let region = region.parse::<Region>().map_err(|_| unknown())?;
        let round = RegionRound::ALL
            .into_iter()
            .find(|r| r.id() == round)
            .ok_or_else(unknown)?;
        Ok(ContainerId::Regional { region, round })
    }
}

impl Serialize for ContainerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContainerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(FromStrVisitor::<ContainerId>::new("a bracket container id"))
    }
}

struct FromStrVisitor<T> {
    expecting: &'static str,
    marker: std::marker::PhantomData<T>,
}

impl<T> FromStrVisitor<T> {
    fn new(expecting: &'static str) -> Self {
        Self { expecting, marker: std::marker::PhantomData }
    }
}

impl<T> Visitor<'_> for FromStrVisitor<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.expecting)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        v.parse::<T>().map_err(E::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Position {
    Top,
    Bottom,
}

impl Position {
    /// Even indices feed the top slot, odd indices the bottom slot.
    pub fn from_index(index: usize) -> Self {
        if index % 2 == 0 { Position::Top } else { Position::Bottom }
    }

    pub fn sibling(self) -> Self {
        match self {
            Position::Top => Position::Bottom,
            Position::Bottom => Position::Top,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Position::Top => "top",
            Position::Bottom => "bottom",
        }
    }
}

/// One matchup, addressed by its container and index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchupRef {
    pub container: ContainerId,
    pub index: usize,
}

impl MatchupRef {
    pub fn new(container: ContainerId, index: usize) -> Self {
        Self { container, index }
    }

    pub fn slot(self, position: Position) -> SlotRef {
        SlotRef { container: self.container, index: self.index, position }
    }
}

impl fmt::Display for MatchupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.container, self.index)
    }
}

/// Stable identity of one slot. Interaction dispatches on this, never on a
/// view node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotRef {
    pub container: ContainerId,
    pub index: usize,
    pub position: Position,
}

impl SlotRef {
    pub fn new(container: ContainerId, index: usize, position: Position) -> Self {
        Self { container, index, position }
    }

    pub fn matchup(&self) -> MatchupRef {
        MatchupRef { container: self.container, index: self.index }
    }

    pub fn sibling(&self) -> SlotRef {
        SlotRef { position: self.position.sibling(), ..*self }
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}].{}", self.container, self.index, self.position.label())
    }
}
