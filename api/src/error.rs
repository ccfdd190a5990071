use crate::{MatchupRef, Region, SlotRef};
use std::fmt;

/// Errors raised by the bracket model. Transport failures live in
/// [`crate::client::ApiError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketError {
    UnknownContainer(String),
    /// A matchup that should have been pre-provisioned does not exist.
    MissingMatchup(MatchupRef),
    /// The slot holds no team, so it cannot be picked.
    Placeholder(SlotRef),
    RegionSize { region: Region, found: usize },
    MissingRegion(Region),
    InvalidTeam(String),
    DuplicateTeam(String),
    Payload(String),
}

impl fmt::Display for BracketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketError::UnknownContainer(id) => write!(f, "unknown bracket container: {id}"),
            BracketError::MissingMatchup(m) => write!(f, "no such matchup: {m}"),
            BracketError::Placeholder(slot) => write!(f, "slot {slot} has no team yet"),
            BracketError::RegionSize { region, found } => {
                write!(f, "{} needs 16 teams, got {found}", region.label())
            }
            BracketError::MissingRegion(region) => {
                write!(f, "no teams supplied for {}", region.label())
            }
            BracketError::InvalidTeam(msg) => write!(f, "invalid team: {msg}"),
            BracketError::DuplicateTeam(name) => {
                write!(f, "team name {name:?} appears more than once")
            }
            BracketError::Payload(msg) => write!(f, "malformed autofill payload: {msg}"),
        }
    }
}

impl std::error::Error for BracketError {}
