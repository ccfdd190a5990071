use crate::{ContainerId, Position, Region, SlotRef};

/// Where the winner of a matchup goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Successor {
    Slot(SlotRef),
    /// The standalone champion display. Terminal.
    Champion,
}

/// Resolve the successor slot of `container[matchup_index]`.
///
/// Inside a region two adjacent matchups combine into one matchup of the next
/// round: index `i` feeds index `i / 2`, top when `i` is even. Elite Eight
/// winners feed the Final Four by region (West/South left, East/Midwest
/// right), semifinal winners feed the championship, and the championship
/// winner feeds the champion display.
///
/// Returns `None` for the champion display and for an index beyond the
/// container's capacity.
pub fn next_slot(container: ContainerId, matchup_index: usize) -> Option<Successor> {
    if matchup_index >= container.capacity() {
        return None;
    }

    let slot = |container, index, position| {
        Some(Successor::Slot(SlotRef { container, index, position }))
    };

    match container {
        ContainerId::Regional { region, round } => match round.next() {
            Some(next) => slot(
                ContainerId::Regional { region, round: next },
                matchup_index / 2,
                Position::from_index(matchup_index),
            ),
            None => {
                let (ff, position) = final_four_entry(region);
                slot(ff, 0, position)
            }
        },
        ContainerId::FfLeft => slot(ContainerId::Championship, 0, Position::Top),
        ContainerId::FfRight => slot(ContainerId::Championship, 0, Position::Bottom),
        ContainerId::Championship => Some(Successor::Champion),
        ContainerId::Champion => None,
    }
}

/// Which semifinal (and which side of it) a region's Elite Eight winner enters.
pub fn final_four_entry(region: Region) -> (ContainerId, Position) {
    match region {
        Region::West => (ContainerId::FfLeft, Position::Top),
        Region::South => (ContainerId::FfLeft, Position::Bottom),
        Region::East => (ContainerId::FfRight, Position::Top),
        Region::Midwest => (ContainerId::FfRight, Position::Bottom),
    }
}

/// The container(s) that receive this container's winners. Used by autofill,
/// which infers winners from what advanced.
pub fn fed_container(container: ContainerId) -> Option<ContainerId> {
    match next_slot(container, 0)? {
        Successor::Slot(slot) => Some(slot.container),
        Successor::Champion => Some(ContainerId::Champion),
    }
}

/// Rounds from the Round of 64 to the title game.
pub const MAX_DEPTH: usize = 6;

/// Round number of a container, 0 for the Round of 64 up to 5 for the final.
pub fn depth(container: ContainerId) -> usize {
    match container {
        ContainerId::Regional { round, .. } => round.depth(),
        ContainerId::FfLeft | ContainerId::FfRight => 4,
        ContainerId::Championship => 5,
        ContainerId::Champion => MAX_DEPTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegionRound;
    use std::collections::HashSet;

    fn regional(region: Region, round: RegionRound) -> ContainerId {
        ContainerId::regional(region, round)
    }

    fn slot_of(successor: Option<Successor>) -> SlotRef {
        match successor {
            Some(Successor::Slot(slot)) => slot,
            other => panic!("expected a slot successor, got {other:?}"),
        }
    }

    #[test]
    fn adjacent_matchups_combine_into_one() {
        let s = slot_of(next_slot(regional(Region::West, RegionRound::R64), 0));
        assert_eq!(s, SlotRef::new(regional(Region::West, RegionRound::R32), 0, Position::Top));

        let s = slot_of(next_slot(regional(Region::West, RegionRound::R64), 1));
        assert_eq!(s, SlotRef::new(regional(Region::West, RegionRound::R32), 0, Position::Bottom));

        let s = slot_of(next_slot(regional(Region::East, RegionRound::R32), 3));
        assert_eq!(s, SlotRef::new(regional(Region::East, RegionRound::S16), 1, Position::Bottom));

        let s = slot_of(next_slot(regional(Region::South, RegionRound::S16), 1));
        assert_eq!(s, SlotRef::new(regional(Region::South, RegionRound::E8), 0, Position::Bottom));
    }

    #[test]
    fn elite_eight_feeds_final_four_by_region() {
        let cases = [
            (Region::West, ContainerId::FfLeft, Position::Top),
            (Region::South, ContainerId::FfLeft, Position::Bottom),
            (Region::East, ContainerId::FfRight, Position::Top),
            (Region::Midwest, ContainerId::FfRight, Position::Bottom),
        ];
        for (region, container, position) in cases {
            let s = slot_of(next_slot(regional(region, RegionRound::E8), 0));
            assert_eq!(s, SlotRef::new(container, 0, position), "{region:?}");
        }
    }

    #[test]
    fn semifinals_feed_championship_and_final_feeds_champion() {
        let s = slot_of(next_slot(ContainerId::FfLeft, 0));
        assert_eq!(s, SlotRef::new(ContainerId::Championship, 0, Position::Top));
        let s = slot_of(next_slot(ContainerId::FfRight, 0));
        assert_eq!(s, SlotRef::new(ContainerId::Championship, 0, Position::Bottom));
        assert_eq!(next_slot(ContainerId::Championship, 0), Some(Successor::Champion));
    }

    #[test]
    fn champion_display_is_terminal() {
        assert_eq!(next_slot(ContainerId::Champion, 0), None);
    }

    #[test]
    fn out_of_range_index_has_no_successor() {
        assert_eq!(next_slot(regional(Region::West, RegionRound::R64), 8), None);
        assert_eq!(next_slot(regional(Region::West, RegionRound::E8), 1), None);
        assert_eq!(next_slot(ContainerId::FfLeft, 1), None);
    }

    #[test]
    fn next_slot_is_deterministic() {
        for container in ContainerId::matchup_containers() {
            for index in 0..container.capacity() {
                assert_eq!(next_slot(container, index), next_slot(container, index));
            }
        }
    }

    #[test]
    fn round_of_64_covers_round_of_32_exactly_once() {
        // 32 first-round matchups across the four regions land on 16 second-round
        // matchups, each with its top and bottom slot used exactly once.
        let mut seen = HashSet::new();
        for region in Region::ALL {
            let r64 = regional(region, RegionRound::R64);
            for index in 0..r64.capacity() {
                let s = slot_of(next_slot(r64, index));
                assert_eq!(s.container, regional(region, RegionRound::R32));
                assert!(seen.insert(s), "duplicate successor {s}");
            }
        }
        assert_eq!(seen.len(), 32);
        for region in Region::ALL {
            for index in 0..4 {
                for position in [Position::Top, Position::Bottom] {
                    let expected =
                        SlotRef::new(regional(region, RegionRound::R32), index, position);
                    assert!(seen.contains(&expected), "missing {expected}");
                }
            }
        }
    }

    #[test]
    fn every_non_final_slot_has_exactly_one_feeder() {
        let mut feeders: std::collections::HashMap<SlotRef, usize> = Default::default();
        for container in ContainerId::matchup_containers() {
            for index in 0..container.capacity() {
                if let Some(Successor::Slot(s)) = next_slot(container, index) {
                    *feeders.entry(s).or_default() += 1;
                }
            }
        }
        // Matchups after the Round of 64: (4 + 2 + 1) * 4 + 2 + 1 = 31.
        assert_eq!(feeders.len(), 31 * 2);
        assert!(feeders.values().all(|&n| n == 1));
    }

    #[test]
    fn depth_counts_rounds_to_the_final() {
        assert_eq!(depth(regional(Region::West, RegionRound::R64)), 0);
        assert_eq!(depth(regional(Region::West, RegionRound::E8)), 3);
        assert_eq!(depth(ContainerId::FfRight), 4);
        assert_eq!(depth(ContainerId::Championship), 5);
    }

    #[test]
    fn fed_container_follows_the_tree() {
        assert_eq!(
            fed_container(regional(Region::South, RegionRound::E8)),
            Some(ContainerId::FfLeft)
        );
        assert_eq!(fed_container(ContainerId::Championship), Some(ContainerId::Champion));
        assert_eq!(fed_container(ContainerId::Champion), None);
    }
}
