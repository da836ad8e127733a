//! Faction rules and hostility helpers.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Team {
    Players,
    Npcs,
    Hostiles,
    Neutral,
}

#[inline]
#[must_use]
pub fn are_hostile(a: Team, b: Team) -> bool {
    use Team::{Hostiles, Npcs, Players};
    matches!(
        (a, b),
        (Players, Hostiles) | (Hostiles, Players) | (Npcs, Hostiles) | (Hostiles, Npcs)
    )
}

/// Allies are members of the same faction (self included). Neutral actors
/// are allied only with other neutrals.
#[inline]
#[must_use]
pub fn are_allied(a: Team, b: Team) -> bool {
    a == b
}
