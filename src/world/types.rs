//! Core identifier types for things that occupy locations.
//!
//! Players and items share the occupant namespace in the descriptor files,
//! so occupants carry an explicit kind tag. Lookups that only care about
//! items (`/pick`) or only about players (`/who`) match on the tag instead
//! of cross-checking the dungeon roster.

use std::fmt;
use std::str::FromStr;

/// Something present at a location: a connected player or a world item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occupant {
    Player(String),
    Item(String),
}

impl Occupant {
    pub fn name(&self) -> &str {
        match self {
            Occupant::Player(n) | Occupant::Item(n) => n,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, Occupant::Player(_))
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The four travel directions accepted during gameplay.
///
/// Descriptor files may label exits with arbitrary words; only these four are
/// reachable through `/move`, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "north" => Ok(Direction::North),
            "east" => Ok(Direction::East),
            "south" => Ok(Direction::South),
            "west" => Ok(Direction::West),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
