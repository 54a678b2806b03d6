//! Geometry reconstruction and 5-zone layout synthesis.

pub mod limits;
pub mod perimeter;
pub mod solver;
pub mod windows;

/// Cardinal orientation of a perimeter zone or facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    North,
    East,
    South,
    West,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Orientation::North => "North",
            Orientation::East => "East",
            Orientation::South => "South",
            Orientation::West => "West",
        }
    }
}
