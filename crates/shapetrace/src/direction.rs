//! Compass headings for 8-connected neighborhood walks.

use serde::{Deserialize, Serialize};

/// Unit steps along each heading, indexed by [`Direction`] encoding.
/// Y grows downward (image convention), so north is `dy = -1`.
const DX: [isize; 8] = [0, 1, 1, 1, 0, -1, -1, -1];
const DY: [isize; 8] = [-1, -1, 0, 1, 1, 1, 0, -1];

/// The eight compass headings, encoded 0..=7 clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Direction {
    /// All headings in encoding order.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Heading encoding in 0..=7.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Heading after turning by `offset` steps of 45 degrees; positive turns
    /// clockwise, with wraparound.
    #[inline]
    pub fn turned(self, offset: i8) -> Direction {
        let idx = (self as i8 + offset).rem_euclid(8) as usize;
        Self::ALL[idx]
    }

    /// The opposite heading.
    #[inline]
    pub fn reversed(self) -> Direction {
        self.turned(4)
    }

    /// Unit step along this heading in x.
    #[inline]
    pub fn dx(self) -> isize {
        DX[self as usize]
    }

    /// Unit step along this heading in y (downward positive).
    #[inline]
    pub fn dy(self) -> isize {
        DY[self as usize]
    }

    /// True for the four diagonal headings.
    #[inline]
    pub fn is_diagonal(self) -> bool {
        (self as u8) & 1 == 1
    }

    /// Chain-code step length: 1 along an axis, sqrt(2) along a diagonal.
    #[inline]
    pub fn step_len(self) -> f64 {
        if self.is_diagonal() {
            std::f64::consts::SQRT_2
        } else {
            1.0
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    /// Accepts short (`ne`) and long (`northeast`) lowercase compass names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Direction::North),
            "ne" | "northeast" => Ok(Direction::NorthEast),
            "e" | "east" => Ok(Direction::East),
            "se" | "southeast" => Ok(Direction::SouthEast),
            "s" | "south" => Ok(Direction::South),
            "sw" | "southwest" => Ok(Direction::SouthWest),
            "w" | "west" => Ok(Direction::West),
            "nw" | "northwest" => Ok(Direction::NorthWest),
            other => Err(format!("unknown compass direction `{}`", other)),
        }
    }
}
