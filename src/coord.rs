use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A cell on the dungeon grid. `y` grows downwards, so the bottom row has the largest `y`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// The neighbouring cell in `dir`, or `None` past the edge of the `i32` range.
    pub fn step(self, dir: Direction) -> Option<Self> {
        let (dx, dy) = dir.offset();

        Some(Coord::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        let all: &'static [Direction] = &ALL_DIRECTIONS;
        all.iter().filter_map(move |d| self.step(*d))
    }

    pub fn is_adjacent(self, other: Coord) -> bool {
        let dx = (i64::from(self.x) - i64::from(other.x)).abs();
        let dy = (i64::from(self.y) - i64::from(other.y)).abs();

        dx + dy == 1
    }
}

// Row-major, so sorted coordinates scan the grid the same way the space map stores it.
impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

impl Direction {
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Inclusive rectangle of cells.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Rect {
    pub min: Coord,
    pub max: Coord,
}

impl Rect {
    pub fn new(min: Coord, max: Coord) -> Self {
        Rect { min, max }
    }

    pub fn is_inverted(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn width(&self) -> u64 {
        (i64::from(self.max.x) - i64::from(self.min.x) + 1).max(0) as u64
    }

    pub fn height(&self) -> u64 {
        (i64::from(self.max.y) - i64::from(self.min.y) + 1).max(0) as u64
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.x >= self.min.x && c.x <= self.max.x && c.y >= self.min.y && c.y <= self.max.y
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_are_adjacent_and_opposite_steps_cancel() {
        let c = Coord::new(3, -2);
        assert_eq!(c.neighbors().count(), 4);
        for n in c.neighbors() {
            assert!(c.is_adjacent(n));
        }
        for d in ALL_DIRECTIONS.iter() {
            assert_eq!(c.step(*d).and_then(|n| n.step(d.opposite())), Some(c));
        }
        assert!(!c.is_adjacent(Coord::new(4, -1)));
    }

    #[test]
    fn test_coords_sort_row_major() {
        let mut coords = vec![Coord::new(1, 1), Coord::new(2, 0), Coord::new(0, 1)];
        coords.sort();

        assert_eq!(
            coords,
            vec![Coord::new(2, 0), Coord::new(0, 1), Coord::new(1, 1)]
        );
    }

    #[test]
    fn test_rect_dimensions() {
        let r = Rect::new(Coord::new(-1, 2), Coord::new(3, 2));
        assert_eq!((r.width(), r.height()), (5, 1));
        assert!(r.contains(Coord::new(0, 2)));
        assert!(!r.contains(Coord::new(0, 3)));
        assert!(Rect::new(Coord::new(1, 0), Coord::new(0, 0)).is_inverted());
    }

    #[test]
    fn test_steps_stop_at_the_edge_of_the_range() {
        let corner = Coord::new(i32::MAX, i32::MIN);

        assert_eq!(corner.step(Direction::East), None);
        assert_eq!(corner.step(Direction::North), None);
        assert_eq!(
            corner.neighbors().collect::<Vec<_>>(),
            vec![Coord::new(i32::MAX, i32::MIN + 1), Coord::new(i32::MAX - 1, i32::MIN)]
        );
        assert!(!corner.is_adjacent(Coord::new(i32::MIN, i32::MIN)));

        let everything = Rect::new(Coord::new(i32::MIN, 0), Coord::new(i32::MAX, 0));
        assert_eq!((everything.width(), everything.height()), (1 << 32, 1));
    }
}
