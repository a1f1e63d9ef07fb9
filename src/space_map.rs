use crate::{
    coord::{Coord, Rect},
    error::ContractError,
};

use std::convert::TryFrom;

pub const OCCUPIED_CELL: char = '#';
pub const FREE_CELL: char = '.';

/// Largest number of cells a space map may cover.
pub const MAX_CELLS: usize = 1 << 24;

/// Which cells of the level may hold rooms. Stored row-major inside inclusive bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct SpaceMap {
    bounds: Rect,
    occupied: Vec<bool>,
}

impl SpaceMap {
    pub fn new(bounds: Rect) -> Result<Self, ContractError> {
        if bounds.is_inverted() {
            return Err(ContractError::InvertedBounds {
                min: bounds.min,
                max: bounds.max,
            });
        }
        let (width, height) = (bounds.width(), bounds.height());
        let num_cells = width
            .checked_mul(height)
            .filter(|n| *n <= MAX_CELLS as u64)
            .ok_or(ContractError::MapTooLarge {
                width,
                height,
                max: MAX_CELLS,
            })? as usize;

        Ok(SpaceMap {
            bounds,
            occupied: vec![false; num_cells],
        })
    }

    pub fn with_size(width: u32, height: u32) -> Result<Self, ContractError> {
        let too_large = ContractError::MapTooLarge {
            width: width.into(),
            height: height.into(),
            max: MAX_CELLS,
        };
        let max_x = i32::try_from(width).map_err(|_| too_large.clone())? - 1;
        let max_y = i32::try_from(height).map_err(|_| too_large)? - 1;

        Self::new(Rect::new(Coord::new(0, 0), Coord::new(max_x, max_y)))
    }

    /// Parses rows of `#` (occupied) and `.` (free). The first row is the top of the map.
    pub fn from_layout<S: AsRef<str>>(rows: &[S]) -> Result<Self, ContractError> {
        let width = match rows.first() {
            Some(row) => row.as_ref().chars().count(),
            None => return Err(ContractError::MalformedLayout("no rows".to_string())),
        };
        let too_large = || ContractError::MapTooLarge {
            width: width as u64,
            height: rows.len() as u64,
            max: MAX_CELLS,
        };
        let mut map = Self::with_size(
            u32::try_from(width).map_err(|_| too_large())?,
            u32::try_from(rows.len()).map_err(|_| too_large())?,
        )?;

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(ContractError::MalformedLayout(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }
            for (x, cell) in row.chars().enumerate() {
                match cell {
                    OCCUPIED_CELL => map.set_occupied(Coord::new(x as i32, y as i32))?,
                    FREE_CELL => {}
                    other => {
                        return Err(ContractError::MalformedLayout(format!(
                            "unexpected cell {:?} at ({}, {})",
                            other, x, y
                        )))
                    }
                }
            }
        }

        Ok(map)
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    fn index(&self, c: Coord) -> Option<usize> {
        if !self.bounds.contains(c) {
            return None;
        }
        let dx = (i64::from(c.x) - i64::from(self.bounds.min.x)) as usize;
        let dy = (i64::from(c.y) - i64::from(self.bounds.min.y)) as usize;

        Some(dy * self.bounds.width() as usize + dx)
    }

    pub fn contains(&self, c: Coord) -> bool {
        self.bounds.contains(c)
    }

    pub fn set_occupied(&mut self, c: Coord) -> Result<(), ContractError> {
        let i = self.index(c).ok_or(ContractError::OutOfBounds(c))?;
        self.occupied[i] = true;

        Ok(())
    }

    pub fn is_free(&self, c: Coord) -> bool {
        self.index(c).map_or(false, |i| !self.occupied[i])
    }

    pub fn free_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        let Rect { min, max } = self.bounds;
        (min.y..=max.y)
            .flat_map(move |y| (min.x..=max.x).map(move |x| Coord::new(x, y)))
            .filter(move |c| self.is_free(*c))
    }

    pub fn free_count(&self) -> usize {
        self.occupied.iter().filter(|o| !**o).count()
    }

    /// Free cells of the bottom row, left to right.
    pub fn entrance_candidates(&self) -> Vec<Coord> {
        let Rect { min, max } = self.bounds;
        (min.x..=max.x)
            .map(|x| Coord::new(x, max.y))
            .filter(|c| self.is_free(*c))
            .collect()
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
    fn test_layout_parsing() {
        let map = SpaceMap::from_layout(&["#..", "..#", ".#."]).unwrap();

        assert_eq!(map.bounds(), Rect::new(Coord::new(0, 0), Coord::new(2, 2)));
        assert!(!map.is_free(Coord::new(0, 0)));
        assert!(map.is_free(Coord::new(1, 0)));
        assert!(!map.is_free(Coord::new(3, 0)));
        assert!(!map.is_free(Coord::new(0, -1)));
        assert_eq!(map.free_count(), 6);
        assert_eq!(map.free_cells().count(), 6);
        assert_eq!(
            map.entrance_candidates(),
            vec![Coord::new(0, 2), Coord::new(2, 2)]
        );
    }

    #[test]
    fn test_free_cells_are_row_major() {
        let map = SpaceMap::from_layout(&["..", ".#"]).unwrap();
        let cells: Vec<_> = map.free_cells().collect();

        assert_eq!(
            cells,
            vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(0, 1)]
        );
    }

    #[test]
    fn test_bounds_at_the_edge_of_the_range() {
        let right = Rect::new(Coord::new(i32::MAX - 1, 0), Coord::new(i32::MAX, 0));
        let map = SpaceMap::new(right).unwrap();

        assert_eq!(map.free_count(), 2);
        assert!(map.is_free(Coord::new(i32::MAX, 0)));
        assert!(!map.is_free(Coord::new(i32::MIN, 0)));
        assert_eq!(
            map.entrance_candidates(),
            vec![Coord::new(i32::MAX - 1, 0), Coord::new(i32::MAX, 0)]
        );
    }

    #[test]
    fn test_offset_bounds() {
        let mut map = SpaceMap::new(Rect::new(Coord::new(-2, 5), Coord::new(1, 6))).unwrap();
        map.set_occupied(Coord::new(-2, 6)).unwrap();

        assert_eq!(
            map.entrance_candidates(),
            vec![Coord::new(-1, 6), Coord::new(0, 6), Coord::new(1, 6)]
        );
        assert_eq!(
            map.set_occupied(Coord::new(2, 6)),
            Err(ContractError::OutOfBounds(Coord::new(2, 6)))
        );
    }

    #[test]
    fn test_malformed_maps() {
        assert!(matches!(
            SpaceMap::with_size(0, 4),
            Err(ContractError::InvertedBounds { .. })
        ));
        assert!(matches!(
            SpaceMap::from_layout(&["..", "."]),
            Err(ContractError::MalformedLayout(_))
        ));
        assert!(matches!(
            SpaceMap::from_layout(&[".x"]),
            Err(ContractError::MalformedLayout(_))
        ));
        assert!(matches!(
            SpaceMap::new(Rect::new(Coord::new(i32::MIN, 0), Coord::new(i32::MAX, 0))),
            Err(ContractError::MapTooLarge { width, height: 1, .. }) if width == 1 << 32
        ));
        assert!(matches!(
            SpaceMap::with_size(u32::MAX, 1),
            Err(ContractError::MapTooLarge { .. })
        ));
        assert!(matches!(
            SpaceMap::with_size(4096, 4097),
            Err(ContractError::MapTooLarge { .. })
        ));
        let no_rows: [&str; 0] = [];
        assert!(matches!(
            SpaceMap::from_layout(&no_rows),
            Err(ContractError::MalformedLayout(_))
        ));
    }
}
