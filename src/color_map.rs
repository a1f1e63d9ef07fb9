use crate::{
    coord::{Coord, Rect},
    error::{ContractError, GenerationFailure},
};

use fnv::{FnvHashMap, FnvHashSet};
use stats::{MinMax, OnlineStats};
use std::collections::VecDeque;

/// Region tag of a colored cell. The generator uses a room's lock level.
pub type Color = u32;

/// Sparse coloring of grid cells, used to prove that a layout is spatially connected.
pub struct ColorMap {
    colors: FnvHashMap<Coord, Color>,
    x_stats: OnlineStats,
    y_stats: OnlineStats,
    x_range: MinMax<i32>,
    y_range: MinMax<i32>,
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorMap {
    pub fn new() -> Self {
        ColorMap {
            colors: FnvHashMap::default(),
            x_stats: OnlineStats::new(),
            y_stats: OnlineStats::new(),
            x_range: MinMax::new(),
            y_range: MinMax::new(),
        }
    }

    pub fn set(&mut self, c: Coord, color: Color) {
        if self.colors.insert(c, color).is_none() {
            self.x_stats.add(c.x);
            self.y_stats.add(c.y);
            self.x_range.add(c.x);
            self.y_range.add(c.y);
        }
    }

    pub fn get(&self, c: Coord) -> Result<Color, ContractError> {
        self.colors
            .get(&c)
            .copied()
            .ok_or(ContractError::NotColored(c))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Mean position of the colored cells.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }

        Some((self.x_stats.mean(), self.y_stats.mean()))
    }

    pub fn bounds(&self) -> Option<Rect> {
        match (
            self.x_range.min(),
            self.y_range.min(),
            self.x_range.max(),
            self.y_range.max(),
        ) {
            (Some(&x0), Some(&y0), Some(&x1), Some(&y1)) => {
                Some(Rect::new(Coord::new(x0, y0), Coord::new(x1, y1)))
            }
            _ => None,
        }
    }

    /// Flood fills from the first colored cell (row-major) over 4-neighbours and fails if any
    /// colored cell is left unvisited.
    pub fn check_connected(&self) -> Result<(), GenerationFailure> {
        let mut remaining: FnvHashSet<Coord> = self.colors.keys().copied().collect();
        let start = match remaining.iter().min() {
            Some(c) => *c,
            None => return Ok(()),
        };
        remaining.remove(&start);

        let mut frontier = VecDeque::new();
        frontier.push_back(start);
        while let Some(c) = frontier.pop_front() {
            for n in c.neighbors() {
                if remaining.remove(&n) {
                    frontier.push_back(n);
                }
            }
        }

        if remaining.is_empty() {
            Ok(())
        } else {
            log::debug!(
                "{} of {} colored cells unreachable from {}",
                remaining.len(),
                self.len(),
                start
            );
            Err(GenerationFailure::NotConnected)
        }
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
