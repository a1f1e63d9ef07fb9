use crate::{coord::Coord, error::ContractError, room::RoomGraph, space_map::SpaceMap};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Limits {
    pub max_rooms: usize,
    pub max_keys: usize,
    pub max_switches: usize,
}

/// Extra rule on the shape of the layout, on top of grid occupancy.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ShapeRule {
    Free,
    /// Never complete a 2x2 block of rooms, so rooms meeting at a corner can't fill in the
    /// square between them.
    NoSquares,
}

impl Default for ShapeRule {
    fn default() -> Self {
        ShapeRule::Free
    }
}

const SQUARE_CORNERS: [(i32, i32); 4] = [(-1, -1), (0, -1), (-1, 0), (0, 0)];

/// Placement policy for one generation run: where rooms may go and how many of each thing to make.
#[derive(Clone, Debug)]
pub struct Constraints {
    space: SpaceMap,
    limits: Limits,
    shape: ShapeRule,
    initial_rooms: Vec<Coord>,
}

impl Constraints {
    pub fn new(space: SpaceMap, limits: Limits, shape: ShapeRule) -> Result<Self, ContractError> {
        if limits.max_rooms == 0 {
            return Err(ContractError::ZeroMaxRooms);
        }
        let initial_rooms = space.entrance_candidates();

        Ok(Constraints {
            space,
            limits,
            shape,
            initial_rooms,
        })
    }

    pub fn is_valid_room_coordinate(&self, c: Coord, graph: &RoomGraph) -> bool {
        if !self.space.is_free(c) || graph.is_occupied(c) {
            return false;
        }

        match self.shape {
            ShapeRule::Free => true,
            ShapeRule::NoSquares => !completes_square(c, graph),
        }
    }

    /// Cells where the entrance room may be placed.
    pub fn initial_rooms(&self) -> &[Coord] {
        &self.initial_rooms
    }

    pub fn max_rooms(&self) -> usize {
        self.limits.max_rooms
    }

    pub fn max_keys(&self) -> usize {
        self.limits.max_keys
    }

    pub fn max_switches(&self) -> usize {
        self.limits.max_switches
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn space(&self) -> &SpaceMap {
        &self.space
    }

    pub fn shape_rule(&self) -> ShapeRule {
        self.shape
    }
}

fn completes_square(c: Coord, graph: &RoomGraph) -> bool {
    let offset = |base: Coord, (dx, dy): (i32, i32)| {
        Some(Coord::new(base.x.checked_add(dx)?, base.y.checked_add(dy)?))
    };

    SQUARE_CORNERS.iter().any(|d| {
        let corner = match offset(c, *d) {
            Some(corner) => corner,
            None => return false,
        };
        [(0, 0), (1, 0), (0, 1), (1, 1)]
            .iter()
            .map(|o| offset(corner, *o))
            .filter(|cell| *cell != Some(c))
            .all(|cell| cell.map_or(false, |cell| graph.is_occupied(cell)))
    })
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
