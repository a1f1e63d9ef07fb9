use crate::{coord::Coord, error::ContractError, symbol::Symbol};

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct RoomId(u32);

impl RoomId {
    pub fn new(index: usize) -> Self {
        RoomId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One direction of a link between two rooms. With no symbol, the edge is always traversable.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Edge {
    pub target: RoomId,
    pub symbol: Option<Symbol>,
}

impl Edge {
    pub fn is_locked(&self) -> bool {
        self.symbol.is_some()
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Room {
    id: RoomId,
    coord: Coord,
    parent: Option<RoomId>,
    depth: u32,
    symbol: Option<Symbol>,
    edges: Vec<Edge>,
}

impl Room {
    pub fn new(id: RoomId, coord: Coord) -> Self {
        Room {
            id,
            coord,
            parent: None,
            depth: 0,
            symbol: None,
            edges: Vec::new(),
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    /// The room this one was grown from. `None` for the entrance.
    pub fn parent(&self) -> Option<RoomId> {
        self.parent
    }

    /// Number of edges between this room and the entrance.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn symbol(&self) -> Option<Symbol> {
        self.symbol
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge_to(&self, target: RoomId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.target == target)
    }

    fn edge_to_mut(&mut self, target: RoomId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.target == target)
    }
}

/// Hands out room ids. Rooms are never removed from a graph, so the next id is always the lowest
/// one not in use.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> RoomId {
        let id = RoomId(self.next);
        self.next += 1;

        id
    }

    pub fn allocated(&self) -> usize {
        self.next as usize
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

/// Rooms stored densely by id, with a coordinate index to keep every cell to at most one room.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RoomGraph {
    entrance: Option<RoomId>,
    rooms: Vec<Room>,
    #[serde(skip)]
    by_coord: FnvHashMap<Coord, RoomId>,
    #[serde(skip)]
    ids: IdAllocator,
}

impl RoomGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a graph from rooms made elsewhere, checking every structural invariant.
    pub fn from_rooms(entrance: RoomId, mut rooms: Vec<Room>) -> Result<Self, ContractError> {
        rooms.sort_by_key(|r| r.id);

        let mut graph = RoomGraph::new();
        for room in rooms.into_iter() {
            let expected = RoomId::new(graph.rooms.len());
            if room.id < expected {
                return Err(ContractError::DuplicateRoomId(room.id));
            }
            if room.id > expected {
                return Err(ContractError::SparseRoomId {
                    expected,
                    found: room.id,
                });
            }
            if let Some(other) = graph.by_coord.get(&room.coord) {
                return Err(ContractError::CoordinateTaken(room.coord, *other));
            }
            graph.ids.allocate();
            graph.by_coord.insert(room.coord, room.id);
            graph.rooms.push(room);
        }

        for room in graph.rooms.iter() {
            for (i, edge) in room.edges.iter().enumerate() {
                if room.edges[..i].iter().any(|e| e.target == edge.target) {
                    return Err(ContractError::DuplicateEdge(room.id, edge.target));
                }
                let target = graph
                    .room(edge.target)
                    .ok_or(ContractError::UnknownRoom(edge.target))?;
                if !room.coord.is_adjacent(target.coord) {
                    return Err(ContractError::NotAdjacent(room.id, target.id));
                }
                if target.edge_to(room.id) != Some(&Edge { target: room.id, symbol: edge.symbol }) {
                    return Err(ContractError::MissingEdge(target.id, room.id));
                }
            }
        }

        graph.room(entrance).ok_or(ContractError::UnknownRoom(entrance))?;
        for room in graph.rooms.iter() {
            let consistent = match room.parent {
                None => room.id == entrance && room.depth == 0,
                Some(p) => {
                    room.id != entrance
                        && room.edge_to(p).is_some()
                        && graph.room(p).map(|p| p.depth + 1) == Some(room.depth)
                }
            };
            if !consistent {
                return Err(ContractError::BadParent(room.id));
            }
        }
        graph.entrance = Some(entrance);

        Ok(graph)
    }

    fn push_room(&mut self, coord: Coord, parent: Option<&Room>) -> Result<RoomId, ContractError> {
        if let Some(other) = self.by_coord.get(&coord) {
            return Err(ContractError::CoordinateTaken(coord, *other));
        }

        let id = self.ids.allocate();
        if id.index() != self.rooms.len() {
            return Err(ContractError::DuplicateRoomId(id));
        }

        let mut room = Room::new(id, coord);
        if let Some(p) = parent {
            room.parent = Some(p.id);
            room.depth = p.depth + 1;
        }
        self.by_coord.insert(coord, id);
        self.rooms.push(room);

        Ok(id)
    }

    pub fn add_entrance(&mut self, coord: Coord) -> Result<RoomId, ContractError> {
        if self.entrance.is_some() {
            return Err(ContractError::EntranceAlreadySet);
        }
        let id = self.push_room(coord, None)?;
        self.entrance = Some(id);

        Ok(id)
    }

    /// Grows a new room out of `parent`, joined to it by an unconditional edge.
    pub fn add_child(&mut self, parent: RoomId, coord: Coord) -> Result<RoomId, ContractError> {
        let parent_room = self.room(parent).ok_or(ContractError::UnknownRoom(parent))?.clone();
        if !parent_room.coord.is_adjacent(coord) {
            // Checked before an id is allocated.
            return Err(ContractError::NotAdjacent(parent, RoomId::new(self.rooms.len())));
        }
        let id = self.push_room(coord, Some(&parent_room))?;
        self.link(parent, id)?;

        Ok(id)
    }

    /// Registers an unconditional edge in both directions. Linking twice is a no-op.
    pub fn link(&mut self, a: RoomId, b: RoomId) -> Result<(), ContractError> {
        let a_coord = self.room(a).ok_or(ContractError::UnknownRoom(a))?.coord;
        let b_coord = self.room(b).ok_or(ContractError::UnknownRoom(b))?.coord;
        if !a_coord.is_adjacent(b_coord) {
            return Err(ContractError::NotAdjacent(a, b));
        }
        if self.rooms[a.index()].edge_to(b).is_some() {
            return Ok(());
        }

        self.rooms[a.index()].edges.push(Edge {
            target: b,
            symbol: None,
        });
        self.rooms[b.index()].edges.push(Edge {
            target: a,
            symbol: None,
        });

        Ok(())
    }

    /// Gates the edge between `a` and `b` in both directions.
    pub fn lock_edge(&mut self, a: RoomId, b: RoomId, symbol: Symbol) -> Result<(), ContractError> {
        self.room(a).ok_or(ContractError::UnknownRoom(a))?;
        self.room(b).ok_or(ContractError::UnknownRoom(b))?;
        let existing = self.rooms[a.index()]
            .edge_to(b)
            .ok_or(ContractError::MissingEdge(a, b))?
            .symbol;
        if let Some(symbol) = existing {
            return Err(ContractError::AlreadyLocked {
                from: a,
                to: b,
                symbol,
            });
        }

        for &(from, to) in [(a, b), (b, a)].iter() {
            let edge = self.rooms[from.index()]
                .edge_to_mut(to)
                .ok_or(ContractError::MissingEdge(from, to))?;
            edge.symbol = Some(symbol);
        }

        Ok(())
    }

    pub fn place_symbol(&mut self, room: RoomId, symbol: Symbol) -> Result<(), ContractError> {
        let r = self
            .rooms
            .get_mut(room.index())
            .ok_or(ContractError::UnknownRoom(room))?;
        if let Some(held) = r.symbol {
            return Err(ContractError::RoomOccupied { room, symbol: held });
        }
        r.symbol = Some(symbol);

        Ok(())
    }

    pub fn entrance(&self) -> Option<RoomId> {
        self.entrance
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.index())
    }

    pub fn room_at(&self, coord: Coord) -> Option<&Room> {
        self.by_coord.get(&coord).and_then(|id| self.room(*id))
    }

    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.by_coord.contains_key(&coord)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Number of linked room pairs.
    pub fn edge_count(&self) -> usize {
        self.rooms.iter().map(|r| r.edges.len()).sum::<usize>() / 2
    }

    /// Every locked pair once, lower id first.
    pub fn locked_edges(&self) -> Vec<(RoomId, RoomId, Symbol)> {
        let mut locked = Vec::new();
        for room in self.rooms.iter() {
            for edge in room.edges.iter() {
                if let Some(symbol) = edge.symbol {
                    if room.id < edge.target {
                        locked.push((room.id, edge.target, symbol));
                    }
                }
            }
        }

        locked
    }

    pub fn symbol_room(&self, symbol: Symbol) -> Option<RoomId> {
        self.rooms
            .iter()
            .find(|r| r.symbol == Some(symbol))
            .map(|r| r.id)
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
    use crate::symbol::SymbolTable;

    fn corridor() -> RoomGraph {
        let mut graph = RoomGraph::new();
        let a = graph.add_entrance(Coord::new(0, 2)).unwrap();
        let b = graph.add_child(a, Coord::new(0, 1)).unwrap();
        graph.add_child(b, Coord::new(0, 0)).unwrap();

        graph
    }

    #[test]
    fn test_children_track_parent_and_depth() {
        let graph = corridor();
        let last = graph.room(RoomId::new(2)).unwrap();

        assert_eq!(last.parent(), Some(RoomId::new(1)));
        assert_eq!(last.depth(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.room_at(Coord::new(0, 1)).map(Room::id), Some(RoomId::new(1)));
    }

    #[test]
    fn test_rooms_cannot_share_a_coordinate() {
        let mut graph = corridor();

        assert_eq!(
            graph.add_child(RoomId::new(2), Coord::new(0, 1)),
            Err(ContractError::CoordinateTaken(Coord::new(0, 1), RoomId::new(1)))
        );
        assert_eq!(graph.len(), 3);
        assert_eq!(
            graph.add_entrance(Coord::new(5, 5)),
            Err(ContractError::EntranceAlreadySet)
        );
    }

    #[test]
    fn test_lock_is_mutual_and_permanent() {
        let mut graph = corridor();
        let mut symbols = SymbolTable::new(2, 0);
        let key = symbols.new_key().unwrap();
        let other = symbols.new_key().unwrap();
        let (a, b) = (RoomId::new(1), RoomId::new(2));

        graph.lock_edge(b, a, key).unwrap();
        assert_eq!(graph.room(a).unwrap().edge_to(b).unwrap().symbol, Some(key));
        assert_eq!(graph.room(b).unwrap().edge_to(a).unwrap().symbol, Some(key));
        assert_eq!(graph.locked_edges(), vec![(a, b, key)]);

        assert_eq!(
            graph.lock_edge(a, b, other),
            Err(ContractError::AlreadyLocked {
                from: a,
                to: b,
                symbol: key
            })
        );
        assert_eq!(
            graph.lock_edge(RoomId::new(0), b, other),
            Err(ContractError::MissingEdge(RoomId::new(0), b))
        );
    }

    #[test]
    fn test_room_holds_one_symbol() {
        let mut graph = corridor();
        let mut symbols = SymbolTable::new(1, 0);
        let key = symbols.new_key().unwrap();
        let goal = symbols.new_goal();

        graph.place_symbol(RoomId::new(0), key).unwrap();
        assert_eq!(graph.symbol_room(key), Some(RoomId::new(0)));
        assert_eq!(
            graph.place_symbol(RoomId::new(0), goal),
            Err(ContractError::RoomOccupied {
                room: RoomId::new(0),
                symbol: key
            })
        );
    }

    #[test]
    fn test_from_rooms_rejects_duplicate_ids() {
        let rooms = vec![
            Room::new(RoomId::new(0), Coord::new(0, 0)),
            Room::new(RoomId::new(0), Coord::new(1, 0)),
        ];

        assert_eq!(
            RoomGraph::from_rooms(RoomId::new(0), rooms).unwrap_err(),
            ContractError::DuplicateRoomId(RoomId::new(0))
        );
    }

    #[test]
    fn test_from_rooms_round_trips_a_grown_graph() {
        let graph = corridor();
        let rebuilt = RoomGraph::from_rooms(RoomId::new(0), graph.rooms().to_vec()).unwrap();

        assert_eq!(rebuilt.rooms(), graph.rooms());
        assert_eq!(rebuilt.entrance(), Some(RoomId::new(0)));
        assert!(rebuilt.is_occupied(Coord::new(0, 0)));
    }

    #[test]
    fn test_from_rooms_rejects_repeated_edges() {
        let mut rooms = corridor().rooms().to_vec();
        let again = rooms[1].edges[0];
        rooms[1].edges.push(again);

        assert_eq!(
            RoomGraph::from_rooms(RoomId::new(0), rooms).unwrap_err(),
            ContractError::DuplicateEdge(RoomId::new(1), again.target)
        );
    }

    #[test]
    fn test_from_rooms_rejects_contradicting_parents() {
        let graph = corridor();

        let mut wrong_depth = graph.rooms().to_vec();
        wrong_depth[2].depth = 5;
        assert_eq!(
            RoomGraph::from_rooms(RoomId::new(0), wrong_depth).unwrap_err(),
            ContractError::BadParent(RoomId::new(2))
        );

        let mut unlinked_parent = graph.rooms().to_vec();
        unlinked_parent[2].parent = Some(RoomId::new(0));
        unlinked_parent[2].depth = 1;
        assert_eq!(
            RoomGraph::from_rooms(RoomId::new(0), unlinked_parent).unwrap_err(),
            ContractError::BadParent(RoomId::new(2))
        );

        assert_eq!(
            RoomGraph::from_rooms(RoomId::new(1), graph.rooms().to_vec()).unwrap_err(),
            ContractError::BadParent(RoomId::new(0))
        );
    }

    #[test]
    fn test_allocator_resets() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), RoomId::new(0));
        assert_eq!(ids.allocate(), RoomId::new(1));
        ids.reset();
        assert_eq!(ids.allocate(), RoomId::new(0));
        assert_eq!(ids.allocated(), 1);
    }
}
