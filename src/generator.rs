use crate::{
    color_map::{Color, ColorMap},
    constraints::Constraints,
    coord::{Coord, ALL_DIRECTIONS},
    error::{ContractError, Error, GenerationFailure},
    graph::{node, reachable_from, to_petgraph},
    room::{Room, RoomGraph, RoomId},
    sampling::{choose, sample_distinct, take},
    symbol::{Symbol, SymbolTable},
    LayoutEncoder,
};

use fnv::{FnvHashMap, FnvHashSet};
use rand::Rng;
use serde::Serialize;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};

/// A symbol together with the room holding it and the edges it opens.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Lock {
    pub symbol: Symbol,
    pub key_room: RoomId,
    /// `(parent, child)` pairs in the room tree.
    pub edges: Vec<(RoomId, RoomId)>,
}

/// An accepted layout: connected, solvable and within budget.
#[derive(Clone, Debug, Serialize)]
pub struct Dungeon {
    pub graph: RoomGraph,
    /// In the order a player can open them.
    pub locks: Vec<Lock>,
    pub goal: RoomId,
    /// Lock level of each room, indexed by id.
    pub levels: Vec<Color>,
    /// Number of attempts it took, including the accepted one.
    pub attempts: usize,
}

impl Dungeon {
    pub fn entrance(&self) -> Option<RoomId> {
        self.graph.entrance()
    }

    pub fn lock_level(&self, room: RoomId) -> Option<Color> {
        self.levels.get(room.index()).copied()
    }

    /// Writes every room that has a lock level, then every linked pair once, into `encoder`.
    pub fn encode(&self, encoder: &mut impl LayoutEncoder) {
        for room in self.graph.rooms().iter() {
            if let Some(level) = self.lock_level(room.id()) {
                encoder.encode_room(room, level);
            }
        }
        for room in self.graph.rooms().iter() {
            for edge in room.edges().iter() {
                if room.id() < edge.target {
                    if let Some(target) = self.graph.room(edge.target) {
                        encoder.encode_door(room, target, edge.symbol);
                    }
                }
            }
        }
    }

    pub fn to_ron(&self) -> Result<String, Error> {
        ron::ser::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// How a single generation attempt ended.
#[derive(Debug)]
pub enum Attempt {
    Accepted(Dungeon),
    Retry(GenerationFailure),
    Fatal(ContractError),
}

enum Abort {
    Retry(GenerationFailure),
    Fatal(ContractError),
}

impl From<GenerationFailure> for Abort {
    fn from(f: GenerationFailure) -> Self {
        Abort::Retry(f)
    }
}

impl From<ContractError> for Abort {
    fn from(e: ContractError) -> Self {
        Abort::Fatal(e)
    }
}

enum LockKind {
    Key,
    Switch,
}

struct PlannedLock {
    kind: LockKind,
    /// Positions into the BFS-ordered list of tree edges, ascending.
    edges: Vec<usize>,
}

fn ordered(a: RoomId, b: RoomId) -> (RoomId, RoomId) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

pub struct Generator<'a> {
    constraints: &'a Constraints,
}

impl<'a> Generator<'a> {
    pub fn new(constraints: &'a Constraints) -> Self {
        Generator { constraints }
    }

    /// Runs attempts until one is accepted. `max_retries` bounds the number of rejected attempts;
    /// `cancel` is checked before each attempt.
    pub fn generate<R: Rng>(
        &self,
        rng: &mut R,
        max_retries: usize,
        cancel: Option<&AtomicBool>,
    ) -> Result<Dungeon, Error> {
        retry_attempts(rng, max_retries, cancel, |rng| self.try_generate(rng))
    }

    /// One pass of Start, GrowGraph, PlaceLocks and Validate on fresh state.
    pub fn try_generate<R: Rng>(&self, rng: &mut R) -> Attempt {
        match self.run_attempt(rng) {
            Ok(dungeon) => Attempt::Accepted(dungeon),
            Err(Abort::Retry(reason)) => Attempt::Retry(reason),
            Err(Abort::Fatal(e)) => Attempt::Fatal(e),
        }
    }

    fn run_attempt<R: Rng>(&self, rng: &mut R) -> Result<Dungeon, Abort> {
        let mut graph = RoomGraph::new();
        let mut symbols = SymbolTable::new(
            self.constraints.max_keys(),
            self.constraints.max_switches(),
        );

        let entrance = self.start(&mut graph, rng)?;
        if let Some(room) = graph.room(entrance) {
            log::debug!("Entrance {} at {}", entrance, room.coord());
        }

        self.grow_graph(&mut graph, rng)?;
        log::debug!("Grew {} rooms", graph.len());

        let goal = place_goal(&mut graph, &mut symbols)?;
        let locks = self.place_locks(&mut graph, &mut symbols, rng)?;
        log::debug!("Placed {} locks", locks.len());

        let levels = validate(&graph)?;
        debug_assert!(graph.len() <= self.constraints.max_rooms());
        debug_assert!(symbols.keys_issued() <= self.constraints.max_keys());
        debug_assert!(symbols.switches_issued() <= self.constraints.max_switches());

        Ok(Dungeon {
            graph,
            locks,
            goal,
            levels,
            attempts: 1,
        })
    }

    fn start<R: Rng>(&self, graph: &mut RoomGraph, rng: &mut R) -> Result<RoomId, Abort> {
        let coord = *choose(rng, self.constraints.initial_rooms())
            .ok_or(GenerationFailure::NoValidEntrance)?;

        Ok(graph.add_entrance(coord)?)
    }

    fn grow_graph<R: Rng>(&self, graph: &mut RoomGraph, rng: &mut R) -> Result<(), Abort> {
        let wanted = self.constraints.max_rooms();
        while graph.len() < wanted {
            let current: &RoomGraph = graph;
            let expandable: Vec<(RoomId, Vec<Coord>)> = current
                .rooms()
                .iter()
                .filter_map(|room| {
                    let open: Vec<Coord> = ALL_DIRECTIONS
                        .iter()
                        .filter_map(|d| room.coord().step(*d))
                        .filter(|c| self.constraints.is_valid_room_coordinate(*c, current))
                        .collect();
                    if open.is_empty() {
                        None
                    } else {
                        Some((room.id(), open))
                    }
                })
                .collect();

            let (parent, open) =
                choose(rng, &expandable).ok_or(GenerationFailure::NoLegalExpansion {
                    grown: graph.len(),
                    wanted,
                })?;
            if let Some(coord) = choose(rng, open) {
                graph.add_child(*parent, *coord)?;
            }
        }

        Ok(())
    }

    /// Gates tree edges with keys and switches, then places each symbol where a player can pick
    /// it up before reaching any of its gates.
    fn place_locks<R: Rng>(
        &self,
        graph: &mut RoomGraph,
        symbols: &mut SymbolTable,
        rng: &mut R,
    ) -> Result<Vec<Lock>, Abort> {
        let entrance = graph.entrance().ok_or(ContractError::MissingEntrance)?;
        let view = to_petgraph(graph);

        // Parent before child.
        let tree_edges: Vec<(RoomId, RoomId)> = reachable_from(&view, node(entrance), |_| true)
            .into_iter()
            .filter_map(|n| {
                let child = graph.room(view[n])?;
                child.parent().map(|p| (p, child.id()))
            })
            .collect();

        let plan = plan_locks(
            rng,
            tree_edges.len(),
            symbols.remaining_key_budget(),
            symbols.remaining_switch_budget(),
        );

        let mut gate_of = FnvHashMap::default();
        for (g, planned) in plan.iter().enumerate() {
            for &e in planned.edges.iter() {
                let (p, c) = tree_edges[e];
                gate_of.insert(ordered(p, c), g);
            }
        }
        let gated = view.map(
            |_, id| *id,
            |e, _| {
                view.edge_endpoints(e)
                    .and_then(|(a, b)| gate_of.get(&ordered(view[a], view[b])).copied())
            },
        );

        let mut locks = Vec::with_capacity(plan.len());
        for (g, planned) in plan.iter().enumerate() {
            let edges: Vec<(RoomId, RoomId)> =
                planned.edges.iter().map(|&e| tree_edges[e]).collect();
            let lock_depth = edges
                .iter()
                .filter_map(|(_, c)| graph.room(*c).map(Room::depth))
                .min()
                .unwrap_or(0);

            // Rooms open once every earlier lock is open, excluding this lock's own gates.
            let key_rooms: Vec<RoomId> =
                reachable_from(&gated, node(entrance), |gate| gate.map_or(true, |h| h < g))
                    .into_iter()
                    .filter_map(|n| graph.room(gated[n]))
                    .filter(|r| r.symbol().is_none() && r.depth() < lock_depth)
                    .map(Room::id)
                    .collect();
            let key_room =
                *choose(rng, &key_rooms).ok_or(GenerationFailure::NoKeyRoom { lock: g })?;

            let symbol = match planned.kind {
                LockKind::Key => symbols.new_key()?,
                LockKind::Switch => symbols.new_switch(edges.len() as u32)?,
            };
            graph.place_symbol(key_room, symbol)?;
            for &(p, c) in edges.iter() {
                graph.lock_edge(p, c, symbol)?;
            }
            log::debug!("{} in room {} opens {:?}", symbol, key_room, edges);

            locks.push(Lock {
                symbol,
                key_room,
                edges,
            });
        }

        Ok(locks)
    }
}

/// Every attempt draws from `rng` where the previous one stopped, so a rejected layout is never
/// replayed.
fn retry_attempts<R: Rng>(
    rng: &mut R,
    max_retries: usize,
    cancel: Option<&AtomicBool>,
    mut attempt: impl FnMut(&mut R) -> Attempt,
) -> Result<Dungeon, Error> {
    let mut retries = 0;
    loop {
        if cancel.map_or(false, |flag| flag.load(Ordering::Relaxed)) {
            log::warn!("Generation cancelled after {} attempts", retries);
            return Err(GenerationFailure::Cancelled { attempts: retries }.into());
        }

        match attempt(rng) {
            Attempt::Accepted(mut dungeon) => {
                dungeon.attempts = retries + 1;
                log::info!(
                    "Accepted dungeon with {} rooms and {} locks after {} attempts",
                    dungeon.graph.len(),
                    dungeon.locks.len(),
                    dungeon.attempts
                );
                return Ok(dungeon);
            }
            // No amount of retrying will make an entrance appear.
            Attempt::Retry(GenerationFailure::NoValidEntrance) => {
                return Err(GenerationFailure::NoValidEntrance.into());
            }
            Attempt::Retry(reason) => {
                retries += 1;
                log::debug!("Attempt {} rejected: {}", retries, reason);
                if retries > max_retries {
                    log::warn!("Giving up after {} attempts", retries);
                    return Err(GenerationFailure::ExhaustedRetries { attempts: retries }.into());
                }
            }
            Attempt::Fatal(e) => {
                log::warn!("Attempt {} hit a contract violation: {}", retries + 1, e);
                return Err(e.into());
            }
        }
    }
}

/// Picks which of `num_edges` tree edges get gated. Keys take one edge each; a switch takes one
/// edge and, half of the time, a second. Returned in order of each lock's earliest edge.
fn plan_locks<R: Rng>(
    rng: &mut R,
    num_edges: usize,
    key_budget: usize,
    switch_budget: usize,
) -> Vec<PlannedLock> {
    let key_edges = sample_distinct(rng, num_edges, key_budget);
    let mut plan: Vec<PlannedLock> = key_edges
        .iter()
        .map(|&e| PlannedLock {
            kind: LockKind::Key,
            edges: vec![e],
        })
        .collect();

    let mut free: Vec<usize> = (0..num_edges).filter(|e| !key_edges.contains(e)).collect();
    for _ in 0..switch_budget {
        let mut edges = match take(rng, &mut free) {
            Some(e) => vec![e],
            None => break,
        };
        if !free.is_empty() && rng.gen_bool(0.5) {
            edges.extend(take(rng, &mut free));
        }
        edges.sort_unstable();
        plan.push(PlannedLock {
            kind: LockKind::Switch,
            edges,
        });
    }

    plan.sort_by_key(|p| p.edges[0]);

    plan
}

/// The deepest room holds the goal.
fn place_goal(graph: &mut RoomGraph, symbols: &mut SymbolTable) -> Result<RoomId, ContractError> {
    let goal = graph
        .rooms()
        .iter()
        .max_by_key(|r| (r.depth(), Reverse(r.id())))
        .map(Room::id)
        .ok_or(ContractError::MissingEntrance)?;
    graph.place_symbol(goal, symbols.new_goal())?;

    Ok(goal)
}

/// Accepts a graph only if it's structurally connected, solvable by collecting symbols, and
/// spatially connected. Returns each room's lock level.
fn validate(graph: &RoomGraph) -> Result<Vec<Color>, Abort> {
    let entrance = graph.entrance().ok_or(ContractError::MissingEntrance)?;
    let view = to_petgraph(graph);

    let structural = reachable_from(&view, node(entrance), |_| true);
    if structural.len() != graph.len() {
        return Err(GenerationFailure::NotConnected.into());
    }

    let levels = collect_levels(graph, entrance)?;

    let mut colors = ColorMap::new();
    for n in structural.into_iter() {
        if let Some(room) = graph.room(view[n]) {
            colors.set(room.coord(), levels[room.id().index()]);
        }
    }
    colors.check_connected()?;

    Ok(levels)
}

/// Plays the dungeon: repeatedly walks every open edge from the entrance and picks up every
/// symbol found. A room's level is the round in which it was first entered. Fails with
/// `LockBeforeKey` if some room is never entered, or `UnknownRoom` if `entrance` isn't in the
/// graph.
pub fn lock_levels(graph: &RoomGraph, entrance: RoomId) -> Result<Vec<Color>, Error> {
    collect_levels(graph, entrance).map_err(|abort| match abort {
        Abort::Retry(f) => f.into(),
        Abort::Fatal(e) => e.into(),
    })
}

fn collect_levels(graph: &RoomGraph, entrance: RoomId) -> Result<Vec<Color>, Abort> {
    graph
        .room(entrance)
        .ok_or(ContractError::UnknownRoom(entrance))?;
    let view = to_petgraph(graph);
    let mut levels: Vec<Option<Color>> = vec![None; graph.len()];
    let mut held: FnvHashSet<Symbol> = FnvHashSet::default();
    let mut round = 0;
    loop {
        let reached = reachable_from(&view, node(entrance), |lock| {
            lock.map_or(true, |s| held.contains(&s))
        });
        let num_held = held.len();
        for n in reached.into_iter() {
            let id = view[n];
            if levels[id.index()].is_none() {
                levels[id.index()] = Some(round);
            }
            if let Some(symbol) = graph.room(id).and_then(Room::symbol) {
                held.insert(symbol);
            }
        }
        if held.len() == num_held {
            break;
        }
        round += 1;
    }

    let unreached = levels.iter().filter(|l| l.is_none()).count();
    if unreached > 0 {
        return Err(GenerationFailure::LockBeforeKey { unreached }.into());
    }

    Ok(levels.into_iter().flatten().collect())
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
