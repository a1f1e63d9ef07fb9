use crate::{
    room::{RoomGraph, RoomId},
    symbol::Symbol,
};

use petgraph::{
    algo::connected_components,
    graph::{EdgeReference, NodeIndex, UnGraph},
    visit::{Bfs, EdgeFiltered},
};

/// Undirected view of the rooms. Node `i` is room `i` and each linked pair appears once, weighted
/// by its lock.
pub fn to_petgraph(rooms: &RoomGraph) -> UnGraph<RoomId, Option<Symbol>> {
    let mut graph = UnGraph::with_capacity(rooms.len(), rooms.edge_count());
    for room in rooms.rooms().iter() {
        graph.add_node(room.id());
    }
    for room in rooms.rooms().iter() {
        for edge in room.edges().iter() {
            if room.id() < edge.target {
                graph.add_edge(node(room.id()), node(edge.target), edge.symbol);
            }
        }
    }

    graph
}

pub fn node(id: RoomId) -> NodeIndex {
    NodeIndex::new(id.index())
}

/// Breadth-first order of the nodes reachable from `start` along edges whose weight passes
/// `passable`. Empty if `start` isn't in the graph.
pub fn reachable_from<N, E>(
    graph: &UnGraph<N, E>,
    start: NodeIndex,
    passable: impl Fn(&E) -> bool,
) -> Vec<NodeIndex> {
    if graph.node_weight(start).is_none() {
        return Vec::new();
    }
    let filtered = EdgeFiltered::from_fn(graph, |e: EdgeReference<E>| passable(e.weight()));
    let mut bfs = Bfs::new(&filtered, start);
    let mut order = Vec::new();
    while let Some(n) = bfs.next(&filtered) {
        order.push(n);
    }

    order
}

/// True if every node can reach every other, ignoring edge weights. The empty graph counts as
/// connected.
pub fn is_connected<N, E>(graph: &UnGraph<N, E>) -> bool {
    connected_components(graph) <= 1
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
    use crate::{coord::Coord, symbol::SymbolTable};

    #[test]
    fn test_filtered_reachability_stops_at_locks() {
        let mut rooms = RoomGraph::new();
        let a = rooms.add_entrance(Coord::new(0, 0)).unwrap();
        let b = rooms.add_child(a, Coord::new(1, 0)).unwrap();
        let c = rooms.add_child(b, Coord::new(2, 0)).unwrap();
        let d = rooms.add_child(a, Coord::new(0, 1)).unwrap();
        let key = SymbolTable::new(1, 0).new_key().unwrap();
        rooms.lock_edge(b, c, key).unwrap();

        let graph = to_petgraph(&rooms);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert!(is_connected(&graph));

        let open: Vec<_> = reachable_from(&graph, node(a), |lock| lock.is_none())
            .into_iter()
            .map(|n| graph[n])
            .collect();
        assert_eq!(open.len(), 3);
        assert!(!open.contains(&c));
        assert!(open.contains(&d));

        let all = reachable_from(&graph, node(a), |_| true);
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], node(a));
    }

    #[test]
    fn test_reachability_from_missing_node_is_empty() {
        let mut rooms = RoomGraph::new();
        rooms.add_entrance(Coord::new(0, 0)).unwrap();
        let graph = to_petgraph(&rooms);

        assert!(reachable_from(&graph, node(RoomId::new(3)), |_| true).is_empty());
    }

    #[test]
    fn test_isolated_room_is_disconnected() {
        let mut graph = UnGraph::<u32, ()>::new_undirected();
        let a = graph.add_node(0);
        let b = graph.add_node(1);
        graph.add_node(2);
        graph.add_edge(a, b, ());

        assert!(!is_connected(&graph));
    }
}
