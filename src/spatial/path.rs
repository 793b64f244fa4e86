//! Road network and A* routing
//!
//! Movement follows roads where possible: every parcel is mapped once to its
//! nearest road node, and travel between two parcels is an A* search between
//! their nearest nodes. The caller appends the literal goal parcel, which is
//! usually not itself a road node.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use rand::Rng;

use crate::core::types::{GridPoint, NodeId};

/// A junction or bend in the road network
#[derive(Debug, Clone)]
pub struct RoadNode {
    pub location: GridPoint,
    /// Neighboring nodes with Euclidean edge weights
    pub links: Vec<(NodeId, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    pub nodes: Vec<RoadNode>,
}

impl RoadNetwork {
    pub fn add_node(&mut self, location: GridPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(RoadNode {
            location,
            links: Vec::new(),
        });
        id
    }

    /// Link two nodes both ways with their Euclidean distance as weight
    pub fn link(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let weight = self.nodes[a.idx()]
            .location
            .distance_to(&self.nodes[b.idx()].location);
        self.nodes[a.idx()].links.push((b, weight));
        self.nodes[b.idx()].links.push((a, weight));
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn heuristic(roads: &RoadNetwork, a: NodeId, b: NodeId) -> f64 {
    roads.nodes[a.idx()]
        .location
        .distance_to(&roads.nodes[b.idx()].location)
}

/// Minimal-cost route between two road nodes, start and goal included.
///
/// Returns None when the goal is unreachable; the caller is expected to fall
/// back to direct stepping rather than treat that as an error.
pub fn astar_path(roads: &RoadNetwork, start: NodeId, goal: NodeId) -> Option<Vec<NodeId>> {
    if start == goal {
        return Some(vec![start]);
    }

    let mut g_score: AHashMap<NodeId, f64> = AHashMap::new();
    let mut came_from: AHashMap<NodeId, NodeId> = AHashMap::new();
    let mut open: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeId)>> = BinaryHeap::new();

    g_score.insert(start, 0.0);
    open.push(Reverse((OrderedFloat(heuristic(roads, start, goal)), start)));

    while let Some(Reverse((f, current))) = open.pop() {
        if current == goal {
            let mut route = vec![goal];
            let mut node = goal;
            while let Some(&prev) = came_from.get(&node) {
                route.push(prev);
                node = prev;
            }
            route.reverse();
            return Some(route);
        }

        // stale heap entry: a cheaper path to this node was already expanded
        let current_g = g_score[&current];
        if f.0 - heuristic(roads, current, goal) > current_g + 1e-9 {
            continue;
        }

        for &(next, weight) in &roads.nodes[current.idx()].links {
            let tentative = current_g + weight;
            let better = match g_score.get(&next) {
                Some(&g) => tentative < g,
                None => true,
            };
            if better {
                g_score.insert(next, tentative);
                came_from.insert(next, current);
                open.push(Reverse((
                    OrderedFloat(tentative + heuristic(roads, next, goal)),
                    next,
                )));
            }
        }
    }

    None
}

/// Map every grid cell to its nearest road node.
///
/// Multi-source flood fill: one crawler starts on each road node and the
/// frontier expands one ring per generation, drawing crawlers in random
/// order so equidistant cells are claimed by a random contender. Expansion
/// is over the 4-neighborhood.
pub fn nearest_road_nodes<R: Rng>(
    width: i32,
    height: i32,
    roads: &RoadNetwork,
    rng: &mut R,
) -> Vec<Option<NodeId>> {
    let cells = (width as usize) * (height as usize);
    let mut closest: Vec<Option<NodeId>> = vec![None; cells];
    let index = |p: GridPoint| (p.y as usize) * (width as usize) + (p.x as usize);

    let mut crawlers: Vec<(NodeId, GridPoint)> = roads
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (NodeId(i as u32), n.location))
        .collect();

    while !crawlers.is_empty() {
        let mut next_generation = Vec::new();
        while !crawlers.is_empty() {
            let pick = rng.gen_range(0..crawlers.len());
            let (node, location) = crawlers.swap_remove(pick);

            if closest[index(location)].is_some() {
                continue;
            }
            closest[index(location)] = Some(node);

            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let neighbor = GridPoint::new(location.x + dx, location.y + dy);
                if neighbor.x < 0 || neighbor.x >= width || neighbor.y < 0 || neighbor.y >= height {
                    continue;
                }
                if closest[index(neighbor)].is_none() {
                    next_generation.push((node, neighbor));
                }
            }
        }
        crawlers = next_generation;
    }

    closest
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn line_network() -> RoadNetwork {
        // 0 - 1 - 2 - 3 in a line, plus a detached node 4
        let mut roads = RoadNetwork::default();
        for x in 0..4 {
            roads.add_node(GridPoint::new(x * 2, 0));
        }
        roads.add_node(GridPoint::new(100, 100));
        roads.link(NodeId(0), NodeId(1));
        roads.link(NodeId(1), NodeId(2));
        roads.link(NodeId(2), NodeId(3));
        roads
    }

    #[test]
    fn test_astar_finds_line_route() {
        let roads = line_network();
        let route = astar_path(&roads, NodeId(0), NodeId(3)).expect("route exists");
        assert_eq!(route, vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn test_astar_start_equals_goal() {
        let roads = line_network();
        assert_eq!(
            astar_path(&roads, NodeId(2), NodeId(2)),
            Some(vec![NodeId(2)])
        );
    }

    #[test]
    fn test_astar_disconnected_returns_none() {
        let roads = line_network();
        assert_eq!(astar_path(&roads, NodeId(0), NodeId(4)), None);
    }

    #[test]
    fn test_astar_prefers_cheaper_route() {
        // square with a shortcut diagonal
        let mut roads = RoadNetwork::default();
        let a = roads.add_node(GridPoint::new(0, 0));
        let b = roads.add_node(GridPoint::new(10, 0));
        let c = roads.add_node(GridPoint::new(10, 10));
        let d = roads.add_node(GridPoint::new(0, 10));
        roads.link(a, b);
        roads.link(b, c);
        roads.link(a, d);
        roads.link(d, c);
        roads.link(a, c); // diagonal, cheapest
        let route = astar_path(&roads, a, c).unwrap();
        assert_eq!(route, vec![a, c]);
    }

    #[test]
    fn test_nearest_nodes_cover_grid() {
        let roads = {
            let mut r = RoadNetwork::default();
            r.add_node(GridPoint::new(1, 1));
            r.add_node(GridPoint::new(8, 8));
            r
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let closest = nearest_road_nodes(10, 10, &roads, &mut rng);
        assert!(closest.iter().all(|c| c.is_some()));
        // corners resolve to the node on their side
        assert_eq!(closest[0], Some(NodeId(0)));
        assert_eq!(closest[99], Some(NodeId(1)));
    }

    #[test]
    fn test_nearest_nodes_empty_network() {
        let roads = RoadNetwork::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let closest = nearest_road_nodes(4, 4, &roads, &mut rng);
        assert!(closest.iter().all(|c| c.is_none()));
    }
}
