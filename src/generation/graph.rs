//! # Room Graph
//!
//! Grows the door graph of a level outward from the origin and decides which
//! room plays which role. No tiles are produced here; the layout generator
//! runs only after every role is final.

use crate::game::{Direction, Doors, Position, RoomType};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// One room slot in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphNode {
    pub doors: Doors,
    pub room_type: RoomType,
}

/// Rooms of a level as grid coordinates joined by doors.
#[derive(Debug, Clone, Default)]
pub struct RoomGraph {
    nodes: HashMap<Position, GraphNode>,
    order: Vec<Position>,
}

impl RoomGraph {
    /// Number of rooms in the graph.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, coords: Position) -> bool {
        self.nodes.contains_key(&coords)
    }

    pub fn node(&self, coords: Position) -> Option<&GraphNode> {
        self.nodes.get(&coords)
    }

    /// Room coordinates in the order they were placed; the start room is first.
    pub fn order(&self) -> &[Position] {
        &self.order
    }

    /// Coordinates of every room with the given role, in placement order.
    pub fn rooms_of_type(&self, room_type: RoomType) -> Vec<Position> {
        self.order
            .iter()
            .copied()
            .filter(|coords| self.nodes[coords].room_type == room_type)
            .collect()
    }

    fn insert(&mut self, coords: Position, room_type: RoomType) {
        self.nodes.insert(
            coords,
            GraphNode {
                doors: Doors::default(),
                room_type,
            },
        );
        self.order.push(coords);
    }

    /// Opens the door between `from` and its neighbour in `direction`, on both sides.
    fn connect(&mut self, from: Position, direction: Direction) {
        if let Some(node) = self.nodes.get_mut(&from) {
            node.doors.set(direction, true);
        }
        if let Some(node) = self.nodes.get_mut(&from.step(direction)) {
            node.doors.set(direction.opposite(), true);
        }
    }

    fn set_role(&mut self, coords: Position, room_type: RoomType) {
        if let Some(node) = self.nodes.get_mut(&coords) {
            node.room_type = room_type;
        }
    }
}

/// Builds a [`RoomGraph`] by randomized edge expansion.
///
/// Starting from the origin, an open (room, direction) edge is drawn
/// uniformly at random; if the neighbouring slot is free a room is placed
/// there and its three other sides become open edges. Edges that hit an
/// occupied slot are discarded, so the final count may fall short of the
/// target.
#[derive(Debug, Clone)]
pub struct RoomGraphBuilder {
    /// Number of rooms to aim for, including the start room
    pub target_room_count: usize,
}

impl RoomGraphBuilder {
    pub fn new(target_room_count: usize) -> Self {
        Self { target_room_count }
    }

    /// Grows the graph and assigns roles.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::SeedableRng;
    /// use warren::{RoomGraphBuilder, RoomType};
    ///
    /// let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    /// let graph = RoomGraphBuilder::new(6).build(&mut rng);
    /// assert!(graph.len() <= 6);
    /// assert_eq!(graph.rooms_of_type(RoomType::Start).len(), 1);
    /// assert!(!graph.rooms_of_type(RoomType::Boss).is_empty());
    /// ```
    pub fn build(&self, rng: &mut StdRng) -> RoomGraph {
        let mut graph = self.grow(rng);
        self.assign_roles(&mut graph, rng);
        graph
    }

    /// Places rooms and doors. Every room except the start is tentatively normal.
    pub fn grow(&self, rng: &mut StdRng) -> RoomGraph {
        let mut graph = RoomGraph::default();
        let origin = Position::origin();
        graph.insert(origin, RoomType::Start);

        let mut open_edges: Vec<(Position, Direction)> = Direction::all()
            .into_iter()
            .map(|direction| (origin, direction))
            .collect();

        while graph.len() < self.target_room_count && !open_edges.is_empty() {
            let index = rng.gen_range(0..open_edges.len());
            let (from, direction) = open_edges.swap_remove(index);
            let coords = from.step(direction);

            if graph.contains(coords) {
                continue;
            }

            graph.insert(coords, RoomType::Normal);
            graph.connect(from, direction);
            debug!("Placed room {} through the {:?} door of {}", coords, direction, from);

            let incoming = direction.opposite();
            for next in Direction::all() {
                if next != incoming {
                    open_edges.push((coords, next));
                }
            }
        }

        if graph.len() < self.target_room_count {
            warn!(
                "Room graph stopped at {} of {} rooms",
                graph.len(),
                self.target_room_count
            );
        }

        graph
    }

    /// Assigns the boss and treasure roles, repairing them if growth skipped one.
    ///
    /// The boss goes to the first room placed once at most two rooms remain to
    /// reach the target; the treasure room to the first other room placed once
    /// half the target is reached.
    pub fn assign_roles(&self, graph: &mut RoomGraph, rng: &mut StdRng) {
        let target = self.target_room_count;
        let mut boss = None;
        let mut treasure = None;

        // Index i is also the number of rooms placed before it
        for (index, &coords) in graph.order.iter().enumerate().skip(1) {
            if boss.is_none() && index + 2 >= target {
                boss = Some(coords);
            } else if treasure.is_none() && index >= target / 2 {
                treasure = Some(coords);
            }
        }

        if let Some(coords) = boss {
            graph.set_role(coords, RoomType::Boss);
        }
        if let Some(coords) = treasure {
            graph.set_role(coords, RoomType::Treasure);
        }

        if boss.is_none() {
            Self::repair_role(graph, RoomType::Boss, rng);
        }
        if treasure.is_none() {
            Self::repair_role(graph, RoomType::Treasure, rng);
        }
    }

    fn repair_role(graph: &mut RoomGraph, role: RoomType, rng: &mut StdRng) {
        let normal_rooms = graph.rooms_of_type(RoomType::Normal);
        match normal_rooms.choose(rng) {
            Some(&coords) => {
                debug!("Retyped room {} as {:?}", coords, role);
                graph.set_role(coords, role);
            }
            None => warn!("No normal room left to become the {:?} room", role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::{HashSet, VecDeque};

    fn reachable(graph: &RoomGraph) -> HashSet<Position> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(Position::origin());
        seen.insert(Position::origin());
        while let Some(coords) = queue.pop_front() {
            let node = graph.node(coords).unwrap();
            for direction in node.doors.open_directions() {
                let next = coords.step(direction);
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    #[test]
    fn test_graph_size_and_roles() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let graph = RoomGraphBuilder::new(6).build(&mut rng);

            assert!(graph.len() <= 6);
            assert_eq!(graph.order()[0], Position::origin());
            assert_eq!(graph.rooms_of_type(RoomType::Start), vec![Position::origin()]);
            assert!(!graph.rooms_of_type(RoomType::Boss).is_empty());
            assert!(!graph.rooms_of_type(RoomType::Treasure).is_empty());
        }
    }

    #[test]
    fn test_graph_connected_and_symmetric() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let graph = RoomGraphBuilder::new(10).build(&mut rng);

            assert_eq!(reachable(&graph).len(), graph.len());

            for &coords in graph.order() {
                let node = graph.node(coords).unwrap();
                for direction in Direction::all() {
                    let mirrored = graph
                        .node(coords.step(direction))
                        .map_or(false, |other| other.doors.is_open(direction.opposite()));
                    assert_eq!(node.doors.is_open(direction), mirrored);
                }
            }
        }
    }

    #[test]
    fn test_roles_follow_placement_index() {
        let mut rng = StdRng::seed_from_u64(11);
        let builder = RoomGraphBuilder::new(6);
        let graph = builder.build(&mut rng);
        if graph.len() == 6 {
            // Room 4 is the first with at most two rooms to go; room 3 the first past half
            assert_eq!(graph.node(graph.order()[4]).unwrap().room_type, RoomType::Boss);
            assert_eq!(graph.node(graph.order()[3]).unwrap().room_type, RoomType::Treasure);
        }
    }

    #[test]
    fn test_repair_when_growth_assigns_nothing() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut graph = RoomGraphBuilder::new(4).grow(&mut rng);
        assert_eq!(graph.len(), 4);

        // A builder with a huge target never reaches either threshold
        RoomGraphBuilder::new(100).assign_roles(&mut graph, &mut rng);
        assert_eq!(graph.rooms_of_type(RoomType::Boss).len(), 1);
        assert_eq!(graph.rooms_of_type(RoomType::Treasure).len(), 1);
        assert_eq!(graph.rooms_of_type(RoomType::Normal).len(), 1);
    }

    #[test]
    fn test_seed_reproduces_graph() {
        let a = RoomGraphBuilder::new(9).build(&mut StdRng::seed_from_u64(77));
        let b = RoomGraphBuilder::new(9).build(&mut StdRng::seed_from_u64(77));
        assert_eq!(a.order(), b.order());
        for coords in a.order() {
            assert_eq!(a.node(*coords), b.node(*coords));
        }
    }
}
