//! # Flood Fill
//!
//! 4-way reachability over a tile grid, built on the `pathfinding` crate's
//! breadth-first reach.

use crate::game::Position;
use ::pathfinding::prelude::bfs_reach;
use std::collections::HashSet;

/// Every cell reachable from `start` through 4-way steps onto passable cells.
///
/// The start cell is included even if it is not itself passable.
pub fn reachable_from<F>(start: Position, passable: F) -> HashSet<Position>
where
    F: Fn(Position) -> bool,
{
    bfs_reach(start, |pos: &Position| {
        pos.cardinal_adjacent_positions()
            .into_iter()
            .filter(|next| passable(*next))
            .collect::<Vec<_>>()
    })
    .collect()
}

/// Groups `cells` into 4-connected regions of passable cells.
///
/// Regions are returned in the order their first cell appears in `cells`.
pub fn connected_regions<F>(cells: &[Position], passable: F) -> Vec<Vec<Position>>
where
    F: Fn(Position) -> bool,
{
    let mut seen = HashSet::new();
    let mut regions = Vec::new();

    for &cell in cells {
        if seen.contains(&cell) {
            continue;
        }
        let region: Vec<Position> = bfs_reach(cell, |pos: &Position| {
            pos.cardinal_adjacent_positions()
                .into_iter()
                .filter(|next| passable(*next))
                .collect::<Vec<_>>()
        })
        .collect();
        seen.extend(region.iter().copied());
        regions.push(region);
    }

    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid<'a>(rows: &'a [&'a str]) -> impl Fn(Position) -> bool + 'a {
        move |pos: Position| {
            pos.y >= 0
                && pos.x >= 0
                && rows
                    .get(pos.y as usize)
                    .and_then(|row| row.as_bytes().get(pos.x as usize))
                    == Some(&b'.')
        }
    }

    #[test]
    fn test_reachable_from_respects_walls() {
        let rows = ["#####", "#..##", "##.##", "###.#", "#####"];
        let reach = reachable_from(Position::new(1, 1), grid(&rows));
        assert!(reach.contains(&Position::new(2, 2)));
        // Diagonal neighbours are not connected
        assert!(!reach.contains(&Position::new(3, 3)));
        assert_eq!(reach.len(), 3);
    }

    #[test]
    fn test_connected_regions() {
        let rows = ["#######", "#..#..#", "#######", "#.....#", "#######"];
        let passable = grid(&rows);
        let cells: Vec<Position> = (0..5)
            .flat_map(|y| (0..7).map(move |x| Position::new(x, y)))
            .filter(|pos| passable(*pos))
            .collect();

        let regions = connected_regions(&cells, &passable);
        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0].len(), 2);
        assert_eq!(regions[2].len(), 5);
        assert_eq!(regions.iter().map(Vec::len).sum::<usize>(), cells.len());
    }
}
