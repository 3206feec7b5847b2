//! # Grid Mathematics
//!
//! Ring iteration and straight-line helpers over tile coordinates.

use crate::game::Position;

/// Cells on the boundary of the Chebyshev ring of `radius` around `center`.
///
/// Cells come out in row-major order (top row first, left to right), which is
/// the order every ring search in the crate relies on for determinism. A
/// radius of zero yields only the centre.
///
/// # Examples
///
/// ```
/// use warren::{chebyshev_ring, Position};
///
/// let ring: Vec<Position> = chebyshev_ring(Position::new(5, 5), 1).collect();
/// assert_eq!(ring.len(), 8);
/// assert_eq!(ring[0], Position::new(4, 4));
/// assert!(!ring.contains(&Position::new(5, 5)));
/// ```
pub fn chebyshev_ring(center: Position, radius: i32) -> impl Iterator<Item = Position> {
    let radius = radius.max(0);
    (-radius..=radius).flat_map(move |dy| {
        (-radius..=radius).filter_map(move |dx| {
            if dx.abs() == radius || dy.abs() == radius {
                Some(Position::new(center.x + dx, center.y + dy))
            } else {
                None
            }
        })
    })
}

/// Angle of `pos` around `center` in radians, as returned by `atan2`.
pub fn angle_around(center: Position, pos: Position) -> f64 {
    ((pos.y - center.y) as f64).atan2((pos.x - center.x) as f64)
}

/// Tiles of an L-shaped path from `from` to `to`, both ends included.
///
/// With `horizontal_first` the path runs along `from.y` and then down column
/// `to.x`; otherwise it runs along `from.x` and then across row `to.y`.
pub fn l_path(from: Position, to: Position, horizontal_first: bool) -> Vec<Position> {
    let (min_x, max_x) = (from.x.min(to.x), from.x.max(to.x));
    let (min_y, max_y) = (from.y.min(to.y), from.y.max(to.y));
    let mut path = Vec::new();

    if horizontal_first {
        path.extend((min_x..=max_x).map(|x| Position::new(x, from.y)));
        path.extend((min_y..=max_y).map(|y| Position::new(to.x, y)));
    } else {
        path.extend((min_y..=max_y).map(|y| Position::new(from.x, y)));
        path.extend((min_x..=max_x).map(|x| Position::new(x, to.y)));
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_sizes() {
        let center = Position::new(10, 10);
        assert_eq!(chebyshev_ring(center, 0).collect::<Vec<_>>(), vec![center]);
        for radius in 1..6 {
            let ring: Vec<_> = chebyshev_ring(center, radius).collect();
            assert_eq!(ring.len(), (8 * radius) as usize);
            assert!(ring
                .iter()
                .all(|pos| pos.chebyshev_distance(center) == radius as u32));
        }
    }

    #[test]
    fn test_ring_is_row_major() {
        let ring: Vec<_> = chebyshev_ring(Position::new(0, 0), 2).collect();
        let mut sorted = ring.clone();
        sorted.sort_by_key(|pos| (pos.y, pos.x));
        assert_eq!(ring, sorted);
    }

    #[test]
    fn test_angle_around() {
        let center = Position::new(0, 0);
        assert_eq!(angle_around(center, Position::new(1, 0)), 0.0);
        assert!(angle_around(center, Position::new(0, 1)) > 0.0);
        assert!(angle_around(center, Position::new(0, -1)) < 0.0);
    }

    #[test]
    fn test_l_path_endpoints() {
        let from = Position::new(2, 3);
        let to = Position::new(6, 8);

        let horizontal = l_path(from, to, true);
        assert!(horizontal.contains(&from));
        assert!(horizontal.contains(&to));
        assert!(horizontal.contains(&Position::new(6, 3)));

        let vertical = l_path(from, to, false);
        assert!(vertical.contains(&from));
        assert!(vertical.contains(&to));
        assert!(vertical.contains(&Position::new(2, 8)));
    }
}
