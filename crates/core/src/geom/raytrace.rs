//! Regular-grid ray tracing (Amanatides & Woo style DDA), used both to track
//! a growing vertex against the fuel grid and, with a cell size of a single
//! break segment, to walk a vector break's crossings.

use crate::geom::point::XyPoint;

/// One cell traversed by [`ray_trace`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellVisit {
    /// Grid cell indices, relative to `offset`.
    pub cell: (i64, i64),
    /// Distance along the path at which the ray entered this cell.
    pub entry: f64,
    /// Distance along the path at which the ray exits this cell (may exceed
    /// the path length on the final cell).
    pub exit: f64,
}

/// Walk the segment `start -> start + path` through a regular grid of the
/// given `step_size`, with the grid's own origin at `offset`.
///
/// `on_cell` is invoked once per cell entered, in travel order, and returns
/// `true` to continue the walk or `false` to stop early (used by the caller
/// to "break at a given cell boundary" once a termination condition, such as
/// a non-fuel cell with breaching disallowed, is reached).
///
/// A degenerate `path` (zero length) visits only the starting cell.
pub fn ray_trace(
    start: XyPoint,
    path: XyPoint,
    step_size: f64,
    offset: XyPoint,
    mut on_cell: impl FnMut(CellVisit) -> bool,
) {
    debug_assert!(step_size > 0.0);

    let origin = start - offset;
    let length = path.norm();
    if length < 1e-12 {
        let cell = (
            (origin.x / step_size).floor() as i64,
            (origin.y / step_size).floor() as i64,
        );
        on_cell(CellVisit {
            cell,
            entry: 0.0,
            exit: 0.0,
        });
        return;
    }

    let dir = path / length;
    let mut cell_x = (origin.x / step_size).floor() as i64;
    let mut cell_y = (origin.y / step_size).floor() as i64;

    let step_x: i64 = if dir.x > 0.0 {
        1
    } else if dir.x < 0.0 {
        -1
    } else {
        0
    };
    let step_y: i64 = if dir.y > 0.0 {
        1
    } else if dir.y < 0.0 {
        -1
    } else {
        0
    };

    let t_delta_x = if dir.x.abs() > 1e-12 {
        step_size / dir.x.abs()
    } else {
        f64::INFINITY
    };
    let t_delta_y = if dir.y.abs() > 1e-12 {
        step_size / dir.y.abs()
    } else {
        f64::INFINITY
    };

    let next_boundary = |cell: i64, step: i64, step_size: f64| -> f64 {
        if step > 0 {
            (cell + 1) as f64 * step_size
        } else {
            cell as f64 * step_size
        }
    };

    let mut t_max_x = if dir.x.abs() > 1e-12 {
        (next_boundary(cell_x, step_x, step_size) - origin.x) / dir.x
    } else {
        f64::INFINITY
    };
    let mut t_max_y = if dir.y.abs() > 1e-12 {
        (next_boundary(cell_y, step_y, step_size) - origin.y) / dir.y
    } else {
        f64::INFINITY
    };

    let mut entry = 0.0;
    loop {
        let exit = t_max_x.min(t_max_y).min(length);
        let keep_going = on_cell(CellVisit {
            cell: (cell_x, cell_y),
            entry,
            exit,
        });
        if !keep_going || exit >= length {
            break;
        }
        entry = exit;
        if t_max_x < t_max_y {
            cell_x += step_x;
            t_max_x += t_delta_x;
        } else {
            cell_y += step_y;
            t_max_y += t_delta_y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_horizontal_walk_visits_expected_cells() {
        let mut visited = Vec::new();
        ray_trace(
            XyPoint::new(0.5, 0.5),
            XyPoint::new(3.0, 0.0),
            1.0,
            XyPoint::new(0.0, 0.0),
            |visit| {
                visited.push(visit.cell);
                true
            },
        );
        assert_eq!(visited, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn early_termination_stops_the_walk() {
        let mut visited = Vec::new();
        ray_trace(
            XyPoint::new(0.5, 0.5),
            XyPoint::new(5.0, 0.0),
            1.0,
            XyPoint::new(0.0, 0.0),
            |visit| {
                visited.push(visit.cell);
                visit.cell.0 < 2
            },
        );
        assert_eq!(visited, vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn zero_length_path_visits_only_start_cell() {
        let mut visited = Vec::new();
        ray_trace(
            XyPoint::new(1.5, 1.5),
            XyPoint::new(0.0, 0.0),
            1.0,
            XyPoint::new(0.0, 0.0),
            |visit| {
                visited.push(visit.cell);
                true
            },
        );
        assert_eq!(visited, vec![(1, 1)]);
    }

    #[test]
    fn diagonal_walk_crosses_both_axes() {
        let mut visited = Vec::new();
        ray_trace(
            XyPoint::new(0.1, 0.1),
            XyPoint::new(2.0, 2.0),
            1.0,
            XyPoint::new(0.0, 0.0),
            |visit| {
                visited.push(visit.cell);
                true
            },
        );
        assert_eq!(visited.first(), Some(&(0, 0)));
        assert_eq!(visited.last(), Some(&(2, 2)));
    }
}
