//! Path tree construction and route reconstruction.
//!
//! One exhaustive traversal from a source cell records, for every cell, the
//! linear index of the cell it was first discovered through. Because a
//! perfect maze is a tree there is exactly one simple path to every cell, so
//! traversal order does not matter and a route query is just a walk up the
//! parent references, O(path length).
//!
//! Parents live in a flat array indexed by linear cell index; the source
//! holds `None`. Index arithmetic only, no pointer graph.

use crate::grid::{PackedGrid, EAST, SOUTH};
use crate::{MazeError, Result};

/// Side of a cell on which its discovery parent lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    North,
    East,
    South,
    West,
}

/// Parent-reference table for one maze and one source cell.
///
/// Must be rebuilt from scratch whenever the source changes; there is no
/// incremental update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTree {
    width: u32,
    height: u32,
    source: (u32, u32),
    parents: Vec<Option<u32>>,
}

impl PathTree {
    /// Build the parent table by depth-first traversal from `source`.
    ///
    /// EAST/SOUTH openings are read from the current cell; NORTH/WEST
    /// openings are the SOUTH/EAST bits of the neighbor above/to the left;
    /// there are no stored north/west bits to read. Errors if the source is
    /// out of bounds. O(W*H).
    pub fn build(grid: &PackedGrid, source: (u32, u32)) -> Result<Self> {
        let (sx, sy) = source;
        // Bounds check doubles as the source-cell read.
        grid.cell(sx, sy)?;

        let (width, height) = (grid.width(), grid.height());
        let cells = width as usize * height as usize;
        let mut parents: Vec<Option<u32>> = vec![None; cells];
        let mut visited = vec![false; cells];

        let source_index = grid.cell_index(sx, sy);
        visited[source_index] = true;

        // Worklist entries carry the side their parent is on, so the
        // traversal never walks straight back through the opening it came
        // from. The visited guard keeps this terminating even on a
        // hand-built buffer with a cycle.
        let mut stack: Vec<(u32, u32, Option<Side>)> = vec![(sx, sy, None)];

        while let Some((x, y, parent_side)) = stack.pop() {
            let index = grid.cell_index(x, y) as u32;
            let state = grid.cell(x, y)?;

            if y > 0
                && parent_side != Some(Side::North)
                && grid.cell(x, y - 1)? & SOUTH != 0
            {
                Self::discover(grid, &mut parents, &mut visited, &mut stack, index, x, y - 1, Side::South);
            }
            // A generated maze never opens the last column or row outward,
            // but a wire buffer from `from_bytes` can; such openings lead
            // off-grid and are ignored.
            if x + 1 < width && state & EAST != 0 && parent_side != Some(Side::East) {
                Self::discover(grid, &mut parents, &mut visited, &mut stack, index, x + 1, y, Side::West);
            }
            if y + 1 < height && state & SOUTH != 0 && parent_side != Some(Side::South) {
                Self::discover(grid, &mut parents, &mut visited, &mut stack, index, x, y + 1, Side::North);
            }
            if x > 0
                && parent_side != Some(Side::West)
                && grid.cell(x - 1, y)? & EAST != 0
            {
                Self::discover(grid, &mut parents, &mut visited, &mut stack, index, x - 1, y, Side::East);
            }
        }

        Ok(Self {
            width,
            height,
            source,
            parents,
        })
    }

    /// Record a newly reached neighbor and queue it for expansion. The
    /// source is pre-visited, so its `None` entry is never overwritten.
    #[allow(clippy::too_many_arguments)]
    fn discover(
        grid: &PackedGrid,
        parents: &mut [Option<u32>],
        visited: &mut [bool],
        stack: &mut Vec<(u32, u32, Option<Side>)>,
        parent_index: u32,
        x: u32,
        y: u32,
        parent_side: Side,
    ) {
        let index = grid.cell_index(x, y);
        if visited[index] {
            return;
        }
        visited[index] = true;
        parents[index] = Some(parent_index);
        stack.push((x, y, Some(parent_side)));
    }

    pub fn source(&self) -> (u32, u32) {
        self.source
    }

    /// Reconstruct the route from the source to `target`, both inclusive.
    ///
    /// Walks the parent chain from the target and reverses it. If the
    /// target *is* the source the result is the single-element sequence.
    /// Errors if the target is out of bounds.
    pub fn trace(&self, target: (u32, u32)) -> Result<Vec<(u32, u32)>> {
        let (tx, ty) = target;
        if tx >= self.width || ty >= self.height {
            return Err(MazeError::OutOfBounds {
                x: tx,
                y: ty,
                width: self.width,
                height: self.height,
            });
        }

        let mut route = vec![(tx, ty)];
        let mut index = ty as usize * self.width as usize + tx as usize;
        while let Some(parent) = self.parents[index] {
            index = parent as usize;
            let x = (index % self.width as usize) as u32;
            let y = (index / self.width as usize) as u32;
            route.push((x, y));
        }
        route.reverse();
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eller::generate;
    use crate::rng::MinstdRng;

    fn maze(w: u32, h: u32, seed: u32) -> PackedGrid {
        generate(w, h, &mut MinstdRng::new(seed)).unwrap()
    }

    #[test]
    fn trace_to_source_is_single_element() {
        let grid = maze(4, 4, 10);
        let tree = PathTree::build(&grid, (2, 3)).unwrap();
        assert_eq!(tree.trace((2, 3)).unwrap(), vec![(2, 3)]);
    }

    #[test]
    fn three_by_one_corridor_chain() {
        // A 3x1 maze is forced into a single corridor, so the route from
        // (0,0) to (2,0) is the full index chain 0 -> 1 -> 2.
        let grid = maze(3, 1, 5);
        let tree = PathTree::build(&grid, (0, 0)).unwrap();
        assert_eq!(
            tree.trace((2, 0)).unwrap(),
            vec![(0, 0), (1, 0), (2, 0)]
        );
    }

    #[test]
    fn exactly_one_source_sentinel() {
        let grid = maze(9, 7, 21);
        let tree = PathTree::build(&grid, (4, 4)).unwrap();
        let sentinels = tree.parents.iter().filter(|p| p.is_none()).count();
        assert_eq!(sentinels, 1);
        assert!(tree.parents[grid.cell_index(4, 4)].is_none());
    }

    #[test]
    fn routes_follow_openings() {
        // Every step of every route must cross an actual opening.
        let grid = maze(8, 6, 33);
        let tree = PathTree::build(&grid, (0, 0)).unwrap();
        for y in 0..6 {
            for x in 0..8 {
                let route = tree.trace((x, y)).unwrap();
                assert_eq!(route.first(), Some(&(0, 0)));
                assert_eq!(route.last(), Some(&(x, y)));
                for pair in route.windows(2) {
                    let ((ax, ay), (bx, by)) = (pair[0], pair[1]);
                    let open = if bx == ax + 1 && by == ay {
                        grid.cell(ax, ay).unwrap() & EAST != 0
                    } else if ax == bx + 1 && ay == by {
                        grid.cell(bx, by).unwrap() & EAST != 0
                    } else if by == ay + 1 && bx == ax {
                        grid.cell(ax, ay).unwrap() & SOUTH != 0
                    } else if ay == by + 1 && ax == bx {
                        grid.cell(bx, by).unwrap() & SOUTH != 0
                    } else {
                        false
                    };
                    assert!(open, "no opening between {pair:?}");
                }
            }
        }
    }

    #[test]
    fn route_length_matches_parent_chain() {
        let grid = maze(10, 10, 77);
        let tree = PathTree::build(&grid, (5, 5)).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                // Walk the chain by hand to get its length k.
                let mut k = 0;
                let mut index = grid.cell_index(x, y);
                while let Some(parent) = tree.parents[index] {
                    index = parent as usize;
                    k += 1;
                }
                let route = tree.trace((x, y)).unwrap();
                assert_eq!(route.len(), k + 1);
            }
        }
    }

    #[test]
    fn rebuild_is_idempotent() {
        let grid = maze(12, 9, 101);
        let a = PathTree::build(&grid, (3, 2)).unwrap();
        let b = PathTree::build(&grid, (3, 2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn wire_buffer_openings_off_the_grid_edge_are_ignored() {
        // A hand-built wire buffer can set EAST on the last column or SOUTH
        // on the last row; those openings lead nowhere and must not derail
        // the build. 2x2 grid, one byte: lowest pair is cell (1,1).
        let east_off_edge = PackedGrid::from_bytes(2, 2, vec![EAST]).unwrap();
        let tree = PathTree::build(&east_off_edge, (1, 1)).unwrap();
        assert_eq!(tree.trace((1, 1)).unwrap(), vec![(1, 1)]);

        let south_off_edge = PackedGrid::from_bytes(2, 2, vec![SOUTH]).unwrap();
        let tree = PathTree::build(&south_off_edge, (1, 1)).unwrap();
        assert_eq!(tree.trace((1, 1)).unwrap(), vec![(1, 1)]);
    }

    #[test]
    fn rejects_out_of_bounds_source_and_target() {
        let grid = maze(4, 4, 1);
        assert!(matches!(
            PathTree::build(&grid, (4, 0)),
            Err(MazeError::OutOfBounds { .. })
        ));
        let tree = PathTree::build(&grid, (0, 0)).unwrap();
        assert!(matches!(
            tree.trace((0, 4)),
            Err(MazeError::OutOfBounds { .. })
        ));
    }
}
