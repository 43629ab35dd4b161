//! Perfect-maze generation with Eller's algorithm.
//!
//! The maze is built one row at a time. Each column carries an ephemeral set
//! label; two cells are connected in the maze so far iff they share a label.
//! Merging only ever joins *different* labels, which is what makes cycles
//! impossible by construction. After the forced merges of the last row the
//! whole grid is one spanning tree: exactly W*H - 1 openings.

use std::collections::HashSet;

use crate::grid::{PackedGrid, EAST, SOUTH};
use crate::rng::RandomSource;
use crate::Result;

/// Unassigned-label sentinel; real labels start at 1.
const UNASSIGNED: u32 = 0;

/// Generate a perfect maze over a `width` × `height` grid.
///
/// Rejects zero dimensions before touching the buffer. The caller injects
/// the randomness source, so one seed reproduces one maze.
pub fn generate(width: u32, height: u32, rng: &mut impl RandomSource) -> Result<PackedGrid> {
    let mut grid = PackedGrid::new(width, height)?;
    let w = width as usize;

    let mut next_label: u32 = 1;
    let mut labels: Vec<u32> = vec![UNASSIGNED; w];

    for y in 0..height {
        let last_row = y == height - 1;

        for x in 0..w {
            // Fresh labels are never reused across the whole generation.
            if labels[x] == UNASSIGNED {
                labels[x] = next_label;
                next_label += 1;
            }

            // Merge with the left neighbor: fair coin normally, forced on
            // the last row so no component is left stranded.
            if x > 0 {
                let current = labels[x];
                let previous = labels[x - 1];
                if current != previous && (last_row || rng.coin_flip()) {
                    // Relabel across the entire row, not just up to x.
                    for label in labels.iter_mut() {
                        if *label == current {
                            *label = previous;
                        }
                    }
                    grid.open(x as u32 - 1, y, EAST)?;
                }
            }
        }

        // Vertical pass, skipped on the last row. Every label must carry at
        // least one connection into the next row.
        if !last_row {
            let mut next_labels = vec![UNASSIGNED; w];
            let mut connected: HashSet<u32> = HashSet::new();

            for x in 0..w {
                if rng.coin_flip() {
                    next_labels[x] = labels[x];
                    grid.open(x as u32, y, SOUTH)?;
                    connected.insert(labels[x]);
                }
            }

            // Force a connection for any label the coin skipped entirely;
            // the first column carrying that label wins.
            for x in 0..w {
                if !connected.contains(&labels[x]) {
                    next_labels[x] = labels[x];
                    grid.open(x as u32, y, SOUTH)?;
                    connected.insert(labels[x]);
                }
            }

            labels = next_labels;
        }
    }

    Ok(grid)
}
