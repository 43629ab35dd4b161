//! Packed two-bit-per-cell grid codec.
//!
//! Each cell owns two bits describing its own east and south borders:
//!
//! ```text
//! 00: no opening
//! 01: opening on the east border of the cell
//! 10: opening on the south border of the cell
//! 11: openings on both east and south borders
//! ```
//!
//! A cell's north/west openings are not stored; they are the south/east bits
//! of the neighbor above/to the left. Cell (x, y) has linear index
//! `i = y*W + x` and occupies bits `2*i` and `2*i + 1` of the buffer, most
//! significant pair of each byte first.

use crate::{MazeError, Result};

/// Opening on the east border of a cell.
pub const EAST: u8 = 1 << 0;
/// Opening on the south border of a cell.
pub const SOUTH: u8 = 1 << 1;

/// A packed wall-opening buffer with its dimensions.
///
/// Bits are only ever set, never cleared, after zero-initialization; the
/// generator relies on this to OR in openings incrementally. The raw buffer
/// is exposed read-only through [`PackedGrid::as_bytes`] and is the wire
/// format consumed by renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedGrid {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl PackedGrid {
    /// Create an all-walls grid. Rejects zero dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MazeError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            bytes: vec![0; Self::byte_len(width, height)],
        })
    }

    /// Rebuild a grid from its wire bytes, checking the length.
    pub fn from_bytes(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MazeError::InvalidDimensions { width, height });
        }
        let expected = Self::byte_len(width, height);
        if bytes.len() != expected {
            return Err(MazeError::BufferLength {
                width,
                height,
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self { width, height, bytes })
    }

    /// Buffer length for the given dimensions: ceil(2 * W * H / 8).
    fn byte_len(width: u32, height: u32) -> usize {
        let cells = width as usize * height as usize;
        (2 * cells).div_ceil(8)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Linear index of a cell, `y*W + x`.
    pub fn cell_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(MazeError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Byte offset and bit shift for a linear cell index. Four cells per
    /// byte, most significant pair first.
    fn bit_position(index: usize) -> (usize, u32) {
        (index >> 2, 6 - (index % 4) as u32 * 2)
    }

    /// Read a cell's two border bits. Errors on out-of-bounds coordinates.
    pub fn cell(&self, x: u32, y: u32) -> Result<u8> {
        self.check_bounds(x, y)?;
        let (byte, shift) = Self::bit_position(self.cell_index(x, y));
        Ok((self.bytes[byte] >> shift) & 0b11)
    }

    /// OR-merge opening bits into a cell. Never clears bits already set.
    pub fn open(&mut self, x: u32, y: u32, bits: u8) -> Result<()> {
        self.check_bounds(x, y)?;
        let (byte, shift) = Self::bit_position(self.cell_index(x, y));
        self.bytes[byte] |= (bits & 0b11) << shift;
        Ok(())
    }

    /// Read-only view of the packed wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total set opening bits across the grid. A perfect maze over W×H
    /// cells has exactly W*H - 1.
    pub fn opening_count(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_round_trip_2x2() {
        let mut grid = PackedGrid::new(2, 2).unwrap();
        grid.open(0, 0, EAST).unwrap();
        assert_eq!(grid.cell(0, 0).unwrap(), EAST);
        // Never-written neighbor stays closed.
        assert_eq!(grid.cell(1, 0).unwrap(), 0);
    }

    #[test]
    fn or_merge_accumulates_bits() {
        let mut grid = PackedGrid::new(3, 3).unwrap();
        grid.open(1, 1, EAST).unwrap();
        grid.open(1, 1, SOUTH).unwrap();
        assert_eq!(grid.cell(1, 1).unwrap(), EAST | SOUTH);
    }

    #[test]
    fn addressing_crosses_byte_boundaries() {
        // 5 cells per row: cell (4, 0) is index 4, first pair of byte 1.
        let mut grid = PackedGrid::new(5, 2).unwrap();
        grid.open(4, 0, SOUTH).unwrap();
        assert_eq!(grid.as_bytes()[1], SOUTH << 6);
        assert_eq!(grid.cell(4, 0).unwrap(), SOUTH);
        // Neighbors packed in byte 0 are untouched.
        for x in 0..4 {
            assert_eq!(grid.cell(x, 0).unwrap(), 0);
        }
    }

    #[test]
    fn buffer_length_is_ceil_of_quarter_cells() {
        assert_eq!(PackedGrid::new(2, 2).unwrap().as_bytes().len(), 1);
        assert_eq!(PackedGrid::new(3, 1).unwrap().as_bytes().len(), 1);
        assert_eq!(PackedGrid::new(5, 1).unwrap().as_bytes().len(), 2);
        assert_eq!(PackedGrid::new(10, 10).unwrap().as_bytes().len(), 25);
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert_eq!(
            PackedGrid::new(0, 4),
            Err(MazeError::InvalidDimensions { width: 0, height: 4 })
        );
        assert_eq!(
            PackedGrid::new(4, 0),
            Err(MazeError::InvalidDimensions { width: 4, height: 0 })
        );
    }

    #[test]
    fn rejects_out_of_bounds_access() {
        let mut grid = PackedGrid::new(4, 3).unwrap();
        assert!(matches!(grid.cell(4, 0), Err(MazeError::OutOfBounds { .. })));
        assert!(matches!(grid.cell(0, 3), Err(MazeError::OutOfBounds { .. })));
        assert!(matches!(
            grid.open(9, 9, EAST),
            Err(MazeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn from_bytes_checks_length() {
        assert!(PackedGrid::from_bytes(4, 4, vec![0; 4]).is_ok());
        assert_eq!(
            PackedGrid::from_bytes(4, 4, vec![0; 3]),
            Err(MazeError::BufferLength {
                width: 4,
                height: 4,
                expected: 4,
                actual: 3
            })
        );
    }
}
