///! sectors.bin view - spatial index over the node table

use super::{read_i32, read_u16};
use crate::projection::{PointCh, SwissBounds};

pub const SECTOR_RECORD_SIZE: usize = 6;
pub const SECTORS_PER_SIDE: usize = 128;
pub const SECTOR_COUNT: usize = SECTORS_PER_SIDE * SECTORS_PER_SIDE;

const OFFSET_START: usize = 0;
const OFFSET_COUNT: usize = 4;

const SECTOR_WIDTH: f64 = SwissBounds::WIDTH / SECTORS_PER_SIDE as f64;
const SECTOR_HEIGHT: f64 = SwissBounds::HEIGHT / SECTORS_PER_SIDE as f64;

/// Contiguous range of node identities `[start_node_id, end_node_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sector {
    pub start_node_id: u32,
    pub end_node_id: u32,
}

impl Sector {
    pub fn node_ids(&self) -> std::ops::Range<u32> {
        self.start_node_id..self.end_node_id
    }

    pub fn is_empty(&self) -> bool {
        self.start_node_id >= self.end_node_id
    }
}

/// Grid column of coordinate `e`, clamped to the grid.
#[inline]
pub fn column_of(e: f64) -> usize {
    cell_index((e - SwissBounds::MIN_E) / SECTOR_WIDTH)
}

/// Grid row of coordinate `n`, clamped to the grid.
#[inline]
pub fn row_of(n: f64) -> usize {
    cell_index((n - SwissBounds::MIN_N) / SECTOR_HEIGHT)
}

/// Record index of the sector containing `point`; row-major, `x + 128 * y`.
pub fn sector_index_of(point: &PointCh) -> usize {
    column_of(point.e) + SECTORS_PER_SIDE * row_of(point.n)
}

#[inline]
fn cell_index(scaled: f64) -> usize {
    scaled.floor().clamp(0.0, (SECTORS_PER_SIDE - 1) as f64) as usize
}

/// Borrowed view over the sector table.
#[derive(Clone, Copy)]
pub struct GraphSectors<'a> {
    buffer: &'a [u8],
}

impl<'a> GraphSectors<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer }
    }

    /// Raw first node identity of sector `index`, before validation.
    pub(crate) fn raw_start(&self, index: usize) -> i32 {
        read_i32(self.buffer, index * SECTOR_RECORD_SIZE + OFFSET_START)
    }

    pub(crate) fn raw_count(&self, index: usize) -> u16 {
        read_u16(self.buffer, index * SECTOR_RECORD_SIZE + OFFSET_COUNT)
    }

    pub fn sector(&self, index: usize) -> Sector {
        let start = self.raw_start(index) as u32;
        Sector {
            start_node_id: start,
            end_node_id: start + u32::from(self.raw_count(index)),
        }
    }

    /// Every sector overlapping the square of half-side `distance` centred on
    /// `center`, rows bottom to top and columns left to right.
    ///
    /// Since nodes are stored in sector order the returned node ranges are
    /// ascending. A negative or NaN `distance` covers no sector.
    pub fn sectors_in_area(&self, center: &PointCh, distance: f64) -> Vec<Sector> {
        if !(distance >= 0.0) {
            return Vec::new();
        }
        let x_min = column_of(center.e - distance);
        let x_max = column_of(center.e + distance);
        let y_min = row_of(center.n - distance);
        let y_max = row_of(center.n + distance);

        let mut sectors = Vec::with_capacity((x_max - x_min + 1) * (y_max - y_min + 1));
        for y in y_min..=y_max {
            for x in x_min..=x_max {
                sectors.push(self.sector(x + SECTORS_PER_SIDE * y));
            }
        }
        sectors
    }
}
