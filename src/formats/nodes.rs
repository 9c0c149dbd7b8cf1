///! nodes.bin view - node positions and outgoing edge ranges

use super::read_u32;
use crate::core::{bits, q28_4};
use crate::projection::PointCh;

pub const NODE_RECORD_SIZE: usize = 12;

const OFFSET_E: usize = 0;
const OFFSET_N: usize = 4;
const OFFSET_OUT_EDGES: usize = 8;

/// Bit position of the out-degree inside the packed out-edges word.
pub const DEGREE_SHIFT: u32 = 28;
pub const MAX_OUT_DEGREE: u32 = (1 << (32 - DEGREE_SHIFT)) - 1;
pub const MAX_EDGE_INDEX: u32 = (1 << DEGREE_SHIFT) - 1;

/// Borrowed view over the node table.
#[derive(Clone, Copy)]
pub struct GraphNodes<'a> {
    buffer: &'a [u8],
}

impl<'a> GraphNodes<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer }
    }

    /// Number of nodes in the table.
    pub fn count(&self) -> usize {
        self.buffer.len() / NODE_RECORD_SIZE
    }

    #[inline]
    fn word(&self, node_id: u32, offset: usize) -> u32 {
        debug_assert!((node_id as usize) < self.count(), "node {node_id} out of range");
        read_u32(self.buffer, node_id as usize * NODE_RECORD_SIZE + offset)
    }

    pub fn node_e(&self, node_id: u32) -> f64 {
        q28_4::as_f64(self.word(node_id, OFFSET_E) as i32)
    }

    pub fn node_n(&self, node_id: u32) -> f64 {
        q28_4::as_f64(self.word(node_id, OFFSET_N) as i32)
    }

    pub fn position(&self, node_id: u32) -> PointCh {
        PointCh::new(self.node_e(node_id), self.node_n(node_id))
    }

    pub fn out_degree(&self, node_id: u32) -> u32 {
        bits::extract_unsigned(
            self.word(node_id, OFFSET_OUT_EDGES),
            DEGREE_SHIFT,
            32 - DEGREE_SHIFT,
        )
    }

    /// Identity of the first outgoing edge; meaningful only if the degree is non-zero.
    pub fn first_edge_id(&self, node_id: u32) -> u32 {
        bits::extract_unsigned(self.word(node_id, OFFSET_OUT_EDGES), 0, DEGREE_SHIFT)
    }

    /// Identity of the `k`-th outgoing edge of `node_id`.
    pub fn edge_id(&self, node_id: u32, k: u32) -> u32 {
        debug_assert!(k < self.out_degree(node_id), "edge {k} of node {node_id}");
        self.first_edge_id(node_id) + k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(words: &[u32]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    #[test]
    fn test_single_node() {
        let bytes = encode(&[2_600_000 << 4, 1_200_000 << 4, 0x2_000_1234]);
        let nodes = GraphNodes::new(&bytes);

        assert_eq!(nodes.count(), 1);
        assert_eq!(nodes.node_e(0), 2_600_000.0);
        assert_eq!(nodes.node_n(0), 1_200_000.0);
        assert_eq!(nodes.out_degree(0), 2);
        assert_eq!(nodes.edge_id(0, 0), 0x1234);
        assert_eq!(nodes.edge_id(0, 1), 0x1235);
    }

    #[test]
    fn test_fractional_positions_and_full_degree() {
        let bytes = encode(&[
            2_600_000 << 4,
            1_200_000 << 4,
            0x0000_0000,
            (2_601_000 << 4) | 0b1000,
            (1_201_000 << 4) | 0b0001,
            0xF_FFF_FFF0,
        ]);
        let nodes = GraphNodes::new(&bytes);

        assert_eq!(nodes.count(), 2);
        assert_eq!(nodes.out_degree(0), 0);
        assert_eq!(nodes.position(1), PointCh::new(2_601_000.5, 1_201_000.0625));
        assert_eq!(nodes.out_degree(1), 15);
        assert_eq!(nodes.edge_id(1, 14), 0x0FFF_FFF0 + 14);
    }

    #[test]
    fn test_partial_trailing_record_is_ignored() {
        let mut bytes = encode(&[1 << 4, 2 << 4, 0]);
        bytes.extend_from_slice(&[0, 0, 0]);
        assert_eq!(GraphNodes::new(&bytes).count(), 1);
    }
}
