///! edges.bin / profile_ids.bin / elevations.bin view - edge records and profiles

use super::{read_i32, read_u16, read_u32};
use crate::core::{bits, math, q28_4};

pub const EDGE_RECORD_SIZE: usize = 10;
pub const PROFILE_ID_SIZE: usize = 4;
pub const ELEVATION_SLOT_SIZE: usize = 2;

const OFFSET_TARGET: usize = 0;
const OFFSET_LENGTH: usize = 4;
const OFFSET_ELEVATION_GAIN: usize = 6;
const OFFSET_ATTRIBUTES: usize = 8;

const PROFILE_KIND_SHIFT: u32 = 30;
pub const MAX_FIRST_SAMPLE: u32 = (1 << PROFILE_KIND_SHIFT) - 1;

/// Spacing of profile samples along an edge, in metres.
pub const SAMPLE_SPACING: f64 = 2.0;
/// [`SAMPLE_SPACING`] in Q28.4 units.
const SAMPLE_SPACING_Q: i32 = 2 << q28_4::FRACTION_BITS;

/// Encoding of an edge's elevation samples, from the top two bits of its profile id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// No profile; elevation is unknown everywhere on the edge.
    None,
    /// One unsigned Q12.4 sample per slot.
    Raw,
    /// Unsigned Q12.4 first sample, then signed Q4.4 deltas, two per slot.
    Delta8,
    /// Unsigned Q12.4 first sample, then signed Q0.4 deltas, four per slot.
    Delta4,
}

impl ProfileKind {
    pub fn from_tag(tag: u32) -> Self {
        match tag & 0b11 {
            0 => ProfileKind::None,
            1 => ProfileKind::Raw,
            2 => ProfileKind::Delta8,
            _ => ProfileKind::Delta4,
        }
    }

    pub fn tag(self) -> u32 {
        match self {
            ProfileKind::None => 0,
            ProfileKind::Raw => 1,
            ProfileKind::Delta8 => 2,
            ProfileKind::Delta4 => 3,
        }
    }

    /// Samples packed into one 16-bit slot after the first.
    pub fn samples_per_slot(self) -> usize {
        match self {
            ProfileKind::None | ProfileKind::Raw => 1,
            ProfileKind::Delta8 => 2,
            ProfileKind::Delta4 => 4,
        }
    }

    /// Slots needed to store `sample_count` samples.
    pub fn slot_count(self, sample_count: usize) -> usize {
        match self {
            ProfileKind::None => 0,
            ProfileKind::Raw => sample_count,
            _ => 1 + (sample_count.saturating_sub(1)).div_ceil(self.samples_per_slot()),
        }
    }
}

/// Number of profile samples stored for an edge of `length_q` (Q28.4 metres):
/// one every two metres, both ends included.
pub fn sample_count_for(length_q: u16) -> usize {
    1 + math::ceil_div(i32::from(length_q), SAMPLE_SPACING_Q) as usize
}

/// Borrowed view over the edge, profile id and elevation tables.
#[derive(Clone, Copy)]
pub struct GraphEdges<'a> {
    edges: &'a [u8],
    profile_ids: &'a [u8],
    elevations: &'a [u8],
}

impl<'a> GraphEdges<'a> {
    pub fn new(edges: &'a [u8], profile_ids: &'a [u8], elevations: &'a [u8]) -> Self {
        Self {
            edges,
            profile_ids,
            elevations,
        }
    }

    pub fn count(&self) -> usize {
        self.edges.len() / EDGE_RECORD_SIZE
    }

    /// Number of 16-bit slots in the elevation table.
    pub fn elevation_slot_count(&self) -> usize {
        self.elevations.len() / ELEVATION_SLOT_SIZE
    }

    #[inline]
    fn offset(edge_id: u32) -> usize {
        edge_id as usize * EDGE_RECORD_SIZE
    }

    #[inline]
    fn raw_target(&self, edge_id: u32) -> i32 {
        read_i32(self.edges, Self::offset(edge_id) + OFFSET_TARGET)
    }

    /// Whether the edge runs against the direction of the way it comes from.
    pub fn is_inverted(&self, edge_id: u32) -> bool {
        self.raw_target(edge_id) < 0
    }

    pub fn target_node_id(&self, edge_id: u32) -> u32 {
        let raw = self.raw_target(edge_id);
        if raw < 0 {
            !raw as u32
        } else {
            raw as u32
        }
    }

    /// Length in Q12.4 metres, as stored.
    pub fn length_q(&self, edge_id: u32) -> u16 {
        read_u16(self.edges, Self::offset(edge_id) + OFFSET_LENGTH)
    }

    /// Length in metres.
    pub fn length(&self, edge_id: u32) -> f64 {
        q28_4::as_f64(i32::from(self.length_q(edge_id)))
    }

    /// Positive elevation gain in metres.
    pub fn elevation_gain(&self, edge_id: u32) -> f64 {
        q28_4::as_f64(i32::from(read_u16(
            self.edges,
            Self::offset(edge_id) + OFFSET_ELEVATION_GAIN,
        )))
    }

    pub fn attributes_index(&self, edge_id: u32) -> usize {
        usize::from(read_u16(self.edges, Self::offset(edge_id) + OFFSET_ATTRIBUTES))
    }

    #[inline]
    fn profile_id(&self, edge_id: u32) -> u32 {
        read_u32(self.profile_ids, edge_id as usize * PROFILE_ID_SIZE)
    }

    pub fn profile_kind(&self, edge_id: u32) -> ProfileKind {
        ProfileKind::from_tag(bits::extract_unsigned(
            self.profile_id(edge_id),
            PROFILE_KIND_SHIFT,
            32 - PROFILE_KIND_SHIFT,
        ))
    }

    pub fn has_profile(&self, edge_id: u32) -> bool {
        self.profile_kind(edge_id) != ProfileKind::None
    }

    /// Index of the edge's first elevation slot.
    pub fn first_sample_index(&self, edge_id: u32) -> usize {
        bits::extract_unsigned(self.profile_id(edge_id), 0, PROFILE_KIND_SHIFT) as usize
    }

    pub fn sample_count(&self, edge_id: u32) -> usize {
        sample_count_for(self.length_q(edge_id))
    }

    /// Elevation samples in the edge's direction of travel, two metres apart.
    ///
    /// Empty when the edge has no profile.
    pub fn profile_samples(&self, edge_id: u32) -> Vec<f32> {
        let kind = self.profile_kind(edge_id);
        if kind == ProfileKind::None {
            return Vec::new();
        }

        let count = self.sample_count(edge_id);
        let first = self.first_sample_index(edge_id);
        debug_assert!(first + kind.slot_count(count) <= self.elevation_slot_count());

        let slot = |i: usize| read_u16(self.elevations, (first + i) * ELEVATION_SLOT_SIZE);
        let mut samples = Vec::with_capacity(count);
        match kind {
            ProfileKind::Raw => {
                samples.extend((0..count).map(|i| q28_4::as_f32(i32::from(slot(i)))));
            }
            _ => {
                let per_slot = kind.samples_per_slot();
                let width = (16 / per_slot) as u32;
                let mut elevation = i32::from(slot(0));
                samples.push(q28_4::as_f32(elevation));
                for i in 1..count {
                    let k = i - 1;
                    let packed = u32::from(slot(1 + k / per_slot));
                    let start = 16 - width * (k % per_slot + 1) as u32;
                    elevation += bits::extract_signed(packed, start, width);
                    samples.push(q28_4::as_f32(elevation));
                }
            }
        }

        if self.is_inverted(edge_id) {
            samples.reverse();
        }
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_record(target: i32, length: u16, gain: u16, attributes: u16) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(EDGE_RECORD_SIZE);
        bytes.extend_from_slice(&target.to_be_bytes());
        bytes.extend_from_slice(&length.to_be_bytes());
        bytes.extend_from_slice(&gain.to_be_bytes());
        bytes.extend_from_slice(&attributes.to_be_bytes());
        bytes
    }

    fn slots(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    const DELTA4_ELEVATIONS: [u16; 5] = [0, 0x180C, 0xFEFF, 0xFFFE, 0xF000];
    const DELTA4_EXPECTED: [f32; 10] = [
        384.75, 384.6875, 384.5625, 384.5, 384.4375, 384.375, 384.3125, 384.25, 384.125,
        384.0625,
    ];

    #[test]
    fn test_record_fields() {
        let edges = edge_record(!12, 0x10b, 0x10, 2022);
        let ids = ((3u32 << 30) | 1).to_be_bytes();
        let view = GraphEdges::new(&edges, &ids, &[]);

        assert_eq!(view.count(), 1);
        assert!(view.is_inverted(0));
        assert_eq!(view.target_node_id(0), 12);
        assert_eq!(view.length(0), 16.6875);
        assert_eq!(view.elevation_gain(0), 1.0);
        assert_eq!(view.attributes_index(0), 2022);
        assert_eq!(view.profile_kind(0), ProfileKind::Delta4);
        assert_eq!(view.first_sample_index(0), 1);
        assert_eq!(view.sample_count(0), 10);
    }

    #[test]
    fn test_forward_edge_target() {
        let edges = edge_record(12, 0x20, 0, 0);
        let ids = 0u32.to_be_bytes();
        let view = GraphEdges::new(&edges, &ids, &[]);

        assert!(!view.is_inverted(0));
        assert_eq!(view.target_node_id(0), 12);
        assert!(!view.has_profile(0));
        assert!(view.profile_samples(0).is_empty());
    }

    #[test]
    fn test_delta4_profile_decodes_forward() {
        let edges = edge_record(12, 0x10b, 0, 0);
        let ids = ((3u32 << 30) | 1).to_be_bytes();
        let elevations = slots(&DELTA4_ELEVATIONS);
        let view = GraphEdges::new(&edges, &ids, &elevations);

        assert_eq!(view.profile_samples(0), DELTA4_EXPECTED.to_vec());
    }

    #[test]
    fn test_inverted_profile_is_reversed() {
        let edges = edge_record(!12, 0x10b, 0, 0);
        let ids = ((3u32 << 30) | 1).to_be_bytes();
        let elevations = slots(&DELTA4_ELEVATIONS);
        let view = GraphEdges::new(&edges, &ids, &elevations);

        let mut expected = DELTA4_EXPECTED.to_vec();
        expected.reverse();
        assert_eq!(view.profile_samples(0), expected);
    }

    #[test]
    fn test_raw_profile() {
        // 4 m long: samples at 0, 2 and 4 m
        let edges = edge_record(1, 4 << 4, 0, 0);
        let ids = (1u32 << 30).to_be_bytes();
        let elevations = slots(&[500 << 4, (501 << 4) | 8, 499 << 4]);
        let view = GraphEdges::new(&edges, &ids, &elevations);

        assert_eq!(view.profile_samples(0), vec![500.0, 501.5, 499.0]);
    }

    #[test]
    fn test_delta8_profile() {
        // 5 m long: samples at 0, 2, 4 and 5 m; deltas +1.0, -0.5, +7.9375
        let edges = edge_record(1, 5 << 4, 0, 0);
        let ids = ((2u32 << 30) | 2).to_be_bytes();
        let elevations = slots(&[0xAAAA, 0xBBBB, 1000 << 4, 0x10F8, 0x7F00]);
        let view = GraphEdges::new(&edges, &ids, &elevations);

        assert_eq!(view.sample_count(0), 4);
        assert_eq!(view.profile_samples(0), vec![1000.0, 1001.0, 1000.5, 1008.4375]);
    }

    #[test]
    fn test_sample_count_and_slots() {
        assert_eq!(sample_count_for(0), 1);
        assert_eq!(sample_count_for(1), 2);
        assert_eq!(sample_count_for(32), 2);
        assert_eq!(sample_count_for(33), 3);
        assert_eq!(sample_count_for(0x10b), 10);

        assert_eq!(ProfileKind::None.slot_count(10), 0);
        assert_eq!(ProfileKind::Raw.slot_count(10), 10);
        assert_eq!(ProfileKind::Delta8.slot_count(10), 6);
        assert_eq!(ProfileKind::Delta4.slot_count(10), 4);
        assert_eq!(ProfileKind::Delta4.slot_count(1), 1);
    }

    #[test]
    fn test_kind_tags() {
        for kind in [
            ProfileKind::None,
            ProfileKind::Raw,
            ProfileKind::Delta8,
            ProfileKind::Delta4,
        ] {
            assert_eq!(ProfileKind::from_tag(kind.tag()), kind);
        }
    }
}
