///! Graph file writer - encodes an in-memory graph into the six binary tables

use std::path::Path;

use log::debug;

use super::attributes::{AttributeSet, ATTRIBUTE_SET_SIZE};
use super::edges::{sample_count_for, ProfileKind, MAX_FIRST_SAMPLE};
use super::nodes::{DEGREE_SHIFT, MAX_EDGE_INDEX, MAX_OUT_DEGREE};
use super::sectors::{sector_index_of, SECTOR_COUNT};
use super::GraphBuffers;
use crate::core::{q28_4, Error, Result};
use crate::graph::Graph;
use crate::projection::PointCh;

/// One outgoing edge to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec {
    pub target: u32,
    /// Length in metres, stored with 1/16 m resolution.
    pub length: f64,
    pub elevation_gain: f64,
    pub inverted: bool,
    /// Index into the writer's attribute sets.
    pub attribute_set: u16,
    /// Elevations in travel order, one every two metres, both ends included.
    /// Empty for an edge without profile.
    pub profile: Vec<f32>,
}

impl EdgeSpec {
    pub fn new(target: u32, length: f64) -> Self {
        Self {
            target,
            length,
            elevation_gain: 0.0,
            inverted: false,
            attribute_set: 0,
            profile: Vec::new(),
        }
    }

    pub fn with_profile(mut self, profile: Vec<f32>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_elevation_gain(mut self, gain: f64) -> Self {
        self.elevation_gain = gain;
        self
    }

    pub fn with_attribute_set(mut self, index: u16) -> Self {
        self.attribute_set = index;
        self
    }

    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }
}

struct NodeSpec {
    point: PointCh,
    edges: Vec<EdgeSpec>,
}

/// Builds graph tables node by node.
///
/// Nodes must be added in sector order (row-major over the 128 x 128 grid) so
/// each sector is a contiguous node range. Edge identities are assigned in
/// node order, and in insertion order within a node.
#[derive(Default)]
pub struct GraphWriter {
    nodes: Vec<NodeSpec>,
    attribute_sets: Vec<AttributeSet>,
}

impl GraphWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_attribute_set(&mut self, set: AttributeSet) -> Result<u16> {
        let index = u16::try_from(self.attribute_sets.len())
            .map_err(|_| Error::invalid("too many attribute sets"))?;
        self.attribute_sets.push(set);
        Ok(index)
    }

    pub fn add_node(&mut self, point: PointCh) -> u32 {
        self.nodes.push(NodeSpec {
            point,
            edges: Vec::new(),
        });
        (self.nodes.len() - 1) as u32
    }

    pub fn add_edge(&mut self, from: u32, edge: EdgeSpec) -> Result<()> {
        let node = self
            .nodes
            .get_mut(from as usize)
            .ok_or_else(|| Error::invalid(format!("unknown source node {from}")))?;
        node.edges.push(edge);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// Encode every table.
    pub fn encode(&self) -> Result<GraphBuffers> {
        let mut buffers = GraphBuffers {
            attributes: Vec::with_capacity(self.attribute_sets.len() * ATTRIBUTE_SET_SIZE),
            ..GraphBuffers::default()
        };
        for set in &self.attribute_sets {
            buffers.attributes.extend_from_slice(&set.bits().to_be_bytes());
        }

        let mut sector_counts = vec![0usize; SECTOR_COUNT];
        let mut previous_sector = 0;
        let mut elevation_slots: Vec<u16> = Vec::new();
        let mut next_edge: u32 = 0;

        for (node_id, node) in self.nodes.iter().enumerate() {
            let sector = sector_index_of(&node.point);
            if sector < previous_sector {
                return Err(Error::invalid(format!(
                    "node {node_id} lies in sector {sector}, before sector {previous_sector}"
                )));
            }
            previous_sector = sector;
            sector_counts[sector] += 1;

            let degree = node.edges.len() as u32;
            if degree > MAX_OUT_DEGREE || next_edge > MAX_EDGE_INDEX {
                return Err(Error::invalid(format!(
                    "node {node_id} cannot be encoded: degree {degree}, first edge {next_edge}"
                )));
            }
            buffers.nodes.extend_from_slice(&to_q28_4(node.point.e)?.to_be_bytes());
            buffers.nodes.extend_from_slice(&to_q28_4(node.point.n)?.to_be_bytes());
            let out_edges = (degree << DEGREE_SHIFT) | next_edge;
            buffers.nodes.extend_from_slice(&out_edges.to_be_bytes());

            for edge in &node.edges {
                self.encode_edge(edge, &mut buffers, &mut elevation_slots)?;
            }
            next_edge += degree;
        }

        let mut start = 0usize;
        for count in sector_counts {
            let count = u16::try_from(count)
                .map_err(|_| Error::invalid(format!("sector holds {count} nodes")))?;
            buffers.sectors.extend_from_slice(&(start as i32).to_be_bytes());
            buffers.sectors.extend_from_slice(&count.to_be_bytes());
            start += usize::from(count);
        }

        buffers.elevations = elevation_slots.iter().flat_map(|s| s.to_be_bytes()).collect();

        debug!(
            "Encoded {} nodes, {} edges, {} elevation slots",
            self.nodes.len(),
            next_edge,
            elevation_slots.len()
        );
        Ok(buffers)
    }

    fn encode_edge(
        &self,
        edge: &EdgeSpec,
        buffers: &mut GraphBuffers,
        elevation_slots: &mut Vec<u16>,
    ) -> Result<()> {
        if edge.target as usize >= self.nodes.len() {
            return Err(Error::invalid(format!("unknown target node {}", edge.target)));
        }
        if usize::from(edge.attribute_set) >= self.attribute_sets.len() {
            return Err(Error::invalid(format!(
                "unknown attribute set {}",
                edge.attribute_set
            )));
        }
        let length_q = to_q12_4(edge.length, "edge length")?;
        let target = if edge.inverted {
            !(edge.target as i32)
        } else {
            edge.target as i32
        };
        buffers.edges.extend_from_slice(&target.to_be_bytes());
        buffers.edges.extend_from_slice(&length_q.to_be_bytes());
        buffers.edges.extend_from_slice(
            &to_q12_4(edge.elevation_gain, "elevation gain")?.to_be_bytes(),
        );
        buffers.edges.extend_from_slice(&edge.attribute_set.to_be_bytes());

        let profile_id = if edge.profile.is_empty() {
            0
        } else {
            let expected = sample_count_for(length_q);
            if edge.profile.len() != expected {
                return Err(Error::invalid(format!(
                    "edge of {} m needs {expected} profile samples, got {}",
                    edge.length,
                    edge.profile.len()
                )));
            }
            let mut samples = edge
                .profile
                .iter()
                .map(|&s| to_q12_4(f64::from(s), "elevation sample"))
                .collect::<Result<Vec<u16>>>()?;
            // stored in the direction of the underlying way
            if edge.inverted {
                samples.reverse();
            }

            let first = elevation_slots.len();
            if first > MAX_FIRST_SAMPLE as usize {
                return Err(Error::invalid("elevation table is full"));
            }
            let kind = densest_kind(&samples);
            pack_samples(kind, &samples, elevation_slots);
            (kind.tag() << 30) | first as u32
        };
        buffers.profile_ids.extend_from_slice(&profile_id.to_be_bytes());
        Ok(())
    }

    /// Write the six files into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        self.encode()?.write_to(dir)
    }

    /// Encode and load into an owned [`Graph`].
    pub fn build(&self) -> Result<Graph> {
        Graph::from_buffers(self.encode()?)
    }
}

fn to_q28_4(value: f64) -> Result<i32> {
    let q = (value * 16.0).round();
    if !(f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&q) {
        return Err(Error::invalid(format!("coordinate {value} out of Q28.4 range")));
    }
    Ok(q as i32)
}

fn to_q12_4(value: f64, what: &str) -> Result<u16> {
    let q = (value * 16.0).round();
    if !(0.0..=f64::from(u16::MAX)).contains(&q) {
        return Err(Error::invalid(format!("{what} {value} out of Q12.4 range")));
    }
    Ok(q as u16)
}

/// Most compact encoding that stores `samples` exactly.
fn densest_kind(samples: &[u16]) -> ProfileKind {
    let max_delta = samples
        .windows(2)
        .map(|w| i32::from(w[1]) - i32::from(w[0]))
        .fold((0, 0), |(lo, hi), d| (d.min(lo), d.max(hi)));
    match max_delta {
        (lo, hi) if lo >= -8 && hi <= 7 => ProfileKind::Delta4,
        (lo, hi) if lo >= -128 && hi <= 127 => ProfileKind::Delta8,
        _ => ProfileKind::Raw,
    }
}

fn pack_samples(kind: ProfileKind, samples: &[u16], slots: &mut Vec<u16>) {
    if kind == ProfileKind::Raw {
        slots.extend_from_slice(samples);
        return;
    }
    let per_slot = kind.samples_per_slot();
    let width = 16 / per_slot;
    let mask = (1u16 << width) - 1;

    slots.push(samples[0]);
    let deltas: Vec<i32> = samples
        .windows(2)
        .map(|w| i32::from(w[1]) - i32::from(w[0]))
        .collect();
    for chunk in deltas.chunks(per_slot) {
        let mut slot = 0u16;
        for (j, &delta) in chunk.iter().enumerate() {
            slot |= ((delta as u16) & mask) << (16 - width * (j + 1));
        }
        slots.push(slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::edges::GraphEdges;
    use crate::formats::nodes::GraphNodes;
    use crate::formats::sectors::{GraphSectors, SECTOR_RECORD_SIZE};

    fn p(e: f64, n: f64) -> PointCh {
        PointCh::new(e, n)
    }

    #[test]
    fn test_encodes_nodes_edges_and_sectors() {
        let mut writer = GraphWriter::new();
        writer.add_attribute_set(AttributeSet::EMPTY).unwrap();
        let a = writer.add_node(p(2_600_000.0, 1_200_000.0));
        let b = writer.add_node(p(2_600_100.5, 1_200_000.0));
        writer.add_edge(a, EdgeSpec::new(b, 100.5)).unwrap();
        writer.add_edge(b, EdgeSpec::new(a, 100.5).inverted()).unwrap();

        let buffers = writer.encode().unwrap();
        assert_eq!(buffers.sectors.len(), SECTOR_COUNT * SECTOR_RECORD_SIZE);
        assert_eq!(buffers.attributes.len(), 8);

        let nodes = GraphNodes::new(&buffers.nodes);
        assert_eq!(nodes.count(), 2);
        assert_eq!(nodes.position(b), p(2_600_100.5, 1_200_000.0));
        assert_eq!(nodes.out_degree(a), 1);
        assert_eq!(nodes.edge_id(b, 0), 1);

        let edges = GraphEdges::new(&buffers.edges, &buffers.profile_ids, &buffers.elevations);
        assert_eq!(edges.count(), 2);
        assert_eq!(edges.target_node_id(0), b);
        assert!(edges.is_inverted(1));
        assert_eq!(edges.target_node_id(1), a);
        assert_eq!(edges.length(1), 100.5);
        assert!(!edges.has_profile(0));

        let sectors = GraphSectors::new(&buffers.sectors);
        let index = sector_index_of(&p(2_600_000.0, 1_200_000.0));
        let sector = sectors.sector(index);
        assert_eq!(sector.node_ids(), 0..2);
        assert_eq!(sectors.sector(index + 1).node_ids(), 2..2);
    }

    #[test]
    fn test_profiles_use_densest_exact_encoding() {
        let mut writer = GraphWriter::new();
        writer.add_attribute_set(AttributeSet::EMPTY).unwrap();
        let a = writer.add_node(p(2_600_000.0, 1_200_000.0));
        let b = writer.add_node(p(2_600_004.0, 1_200_000.0));
        let gentle = vec![500.0, 500.25, 500.0];
        let steep = vec![500.0, 505.0, 498.0];
        let cliff = vec![500.0, 540.0, 400.0];
        writer.add_edge(a, EdgeSpec::new(b, 4.0).with_profile(gentle.clone())).unwrap();
        writer.add_edge(a, EdgeSpec::new(b, 4.0).with_profile(steep.clone())).unwrap();
        writer.add_edge(a, EdgeSpec::new(b, 4.0).with_profile(cliff.clone())).unwrap();
        writer
            .add_edge(b, EdgeSpec::new(a, 4.0).with_profile(steep.clone()).inverted())
            .unwrap();

        let buffers = writer.encode().unwrap();
        let edges = GraphEdges::new(&buffers.edges, &buffers.profile_ids, &buffers.elevations);
        assert_eq!(edges.profile_kind(0), ProfileKind::Delta4);
        assert_eq!(edges.profile_kind(1), ProfileKind::Delta8);
        assert_eq!(edges.profile_kind(2), ProfileKind::Raw);
        assert_eq!(edges.profile_samples(0), gentle);
        assert_eq!(edges.profile_samples(1), steep);
        assert_eq!(edges.profile_samples(2), cliff);
        assert_eq!(edges.profile_samples(3), steep);
    }

    #[test]
    fn test_delta4_packing_matches_reference_slots() {
        let samples: Vec<u16> = [
            384.75, 384.6875, 384.5625, 384.5, 384.4375, 384.375, 384.3125, 384.25, 384.125,
            384.0625,
        ]
        .iter()
        .map(|&s: &f64| (s * 16.0) as u16)
        .collect();
        let kind = densest_kind(&samples);
        assert_eq!(kind, ProfileKind::Delta4);

        let mut slots = Vec::new();
        pack_samples(kind, &samples, &mut slots);
        assert_eq!(slots, vec![0x180C, 0xFEFF, 0xFFFE, 0xF000]);
    }

    #[test]
    fn test_every_encoding_decodes_to_the_same_samples() {
        let elevations = [
            384.75, 384.6875, 384.5625, 384.5, 384.4375, 384.375, 384.3125, 384.25, 384.125,
            384.0625,
        ];
        let samples: Vec<u16> = elevations.iter().map(|&s: &f64| (s * 16.0) as u16).collect();
        let kinds = [ProfileKind::Raw, ProfileKind::Delta8, ProfileKind::Delta4];

        // one 18 m edge per kind, all sharing the elevation table
        let length_q: u16 = 18 * 16;
        assert_eq!(sample_count_for(length_q), samples.len());
        let mut edges = Vec::new();
        let mut profile_ids = Vec::new();
        let mut slots = Vec::new();
        for kind in kinds {
            edges.extend_from_slice(&0i32.to_be_bytes());
            edges.extend_from_slice(&length_q.to_be_bytes());
            edges.extend_from_slice(&0u16.to_be_bytes());
            edges.extend_from_slice(&0u16.to_be_bytes());
            profile_ids.extend_from_slice(&((kind.tag() << 30) | slots.len() as u32).to_be_bytes());
            pack_samples(kind, &samples, &mut slots);
        }
        let elevation_bytes: Vec<u8> = slots.iter().flat_map(|s| s.to_be_bytes()).collect();

        let view = GraphEdges::new(&edges, &profile_ids, &elevation_bytes);
        let expected: Vec<f32> = elevations.iter().map(|&e| e as f32).collect();
        for (edge_id, kind) in kinds.into_iter().enumerate() {
            assert_eq!(view.profile_kind(edge_id as u32), kind);
            assert_eq!(view.profile_samples(edge_id as u32), expected);
        }
    }

    #[test]
    fn test_rejects_unsorted_nodes() {
        let mut writer = GraphWriter::new();
        writer.add_node(p(2_800_000.0, 1_250_000.0));
        writer.add_node(p(2_500_000.0, 1_080_000.0));
        assert!(matches!(writer.encode(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_bad_edges() {
        let mut writer = GraphWriter::new();
        writer.add_attribute_set(AttributeSet::EMPTY).unwrap();
        let a = writer.add_node(p(2_600_000.0, 1_200_000.0));
        assert!(writer.add_edge(7, EdgeSpec::new(a, 1.0)).is_err());

        writer.add_edge(a, EdgeSpec::new(3, 1.0)).unwrap();
        assert!(writer.encode().is_err());

        let mut writer = GraphWriter::new();
        writer.add_attribute_set(AttributeSet::EMPTY).unwrap();
        let a = writer.add_node(p(2_600_000.0, 1_200_000.0));
        writer
            .add_edge(a, EdgeSpec::new(a, 4.0).with_profile(vec![1.0, 2.0]))
            .unwrap();
        assert!(writer.encode().is_err());

        let mut writer = GraphWriter::new();
        writer.add_attribute_set(AttributeSet::EMPTY).unwrap();
        let a = writer.add_node(p(2_600_000.0, 1_200_000.0));
        writer.add_edge(a, EdgeSpec::new(a, 5000.0)).unwrap();
        assert!(writer.encode().is_err());
    }
}
