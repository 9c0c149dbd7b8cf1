//! Graph façade over the binary tables
//!
//! A [`Graph`] owns the six file buffers (memory-mapped when loaded from disk)
//! and answers every topology, geometry and profile query by node or edge
//! identity. It is immutable once loaded and safe to share between threads.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use serde::Serialize;

use crate::core::{math, Error, Result};
use crate::formats::attributes::parse_attribute_sets;
use crate::formats::edges::{EDGE_RECORD_SIZE, ELEVATION_SLOT_SIZE, PROFILE_ID_SIZE};
use crate::formats::nodes::NODE_RECORD_SIZE;
use crate::formats::sectors::{SECTOR_COUNT, SECTOR_RECORD_SIZE};
use crate::formats::{
    AttributeSet, GraphBuffer, GraphBuffers, GraphEdges, GraphNodes, GraphSectors, ProfileKind,
    ATTRIBUTES_FILE, EDGES_FILE, ELEVATIONS_FILE, NODES_FILE, PROFILE_IDS_FILE, SECTORS_FILE,
};
use crate::projection::PointCh;

/// Elevation along one edge, as a function of the position on it.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeProfile {
    /// No elevation data; every position maps to NaN.
    Unknown,
    /// Samples evenly spread over `[0, length]`, in travel order.
    Sampled { samples: Arc<[f32]>, length: f64 },
}

impl EdgeProfile {
    /// Elevation at `position` metres from the start of the edge, clamped to
    /// the edge.
    pub fn elevation_at(&self, position: f64) -> f64 {
        match self {
            EdgeProfile::Unknown => f64::NAN,
            EdgeProfile::Sampled { samples, length } => {
                math::sampled_at(samples, *length, position)
            }
        }
    }
}

/// Summary counts of a loaded graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub edges_with_profile: usize,
    pub elevation_slots: usize,
    pub attribute_sets: usize,
}

pub struct Graph {
    nodes: GraphBuffer,
    sectors: GraphBuffer,
    edges: GraphBuffer,
    profile_ids: GraphBuffer,
    elevations: GraphBuffer,
    attribute_sets: Vec<AttributeSet>,
}

impl Graph {
    /// Map the graph files found in `dir` and validate them.
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let started = Instant::now();
        info!("Loading graph from {}", dir.display());

        let attributes = GraphBuffer::map(&dir.join(ATTRIBUTES_FILE))?;
        let graph = Self::from_parts(
            GraphBuffer::map(&dir.join(NODES_FILE))?,
            GraphBuffer::map(&dir.join(SECTORS_FILE))?,
            GraphBuffer::map(&dir.join(EDGES_FILE))?,
            GraphBuffer::map(&dir.join(PROFILE_IDS_FILE))?,
            GraphBuffer::map(&dir.join(ELEVATIONS_FILE))?,
            &attributes,
        )?;

        info!(
            "Loaded {} nodes and {} edges in {:.1?}",
            graph.node_count(),
            graph.edge_count(),
            started.elapsed()
        );
        Ok(graph)
    }

    /// Graph backed by owned buffers, e.g. from [`GraphWriter`](crate::formats::GraphWriter).
    pub fn from_buffers(buffers: GraphBuffers) -> Result<Self> {
        Self::from_parts(
            buffers.nodes.into(),
            buffers.sectors.into(),
            buffers.edges.into(),
            buffers.profile_ids.into(),
            buffers.elevations.into(),
            &buffers.attributes,
        )
    }

    fn from_parts(
        nodes: GraphBuffer,
        sectors: GraphBuffer,
        edges: GraphBuffer,
        profile_ids: GraphBuffer,
        elevations: GraphBuffer,
        attributes: &[u8],
    ) -> Result<Self> {
        let graph = Self {
            nodes,
            sectors,
            edges,
            profile_ids,
            elevations,
            attribute_sets: parse_attribute_sets(attributes)?,
        };
        graph.validate()?;
        Ok(graph)
    }

    /// Check table sizes and every cross-table reference, so that queries on
    /// valid identities never read out of bounds.
    fn validate(&self) -> Result<()> {
        check_stride(NODES_FILE, &self.nodes, NODE_RECORD_SIZE)?;
        check_stride(EDGES_FILE, &self.edges, EDGE_RECORD_SIZE)?;
        check_stride(PROFILE_IDS_FILE, &self.profile_ids, PROFILE_ID_SIZE)?;
        check_stride(ELEVATIONS_FILE, &self.elevations, ELEVATION_SLOT_SIZE)?;
        if self.sectors.len() != SECTOR_COUNT * SECTOR_RECORD_SIZE {
            return Err(Error::corrupt(format!(
                "{SECTORS_FILE} has {} bytes, expected {}",
                self.sectors.len(),
                SECTOR_COUNT * SECTOR_RECORD_SIZE
            )));
        }

        let nodes = self.nodes();
        let edges = self.edges();
        let node_count = nodes.count();
        let edge_count = edges.count();

        if self.profile_ids.len() / PROFILE_ID_SIZE != edge_count {
            return Err(Error::corrupt(format!(
                "{} profile ids for {edge_count} edges",
                self.profile_ids.len() / PROFILE_ID_SIZE
            )));
        }

        for node_id in 0..node_count as u32 {
            let end = nodes.first_edge_id(node_id) as usize + nodes.out_degree(node_id) as usize;
            if end > edge_count {
                return Err(Error::corrupt(format!(
                    "node {node_id} references edges up to {end}, only {edge_count} exist"
                )));
            }
        }

        let sectors = self.sectors();
        for index in 0..SECTOR_COUNT {
            let start = sectors.raw_start(index);
            let end = i64::from(start) + i64::from(sectors.raw_count(index));
            if start < 0 || end > node_count as i64 {
                return Err(Error::corrupt(format!(
                    "sector {index} covers nodes [{start}, {end}) outside [0, {node_count})"
                )));
            }
        }

        let slot_count = edges.elevation_slot_count();
        for edge_id in 0..edge_count as u32 {
            let target = edges.target_node_id(edge_id);
            if target as usize >= node_count {
                return Err(Error::corrupt(format!(
                    "edge {edge_id} targets unknown node {target}"
                )));
            }
            let attributes = edges.attributes_index(edge_id);
            if attributes >= self.attribute_sets.len() {
                return Err(Error::corrupt(format!(
                    "edge {edge_id} uses unknown attribute set {attributes}"
                )));
            }
            let kind = edges.profile_kind(edge_id);
            if kind != ProfileKind::None {
                let first = edges.first_sample_index(edge_id);
                let slots = kind.slot_count(edges.sample_count(edge_id));
                if first + slots > slot_count {
                    return Err(Error::corrupt(format!(
                        "profile of edge {edge_id} needs slots [{first}, {}), only {slot_count} exist",
                        first + slots
                    )));
                }
            }
        }

        debug!(
            "Graph tables consistent: {node_count} nodes, {edge_count} edges, {slot_count} elevation slots"
        );
        Ok(())
    }

    pub fn nodes(&self) -> GraphNodes<'_> {
        GraphNodes::new(&self.nodes)
    }

    pub fn sectors(&self) -> GraphSectors<'_> {
        GraphSectors::new(&self.sectors)
    }

    pub fn edges(&self) -> GraphEdges<'_> {
        GraphEdges::new(&self.edges, &self.profile_ids, &self.elevations)
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    pub fn stats(&self) -> GraphStats {
        let edges = self.edges();
        GraphStats {
            nodes: self.node_count(),
            edges: edges.count(),
            edges_with_profile: (0..edges.count() as u32)
                .filter(|&id| edges.has_profile(id))
                .count(),
            elevation_slots: edges.elevation_slot_count(),
            attribute_sets: self.attribute_sets.len(),
        }
    }

    pub fn node_point(&self, node_id: u32) -> PointCh {
        self.nodes().position(node_id)
    }

    pub fn node_out_degree(&self, node_id: u32) -> u32 {
        self.nodes().out_degree(node_id)
    }

    pub fn node_out_edge_id(&self, node_id: u32, k: u32) -> u32 {
        self.nodes().edge_id(node_id, k)
    }

    /// Identities of the edges leaving `node_id`.
    pub fn node_out_edges(&self, node_id: u32) -> std::ops::Range<u32> {
        let nodes = self.nodes();
        let first = nodes.first_edge_id(node_id);
        first..first + nodes.out_degree(node_id)
    }

    /// Closest node within `search_distance` metres of `point` (inclusive).
    ///
    /// Among equidistant nodes the one with the smallest identity wins.
    pub fn node_closest_to(&self, point: &PointCh, search_distance: f64) -> Option<u32> {
        if search_distance.is_nan() || search_distance < 0.0 {
            return None;
        }
        let nodes = self.nodes();
        let max_squared = search_distance * search_distance;
        let mut best: Option<(u32, f64)> = None;

        for sector in self.sectors().sectors_in_area(point, search_distance) {
            for node_id in sector.node_ids() {
                let d2 = point.squared_distance_to(&nodes.position(node_id));
                if d2 <= max_squared && best.map_or(true, |(_, b)| d2 < b) {
                    best = Some((node_id, d2));
                }
            }
        }
        best.map(|(id, _)| id)
    }

    pub fn edge_target_node_id(&self, edge_id: u32) -> u32 {
        self.edges().target_node_id(edge_id)
    }

    pub fn edge_is_inverted(&self, edge_id: u32) -> bool {
        self.edges().is_inverted(edge_id)
    }

    pub fn edge_attributes(&self, edge_id: u32) -> AttributeSet {
        self.attribute_sets[self.edges().attributes_index(edge_id)]
    }

    pub fn edge_length(&self, edge_id: u32) -> f64 {
        self.edges().length(edge_id)
    }

    pub fn edge_elevation_gain(&self, edge_id: u32) -> f64 {
        self.edges().elevation_gain(edge_id)
    }

    /// Elevation profile of an edge in its direction of travel.
    pub fn edge_profile(&self, edge_id: u32) -> EdgeProfile {
        let edges = self.edges();
        if !edges.has_profile(edge_id) {
            return EdgeProfile::Unknown;
        }
        EdgeProfile::Sampled {
            samples: edges.profile_samples(edge_id).into(),
            length: edges.length(edge_id),
        }
    }
}

fn check_stride(name: &str, buffer: &[u8], record_size: usize) -> Result<()> {
    if buffer.len() % record_size != 0 {
        return Err(Error::corrupt(format!(
            "{name} has {} bytes, not a multiple of its {record_size}-byte records",
            buffer.len()
        )));
    }
    Ok(())
}
