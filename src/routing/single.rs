//! Route made of one contiguous edge chain

use std::sync::Arc;

use super::edge::Edge;
use super::route::RoutePoint;
use crate::core::{Error, Result};
use crate::projection::PointCh;

/// Chain of edges with the cumulative position of every node.
///
/// Clones share the edges.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleRoute {
    edges: Arc<[Edge]>,
    /// `node_positions[i]` is the position of the start of edge `i`; the last
    /// entry is the total length.
    node_positions: Arc<[f64]>,
}

impl SingleRoute {
    pub fn new(edges: Vec<Edge>) -> Result<Self> {
        if edges.is_empty() {
            return Err(Error::invalid("a route needs at least one edge"));
        }
        if let Some(i) = edges
            .windows(2)
            .position(|w| w[0].to_node_id != w[1].from_node_id)
        {
            return Err(Error::invalid(format!(
                "edge {} ends at node {} but edge {} starts at node {}",
                i,
                edges[i].to_node_id,
                i + 1,
                edges[i + 1].from_node_id
            )));
        }

        let mut node_positions = Vec::with_capacity(edges.len() + 1);
        let mut position = 0.0;
        node_positions.push(position);
        for edge in &edges {
            position += edge.length;
            node_positions.push(position);
        }

        Ok(Self {
            edges: edges.into(),
            node_positions: node_positions.into(),
        })
    }

    pub fn length(&self) -> f64 {
        self.node_positions[self.edges.len()]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn points(&self) -> Vec<PointCh> {
        std::iter::once(self.edges[0].from_point)
            .chain(self.edges.iter().map(|e| e.to_point))
            .collect()
    }

    fn clamp(&self, position: f64) -> f64 {
        position.clamp(0.0, self.length())
    }

    /// Index of the edge containing `position` (already clamped).
    ///
    /// A position on an inner node belongs to the edge starting there, the
    /// end of the route to the last edge. With edges of 10, 5 and 7 m,
    /// position 10 is on edge 1 and position 15 on edge 2.
    pub fn edge_index_at(&self, position: f64) -> usize {
        let after = self.node_positions.partition_point(|&p| p <= position);
        after.saturating_sub(1).min(self.edges.len() - 1)
    }

    /// Edge containing `position` and the position relative to its start.
    fn locate(&self, position: f64) -> (&Edge, f64) {
        let position = self.clamp(position);
        let i = self.edge_index_at(position);
        (&self.edges[i], position - self.node_positions[i])
    }

    pub fn point_at(&self, position: f64) -> PointCh {
        let (edge, local) = self.locate(position);
        edge.point_at(local)
    }

    pub fn elevation_at(&self, position: f64) -> f64 {
        let (edge, local) = self.locate(position);
        edge.elevation_at(local)
    }

    pub fn node_closest_to(&self, position: f64) -> u32 {
        let (edge, local) = self.locate(position);
        if local <= edge.length / 2.0 {
            edge.from_node_id
        } else {
            edge.to_node_id
        }
    }

    pub fn point_closest_to(&self, point: &PointCh) -> RoutePoint {
        let mut closest = RoutePoint::NONE;
        for (edge, &start) in self.edges.iter().zip(self.node_positions.iter()) {
            let local = edge.position_closest_to(point).clamp(0.0, edge.length);
            let candidate = edge.point_at(local);
            closest = closest.min(RoutePoint {
                point: candidate,
                position: start + local,
                distance_to_reference: candidate.distance_to(point),
            });
        }
        closest
    }
}
