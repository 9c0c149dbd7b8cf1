//! Edges as traversed by a route

use crate::core::math;
use crate::graph::{EdgeProfile, Graph};
use crate::projection::PointCh;

/// One graph edge oriented from `from_node_id` to `to_node_id`, detached from
/// the graph buffers.
///
/// The geometry is the straight chord between the two node points.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from_node_id: u32,
    pub to_node_id: u32,
    pub from_point: PointCh,
    pub to_point: PointCh,
    pub length: f64,
    pub profile: EdgeProfile,
}

impl Edge {
    pub fn new(
        from_node_id: u32,
        to_node_id: u32,
        from_point: PointCh,
        to_point: PointCh,
        length: f64,
        profile: EdgeProfile,
    ) -> Self {
        Self {
            from_node_id,
            to_node_id,
            from_point,
            to_point,
            length,
            profile,
        }
    }

    /// Edge `edge_id` of `graph`, traversed from `from_node_id` to `to_node_id`.
    pub fn of(graph: &Graph, edge_id: u32, from_node_id: u32, to_node_id: u32) -> Self {
        Self::new(
            from_node_id,
            to_node_id,
            graph.node_point(from_node_id),
            graph.node_point(to_node_id),
            graph.edge_length(edge_id),
            graph.edge_profile(edge_id),
        )
    }

    /// Signed position along the edge of the orthogonal projection of `point`.
    /// May fall outside `[0, length]`.
    pub fn position_closest_to(&self, point: &PointCh) -> f64 {
        math::projection_length(
            (self.from_point.e, self.from_point.n),
            (self.to_point.e, self.to_point.n),
            (point.e, point.n),
        )
    }

    /// Point at `position` metres along the chord, extrapolated outside the edge.
    pub fn point_at(&self, position: f64) -> PointCh {
        if self.length == 0.0 {
            return self.from_point;
        }
        let t = position / self.length;
        PointCh::new(
            math::interpolate(self.from_point.e, self.to_point.e, t),
            math::interpolate(self.from_point.n, self.to_point.n, t),
        )
    }

    /// Elevation at `position`, NaN without profile.
    pub fn elevation_at(&self, position: f64) -> f64 {
        self.profile.elevation_at(position)
    }
}
