//! Route made of consecutive sub-routes

use super::edge::Edge;
use super::route::{Route, RoutePoint};
use crate::core::{Error, Result};
use crate::projection::PointCh;

/// Concatenation of routes, each starting where the previous one ends.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiRoute {
    segments: Vec<Route>,
    /// Start position of every segment, then the total length.
    segment_positions: Vec<f64>,
}

impl MultiRoute {
    pub fn new(segments: Vec<Route>) -> Result<Self> {
        if segments.is_empty() {
            return Err(Error::invalid("a multi route needs at least one segment"));
        }
        if let Some(i) = segments
            .windows(2)
            .position(|w| last_node(&w[0]) != first_node(&w[1]))
        {
            return Err(Error::invalid(format!(
                "segment {} ends at node {} but segment {} starts at node {}",
                i,
                last_node(&segments[i]),
                i + 1,
                first_node(&segments[i + 1])
            )));
        }
        let mut segment_positions = Vec::with_capacity(segments.len() + 1);
        let mut position = 0.0;
        segment_positions.push(position);
        for segment in &segments {
            position += segment.length();
            segment_positions.push(position);
        }
        Ok(Self {
            segments,
            segment_positions,
        })
    }

    pub fn segments(&self) -> &[Route] {
        &self.segments
    }

    pub fn length(&self) -> f64 {
        self.segment_positions[self.segments.len()]
    }

    pub fn segment_count(&self) -> usize {
        self.segments.iter().map(Route::segment_count).sum()
    }

    /// Index of the segment containing `position` and the position relative
    /// to its start. Boundaries follow the same rule as edges of a single route.
    fn locate(&self, position: f64) -> (usize, f64) {
        let position = position.clamp(0.0, self.length());
        let after = self.segment_positions.partition_point(|&p| p <= position);
        let i = after.saturating_sub(1).min(self.segments.len() - 1);
        (i, position - self.segment_positions[i])
    }

    pub fn index_of_segment_at(&self, position: f64) -> usize {
        let (i, local) = self.locate(position);
        let before: usize = self.segments[..i].iter().map(Route::segment_count).sum();
        before + self.segments[i].index_of_segment_at(local)
    }

    pub fn edges(&self) -> Vec<&Edge> {
        self.segments.iter().flat_map(Route::edges).collect()
    }

    /// Points of every segment, without repeating the shared junctions.
    pub fn points(&self) -> Vec<PointCh> {
        let mut points = self.segments[0].points();
        for segment in &self.segments[1..] {
            points.extend(segment.points().into_iter().skip(1));
        }
        points
    }

    pub fn point_at(&self, position: f64) -> PointCh {
        let (i, local) = self.locate(position);
        self.segments[i].point_at(local)
    }

    pub fn elevation_at(&self, position: f64) -> f64 {
        let (i, local) = self.locate(position);
        self.segments[i].elevation_at(local)
    }

    pub fn node_closest_to(&self, position: f64) -> u32 {
        let (i, local) = self.locate(position);
        self.segments[i].node_closest_to(local)
    }

    pub fn point_closest_to(&self, point: &PointCh) -> RoutePoint {
        self.segments
            .iter()
            .zip(&self.segment_positions)
            .fold(RoutePoint::NONE, |closest, (segment, &start)| {
                closest.min(segment.point_closest_to(point).shifted_by(start))
            })
    }
}

// Routes hold at least one edge.
fn first_node(route: &Route) -> u32 {
    route.edges()[0].from_node_id
}

fn last_node(route: &Route) -> u32 {
    let edges = route.edges();
    edges[edges.len() - 1].to_node_id
}
