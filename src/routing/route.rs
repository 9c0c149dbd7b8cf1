//! Route abstraction: a single edge chain or a concatenation of routes

use serde::Serialize;

use super::edge::Edge;
use super::multi::MultiRoute;
use super::single::SingleRoute;
use crate::projection::PointCh;

/// Point of a route closest to some reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoutePoint {
    pub point: PointCh,
    /// Position of `point` along the route, in metres.
    pub position: f64,
    pub distance_to_reference: f64,
}

impl RoutePoint {
    /// Farther than any real candidate.
    pub const NONE: RoutePoint = RoutePoint {
        point: PointCh::new(f64::NAN, f64::NAN),
        position: f64::NAN,
        distance_to_reference: f64::INFINITY,
    };

    pub fn is_none(&self) -> bool {
        self.distance_to_reference == f64::INFINITY
    }

    /// Same point, `offset` metres further along.
    pub fn shifted_by(self, offset: f64) -> Self {
        if offset == 0.0 {
            return self;
        }
        Self {
            position: self.position + offset,
            ..self
        }
    }

    /// The closer of `self` and `that`; `self` on equal distance.
    pub fn min(self, that: RoutePoint) -> Self {
        if that.distance_to_reference < self.distance_to_reference {
            that
        } else {
            self
        }
    }
}

/// A non-empty, chained sequence of edges, queryable by position.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Single(SingleRoute),
    Multi(MultiRoute),
}

impl Route {
    /// Total length in metres.
    pub fn length(&self) -> f64 {
        match self {
            Route::Single(r) => r.length(),
            Route::Multi(r) => r.length(),
        }
    }

    /// Index of the single route containing `position`, counted over every
    /// single route nested in this one.
    pub fn index_of_segment_at(&self, position: f64) -> usize {
        match self {
            Route::Single(_) => 0,
            Route::Multi(r) => r.index_of_segment_at(position),
        }
    }

    /// Number of single routes nested in this route.
    pub fn segment_count(&self) -> usize {
        match self {
            Route::Single(_) => 1,
            Route::Multi(r) => r.segment_count(),
        }
    }

    pub fn edges(&self) -> Vec<&Edge> {
        match self {
            Route::Single(r) => r.edges().iter().collect(),
            Route::Multi(r) => r.edges(),
        }
    }

    /// First point of the first edge, then the end point of every edge.
    pub fn points(&self) -> Vec<PointCh> {
        match self {
            Route::Single(r) => r.points(),
            Route::Multi(r) => r.points(),
        }
    }

    /// Point at `position`, clamped to the route.
    pub fn point_at(&self, position: f64) -> PointCh {
        match self {
            Route::Single(r) => r.point_at(position),
            Route::Multi(r) => r.point_at(position),
        }
    }

    /// Elevation at `position`, clamped to the route; NaN where the edge has
    /// no profile.
    pub fn elevation_at(&self, position: f64) -> f64 {
        match self {
            Route::Single(r) => r.elevation_at(position),
            Route::Multi(r) => r.elevation_at(position),
        }
    }

    /// Node of the edge at `position` nearest to it along the route.
    pub fn node_closest_to(&self, position: f64) -> u32 {
        match self {
            Route::Single(r) => r.node_closest_to(position),
            Route::Multi(r) => r.node_closest_to(position),
        }
    }

    /// Point of the route nearest to `point`.
    pub fn point_closest_to(&self, point: &PointCh) -> RoutePoint {
        match self {
            Route::Single(r) => r.point_closest_to(point),
            Route::Multi(r) => r.point_closest_to(point),
        }
    }
}

impl From<SingleRoute> for Route {
    fn from(route: SingleRoute) -> Self {
        Route::Single(route)
    }
}

impl From<MultiRoute> for Route {
    fn from(route: MultiRoute) -> Self {
        Route::Multi(route)
    }
}
