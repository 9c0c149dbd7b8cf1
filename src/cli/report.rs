//! JSON reports printed by the CLI

use anyhow::{bail, Context, Result};
use serde::Serialize;

use velo_route::{ElevationProfile, ElevationStats, Graph, PointCh, Route, Waypoint};

/// A WGS84 position, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl From<PointCh> for LatLon {
    fn from(point: PointCh) -> Self {
        Self {
            lat: point.lat(),
            lon: point.lon(),
        }
    }
}

/// Parse a `LAT,LON` argument into a plane point.
pub fn parse_lat_lon(s: &str) -> Result<PointCh> {
    let Some((lat, lon)) = s.split_once(',') else {
        bail!("Coordinate must be in format 'lat,lon', got '{s}'");
    };
    let lat: f64 = lat
        .trim()
        .parse()
        .with_context(|| format!("Invalid latitude in '{s}'"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .with_context(|| format!("Invalid longitude in '{s}'"))?;
    PointCh::from_wgs84(lon, lat).with_context(|| format!("Coordinate '{s}' is outside the graph area"))
}

#[derive(Debug, Serialize)]
pub struct NodeReport {
    pub node_id: u32,
    pub position: LatLon,
    pub e: f64,
    pub n: f64,
    /// Distance from the queried point, in metres.
    pub distance: f64,
}

impl NodeReport {
    pub fn new(graph: &Graph, node_id: u32, query: &PointCh) -> Self {
        let point = graph.node_point(node_id);
        Self {
            node_id,
            position: point.into(),
            e: point.e,
            n: point.n,
            distance: point.distance_to(query),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WaypointReport {
    pub position: LatLon,
    pub node_id: u32,
}

/// Summary of a planned itinerary.
#[derive(Debug, Serialize)]
pub struct RouteReport {
    /// Length in metres.
    pub length: f64,
    pub node_count: usize,
    pub segment_count: usize,
    pub elevation: ElevationStats,
    pub waypoints: Vec<WaypointReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<LatLon>>,
}

impl RouteReport {
    pub fn new(
        route: &Route,
        profile: &ElevationProfile,
        waypoints: &[Waypoint],
        with_points: bool,
    ) -> Self {
        let points = route.points();
        Self {
            length: route.length(),
            node_count: points.len(),
            segment_count: route.segment_count(),
            elevation: profile.stats(),
            waypoints: waypoints
                .iter()
                .map(|w| WaypointReport {
                    position: w.point.into(),
                    node_id: w.node_id,
                })
                .collect(),
            points: with_points.then(|| points.into_iter().map(LatLon::from).collect()),
        }
    }
}
