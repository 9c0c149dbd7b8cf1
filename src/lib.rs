//! # Velo-route Library
//!
//! Route-planning core for a bicycle route planner over a compact,
//! memory-mapped road graph of Switzerland.
//!
//! ## Features
//!
//! - **Zero-copy graph**: node, sector and edge tables read straight from mapped files
//! - **Pluggable costs**: Dijkstra search weighted by any [`routing::CostFunction`]
//! - **Route queries**: geometry and elevation at any position along a route
//! - **Itineraries**: multi-leg routes through snapped waypoints, with a leg cache
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use velo_route::{Graph, PointCh, RouteComputer, UniformCost};
//!
//! fn main() -> velo_route::Result<()> {
//!     let graph = Graph::load_from("data/ch")?;
//!     let start = graph.node_closest_to(&PointCh::new(2_600_000.0, 1_200_000.0), 500.0);
//!     let end = graph.node_closest_to(&PointCh::new(2_601_500.0, 1_199_000.0), 500.0);
//!
//!     if let (Some(start), Some(end)) = (start, end) {
//!         let computer = RouteComputer::new(&graph, UniformCost);
//!         if let Some(route) = computer.best_route_between(start, end)? {
//!             println!("{:.0} m", route.length());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod formats;
pub mod graph;
pub mod projection;
pub mod routing;

pub use crate::config::{CostProfile, PlannerConfig};
pub use crate::core::{Error, Result};
pub use crate::formats::{Attribute, AttributeSet, EdgeSpec, GraphWriter};
pub use crate::graph::{EdgeProfile, Graph, GraphStats};
pub use crate::projection::PointCh;
pub use crate::routing::{
    CityBikeCost, CostFunction, Edge, ElevationProfile, ElevationStats, ItineraryPlanner,
    MultiRoute, Route, RouteCache, RouteComputer, RoutePoint, SingleRoute, UniformCost, Waypoint,
};
