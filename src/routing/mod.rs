//! Route search and route queries
//!
//! [`RouteComputer`] finds the cheapest edge chain between two nodes under a
//! [`CostFunction`]; the result is a [`Route`] answering position-based
//! geometry and elevation queries. [`ItineraryPlanner`] chains legs through
//! several waypoints into a [`MultiRoute`].

pub mod cache;
pub mod computer;
pub mod cost;
pub mod edge;
pub mod itinerary;
pub mod multi;
pub mod profile;
pub mod route;
pub mod single;

pub use cache::RouteCache;
pub use computer::RouteComputer;
pub use cost::{CityBikeCost, CostFunction, UniformCost};
pub use edge::Edge;
pub use itinerary::{ItineraryPlanner, Waypoint};
pub use multi::MultiRoute;
pub use profile::{ElevationProfile, ElevationStats};
pub use route::{Route, RoutePoint};
pub use single::SingleRoute;
