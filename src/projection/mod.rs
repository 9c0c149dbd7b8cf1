//! Plane coordinates of the graph and their WGS84 conversions

pub mod ch1903;
pub mod point;

pub use point::{PointCh, SwissBounds};
