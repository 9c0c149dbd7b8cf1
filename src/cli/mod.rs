//! CLI-specific utilities for velo-route
//!
//! This module contains code specific to the command-line interface,
//! separate from the core library functionality.

pub mod report;

pub use report::{parse_lat_lon, NodeReport, RouteReport};
