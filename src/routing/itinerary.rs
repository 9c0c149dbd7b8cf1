//! Routes through a sequence of waypoints

use log::debug;
use serde::Serialize;

use super::cache::RouteCache;
use super::computer::RouteComputer;
use super::cost::CostFunction;
use super::multi::MultiRoute;
use super::route::Route;
use crate::core::{Error, Result};
use crate::graph::Graph;
use crate::projection::PointCh;

/// A point picked by the user, attached to its nearest graph node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waypoint {
    pub point: PointCh,
    pub node_id: u32,
}

impl Waypoint {
    /// Waypoint at `point`, or `None` if no node lies within `radius` metres.
    pub fn snap(graph: &Graph, point: PointCh, radius: f64) -> Option<Self> {
        graph
            .node_closest_to(&point, radius)
            .map(|node_id| Self { point, node_id })
    }
}

/// Plans multi-leg routes, reusing legs computed earlier.
pub struct ItineraryPlanner<'g, C> {
    computer: RouteComputer<'g, C>,
    cache: RouteCache,
}

impl<'g, C: CostFunction> ItineraryPlanner<'g, C> {
    pub fn new(computer: RouteComputer<'g, C>, cache_capacity: usize) -> Self {
        Self {
            computer,
            cache: RouteCache::new(cache_capacity),
        }
    }

    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    /// Route visiting every waypoint in order.
    pub fn plan(&mut self, waypoints: &[Waypoint]) -> Result<Option<Route>> {
        let node_ids: Vec<u32> = waypoints.iter().map(|w| w.node_id).collect();
        self.plan_nodes(&node_ids)
    }

    /// Route visiting every node in order, one leg per consecutive pair.
    ///
    /// Pairs on the same node add no leg. `None` if any leg is unreachable
    /// or no leg remains.
    pub fn plan_nodes(&mut self, node_ids: &[u32]) -> Result<Option<Route>> {
        if node_ids.len() < 2 {
            return Err(Error::invalid(format!(
                "an itinerary needs at least two waypoints, got {}",
                node_ids.len()
            )));
        }

        let mut legs = Vec::with_capacity(node_ids.len() - 1);
        for pair in node_ids.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            if start == end {
                continue;
            }
            match self.leg(start, end)? {
                Some(route) => legs.push(route),
                None => {
                    debug!("No route between waypoint nodes {start} and {end}");
                    return Ok(None);
                }
            }
        }

        if legs.is_empty() {
            return Ok(None);
        }
        Ok(Some(MultiRoute::new(legs)?.into()))
    }

    fn leg(&mut self, start: u32, end: u32) -> Result<Option<Route>> {
        if let Some(leg) = self.cache.get(start, end) {
            return Ok(leg.clone());
        }
        let leg = self.computer.best_route_between(start, end)?;
        self.cache.insert(start, end, leg.clone());
        Ok(leg)
    }
}
