//! Best route search
//!
//! Dijkstra over the graph with a pluggable cost factor per edge. The search
//! state (distances, predecessors, queue) lives in one call, so a computer can
//! be shared by reference between threads.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;

use log::debug;

use super::cost::CostFunction;
use super::edge::Edge;
use super::route::Route;
use super::single::SingleRoute;
use crate::core::{Error, Result};
use crate::graph::Graph;

const NO_EDGE: u32 = u32::MAX;

/// Queue entry; equal costs pop in insertion order.
#[derive(Clone, Copy)]
struct Queued {
    cost: f64,
    seq: u64,
    node: u32,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.seq.cmp(&other.seq))
    }
}

pub struct RouteComputer<'g, C> {
    graph: &'g Graph,
    cost_function: C,
}

impl<'g, C: CostFunction> RouteComputer<'g, C> {
    pub fn new(graph: &'g Graph, cost_function: C) -> Self {
        Self {
            graph,
            cost_function,
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Cheapest route from `start_node_id` to `end_node_id`, or `None` when the
    /// end cannot be reached.
    ///
    /// Costs are edge lengths scaled by the cost function; the returned route
    /// carries the real lengths.
    pub fn best_route_between(&self, start_node_id: u32, end_node_id: u32) -> Result<Option<Route>> {
        if start_node_id == end_node_id {
            return Err(Error::invalid(format!(
                "start and end are the same node ({start_node_id})"
            )));
        }
        let node_count = self.graph.node_count();
        for id in [start_node_id, end_node_id] {
            if id as usize >= node_count {
                return Err(Error::invalid(format!(
                    "node {id} does not exist ({node_count} nodes)"
                )));
            }
        }

        let started = Instant::now();
        let mut distance = vec![f64::INFINITY; node_count];
        let mut predecessor_edge = vec![NO_EDGE; node_count];
        let mut predecessor_node = vec![0u32; node_count];
        let mut settled = vec![false; node_count];
        let mut queue = BinaryHeap::new();
        let mut seq = 0u64;
        let mut settled_count = 0usize;

        distance[start_node_id as usize] = 0.0;
        queue.push(Reverse(Queued {
            cost: 0.0,
            seq,
            node: start_node_id,
        }));

        while let Some(Reverse(Queued { node, .. })) = queue.pop() {
            let from = node as usize;
            if settled[from] {
                continue;
            }
            settled[from] = true;
            settled_count += 1;

            if node == end_node_id {
                debug!(
                    "Route {start_node_id} -> {end_node_id}: settled {settled_count} nodes in {:.1?}",
                    started.elapsed()
                );
                return self
                    .rebuild(start_node_id, end_node_id, &predecessor_edge, &predecessor_node)
                    .map(Some);
            }

            for edge_id in self.graph.node_out_edges(node) {
                let to = self.graph.edge_target_node_id(edge_id) as usize;
                if settled[to] {
                    continue;
                }
                let factor = self.cost_function.cost_factor(node, edge_id);
                if factor.is_infinite() {
                    continue;
                }
                let candidate = distance[from] + factor * self.graph.edge_length(edge_id);
                if candidate < distance[to] {
                    distance[to] = candidate;
                    predecessor_edge[to] = edge_id;
                    predecessor_node[to] = node;
                    seq += 1;
                    queue.push(Reverse(Queued {
                        cost: candidate,
                        seq,
                        node: to as u32,
                    }));
                }
            }
        }

        debug!(
            "No route {start_node_id} -> {end_node_id}: settled {settled_count} nodes in {:.1?}",
            started.elapsed()
        );
        Ok(None)
    }

    fn rebuild(
        &self,
        start_node_id: u32,
        end_node_id: u32,
        predecessor_edge: &[u32],
        predecessor_node: &[u32],
    ) -> Result<Route> {
        let mut edges = Vec::new();
        let mut node = end_node_id;
        while node != start_node_id {
            let edge_id = predecessor_edge[node as usize];
            let from = predecessor_node[node as usize];
            edges.push(Edge::of(self.graph, edge_id, from, node));
            node = from;
        }
        edges.reverse();
        Ok(SingleRoute::new(edges)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{Attribute, AttributeSet, EdgeSpec, GraphWriter};
    use crate::projection::PointCh;
    use crate::routing::cost::UniformCost;

    fn p(de: f64, dn: f64) -> PointCh {
        PointCh::new(2_600_000.0 + de, 1_200_000.0 + dn)
    }

    /// 0 -100- 1 -50- 2, one way only.
    fn chain(with_second_edge: bool) -> Graph {
        let mut w = GraphWriter::new();
        w.add_attribute_set(AttributeSet::EMPTY).unwrap();
        let n0 = w.add_node(p(0.0, 0.0));
        let n1 = w.add_node(p(100.0, 0.0));
        let n2 = w.add_node(p(150.0, 0.0));
        w.add_edge(n0, EdgeSpec::new(n1, 100.0)).unwrap();
        if with_second_edge {
            w.add_edge(n1, EdgeSpec::new(n2, 50.0)).unwrap();
        }
        w.build().unwrap()
    }

    /// Small grid with a short primary road and a longer cycleway detour.
    ///
    /// ```text
    ///   0 --40-- 1 --40-- 2       (primary)
    ///   |                 |
    ///   30               30       (cycleway)
    ///   |                 |
    ///   3 ------60------- 4       (cycleway)
    /// ```
    fn detour_graph() -> Graph {
        let mut w = GraphWriter::new();
        let primary = w
            .add_attribute_set(AttributeSet::of(&[Attribute::HighwayPrimary]))
            .unwrap();
        let cycleway = w
            .add_attribute_set(AttributeSet::of(&[Attribute::HighwayCycleway]))
            .unwrap();
        let n0 = w.add_node(p(0.0, 30.0));
        let n1 = w.add_node(p(40.0, 30.0));
        let n2 = w.add_node(p(80.0, 30.0));
        let n3 = w.add_node(p(0.0, 0.0));
        let n4 = w.add_node(p(80.0, 0.0));
        let mut link = |a: u32, b: u32, length: f64, set: u16| {
            w.add_edge(a, EdgeSpec::new(b, length).with_attribute_set(set))
                .unwrap();
        };
        link(n0, n1, 40.0, primary);
        link(n1, n0, 40.0, primary);
        link(n1, n2, 40.0, primary);
        link(n2, n1, 40.0, primary);
        link(n0, n3, 30.0, cycleway);
        link(n3, n0, 30.0, cycleway);
        link(n3, n4, 60.0, cycleway);
        link(n4, n3, 60.0, cycleway);
        link(n2, n4, 30.0, cycleway);
        link(n4, n2, 30.0, cycleway);
        w.build().unwrap()
    }

    fn node_ids(route: &Route) -> Vec<u32> {
        let edges = route.edges();
        std::iter::once(edges[0].from_node_id)
            .chain(edges.iter().map(|e| e.to_node_id))
            .collect()
    }

    #[test]
    fn test_three_node_chain() {
        let graph = chain(true);
        let computer = RouteComputer::new(&graph, UniformCost);
        let route = computer.best_route_between(0, 2).unwrap().unwrap();

        assert_eq!(route.length(), 150.0);
        assert_eq!(route.points().len(), 3);
        assert_eq!(route.node_closest_to(149.0), 2);
        assert_eq!(node_ids(&route), vec![0, 1, 2]);
    }

    #[test]
    fn test_unreachable() {
        let graph = chain(false);
        let computer = RouteComputer::new(&graph, UniformCost);
        assert!(computer.best_route_between(0, 2).unwrap().is_none());
        // edges are directed
        assert!(computer.best_route_between(1, 0).unwrap().is_none());
    }

    #[test]
    fn test_invalid_endpoints() {
        let graph = chain(true);
        let computer = RouteComputer::new(&graph, UniformCost);
        assert!(matches!(
            computer.best_route_between(1, 1),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            computer.best_route_between(0, 9),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_shortest_path_with_uniform_cost() {
        let graph = detour_graph();
        let computer = RouteComputer::new(&graph, UniformCost);

        let route = computer.best_route_between(0, 2).unwrap().unwrap();
        assert_eq!(node_ids(&route), vec![0, 1, 2]);
        assert_eq!(route.length(), 80.0);

        let route = computer.best_route_between(1, 3).unwrap().unwrap();
        assert_eq!(node_ids(&route), vec![1, 0, 3]);
        assert_eq!(route.length(), 70.0);
    }

    #[test]
    fn test_penalty_reroutes_but_reports_real_length() {
        let graph = detour_graph();
        let avoid_primary = |_node: u32, edge: u32| {
            if graph.edge_attributes(edge).contains(Attribute::HighwayPrimary) {
                10.0
            } else {
                1.0
            }
        };
        let computer = RouteComputer::new(&graph, avoid_primary);

        let route = computer.best_route_between(0, 2).unwrap().unwrap();
        assert_eq!(node_ids(&route), vec![0, 3, 4, 2]);
        assert_eq!(route.length(), 120.0);
    }

    #[test]
    fn test_forbidden_edges_are_never_used() {
        let graph = detour_graph();
        let forbid_cycleways = |_node: u32, edge: u32| {
            if graph.edge_attributes(edge).contains(Attribute::HighwayCycleway) {
                f64::INFINITY
            } else {
                1.0
            }
        };
        let computer = RouteComputer::new(&graph, forbid_cycleways);
        assert!(computer.best_route_between(0, 3).unwrap().is_none());
        assert_eq!(computer.best_route_between(0, 2).unwrap().unwrap().length(), 80.0);
    }

    #[test]
    fn test_route_edges_follow_requested_orientation() {
        let graph = detour_graph();
        let computer = RouteComputer::new(&graph, UniformCost);
        let route = computer.best_route_between(2, 0).unwrap().unwrap();
        let edges = route.edges();
        assert_eq!(edges[0].from_point, graph.node_point(2));
        assert_eq!(edges[1].to_point, graph.node_point(0));
    }
}
