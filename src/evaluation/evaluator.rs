//! Solution evaluator that recomputes costs and checks coverage and capacity.

use std::collections::BTreeMap;

use crate::distance::ShortestPaths;
use crate::models::{Cost, Demand, Graph, Route, ServiceId, ServiceKind, Solution, Stop, VertexId};

/// A type of invariant violation in a route or solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationType {
    /// Route demand above vehicle capacity.
    CapacityExceeded {
        /// Route id.
        route_id: usize,
        /// Demand carried by the route, summed without overflow.
        demand: u64,
        /// Vehicle capacity.
        capacity: Demand,
    },
    /// Reported route cost differs from the one recomputed from its stops.
    CostMismatch {
        /// Route id.
        route_id: usize,
        /// Cost stored on the route.
        reported: Cost,
        /// Cost recomputed from the distance table, `None` if not walkable.
        recomputed: Option<Cost>,
    },
    /// Solution total differs from the sum of route costs.
    TotalCostMismatch {
        /// Total stored on the solution.
        reported: Cost,
        /// Sum of route costs.
        recomputed: Cost,
    },
    /// A service is performed more than once.
    DuplicateService {
        /// The service.
        service: ServiceId,
    },
    /// A required service is never performed.
    MissingService {
        /// The service.
        service: ServiceId,
    },
    /// A stop refers to a service the graph does not have, or performs it
    /// in a way that does not match the service.
    UnknownService {
        /// Route id.
        route_id: usize,
        /// The offending service id.
        service: ServiceId,
    },
    /// Route does not open and close with a depot visit.
    MalformedRoute {
        /// Route id.
        route_id: usize,
    },
}

/// An invariant violation in a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// Re-derives route costs from stop sequences and checks solution invariants.
///
/// Costs are recomputed independently of the builder, from the stops alone:
/// deadhead along shortest paths between consecutive stops, plus traversal
/// and service cost of every performed service.
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::{GraphBuilder, Requirement};
/// use u_arc_routing::distance::ShortestPaths;
/// use u_arc_routing::constructive::RouteBuilder;
/// use u_arc_routing::evaluation::SolutionEvaluator;
///
/// let mut builder = GraphBuilder::new();
/// builder.add_edge(1, 2, 3, Some(Requirement::new(2, 1)));
/// builder.add_edge(2, 3, 1, Some(Requirement::new(2, 1)));
/// builder.set_depot(1).set_capacity(3);
/// let graph = builder.build().unwrap();
/// let paths = ShortestPaths::compute(&graph);
///
/// let solution = RouteBuilder::new(&graph, &paths).build().unwrap();
/// let evaluator = SolutionEvaluator::new(&graph, &paths);
/// assert!(evaluator.evaluate(&solution).is_empty());
/// ```
pub struct SolutionEvaluator<'a> {
    graph: &'a Graph,
    paths: &'a ShortestPaths,
}

impl<'a> SolutionEvaluator<'a> {
    /// Creates a new evaluator for the given problem data.
    pub fn new(graph: &'a Graph, paths: &'a ShortestPaths) -> Self {
        Self { graph, paths }
    }

    /// Recomputes the cost of a route from its stops.
    ///
    /// Returns `None` if some leg is unreachable, a stop does not match a
    /// service of the graph, or the total does not fit in [`Cost`]. An open
    /// route (no closing depot visit) is costed without a return leg.
    pub fn route_cost(&self, route: &Route) -> Option<Cost> {
        let depot = self.graph.depot();
        let mut position = depot;
        let mut cost: Cost = 0;

        for stop in route.stops() {
            match *stop {
                Stop::DepotVisit => {
                    cost = cost.checked_add(self.paths.distance(position, depot)?)?;
                    position = depot;
                }
                _ => {
                    let (entry, exit) = self.check_stop(stop)?;
                    let id = stop.service_id()?;
                    let service = self.graph.service(id)?;
                    cost = cost
                        .checked_add(self.paths.distance(position, entry)?)?
                        .checked_add(service.traversal_cost())?
                        .checked_add(service.service_cost())?;
                    position = exit;
                }
            }
        }

        Some(cost)
    }

    /// Expands a route into the vertex walk it performs, depot to depot.
    ///
    /// Returns `None` under the same conditions as [`Self::route_cost`].
    pub fn expand_route(&self, route: &Route) -> Option<Vec<VertexId>> {
        let depot = self.graph.depot();
        let mut walk = vec![depot];
        let mut position = depot;

        let append = |walk: &mut Vec<VertexId>, from: VertexId, to: VertexId| {
            let path = self.paths.path(from, to)?;
            walk.extend(path.into_iter().skip(1));
            Some(())
        };

        for stop in route.stops().iter().skip(1) {
            match stop.traversal() {
                None => {
                    append(&mut walk, position, depot)?;
                    position = depot;
                }
                Some(_) => {
                    let (entry, exit) = self.check_stop(stop)?;
                    append(&mut walk, position, entry)?;
                    if exit != entry {
                        walk.push(exit);
                    }
                    position = exit;
                }
            }
        }

        Some(walk)
    }

    /// Evaluates an entire solution.
    ///
    /// An empty result means every service is performed exactly once, no
    /// route exceeds the capacity, and every reported cost matches.
    pub fn evaluate(&self, solution: &Solution) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut seen: BTreeMap<ServiceId, usize> = BTreeMap::new();
        let capacity = self.graph.capacity();

        for route in solution.routes() {
            let route_id = route.id();
            let stops = route.stops();

            let opens = stops.first().is_some_and(Stop::is_depot);
            let closes = stops.len() > 1 && stops.last().is_some_and(Stop::is_depot);
            let inner_depot = stops
                .iter()
                .skip(1)
                .take(stops.len().saturating_sub(2))
                .any(Stop::is_depot);
            if !opens || (route.is_closed() && !closes) || inner_depot {
                violations.push(Violation::new(ViolationType::MalformedRoute { route_id }));
            }

            let mut demand: u64 = 0;
            for stop in stops {
                let Some(id) = stop.service_id() else {
                    continue;
                };
                *seen.entry(id).or_default() += 1;
                match self.graph.service(id) {
                    Some(service) if self.check_stop(stop).is_some() => {
                        demand += u64::from(service.demand());
                    }
                    _ => violations.push(Violation::new(ViolationType::UnknownService {
                        route_id,
                        service: id,
                    })),
                }
            }

            let demand = demand.max(u64::from(route.demand()));
            if demand > u64::from(capacity) {
                violations.push(Violation::new(ViolationType::CapacityExceeded {
                    route_id,
                    demand,
                    capacity,
                }));
            }

            let recomputed = self.route_cost(route);
            if recomputed != Some(route.cost()) {
                violations.push(Violation::new(ViolationType::CostMismatch {
                    route_id,
                    reported: route.cost(),
                    recomputed,
                }));
            }
        }

        for service in self.graph.services() {
            match seen.get(&service.id()) {
                None => violations.push(Violation::new(ViolationType::MissingService {
                    service: service.id(),
                })),
                Some(&n) if n > 1 => {
                    violations.push(Violation::new(ViolationType::DuplicateService {
                        service: service.id(),
                    }))
                }
                Some(_) => {}
            }
        }

        let sum = solution
            .routes()
            .iter()
            .map(Route::cost)
            .fold(0, Cost::saturating_add);
        if sum != solution.total_cost() {
            violations.push(Violation::new(ViolationType::TotalCostMismatch {
                reported: solution.total_cost(),
                recomputed: sum,
            }));
        }

        violations
    }

    /// Entry and exit vertex of a service stop, if it matches the graph.
    fn check_stop(&self, stop: &Stop) -> Option<(VertexId, VertexId)> {
        let id = stop.service_id()?;
        let service = self.graph.service(id)?;
        let (from, to) = stop.traversal()?;
        let valid = match (*stop, *service.kind()) {
            (Stop::NodeService { vertex, .. }, ServiceKind::Node { vertex: v }) => vertex == v,
            (Stop::EdgeService { .. }, ServiceKind::Edge { u, v, .. }) => {
                (from, to) == (u, v) || (from, to) == (v, u)
            }
            (Stop::ArcService { .. }, ServiceKind::Arc { tail, head, .. }) => {
                (from, to) == (tail, head)
            }
            _ => false,
        };
        valid.then_some((from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructive::RouteBuilder;
    use crate::models::{GraphBuilder, Requirement};

    fn setup() -> Graph {
        let mut b = GraphBuilder::new();
        b.add_edge(1, 2, 3, None);
        b.add_edge(2, 3, 2, None);
        b.add_edge(3, 4, 4, Some(Requirement::new(6, 1)));
        b.add_edge(1, 4, 9, None);
        b.require_vertex(2, Requirement::new(5, 2)).expect("first time");
        b.set_depot(1).set_capacity(10);
        b.build().expect("valid")
    }

    fn node_stop() -> Stop {
        Stop::NodeService {
            id: ServiceId::new(1),
            vertex: 2,
        }
    }

    fn edge_stop() -> Stop {
        Stop::EdgeService {
            id: ServiceId::new(2),
            from: 3,
            to: 4,
        }
    }

    #[test]
    fn test_built_solution_is_clean() {
        let graph = setup();
        let paths = ShortestPaths::compute(&graph);
        let sol = RouteBuilder::new(&graph, &paths).build().expect("feasible");
        let eval = SolutionEvaluator::new(&graph, &paths);
        assert!(eval.evaluate(&sol).is_empty());
    }

    #[test]
    fn test_route_cost() {
        let graph = setup();
        let paths = ShortestPaths::compute(&graph);
        let eval = SolutionEvaluator::new(&graph, &paths);

        let mut route = Route::new(1);
        route.push_service(edge_stop(), 9, 1, 6);
        route.close(9);
        assert_eq!(eval.route_cost(&route), Some(19));

        // Reverse direction: 1 -> 4 (9) + edge (4) + 1 + 3 -> 1 (5)
        let mut reversed = Route::new(1);
        reversed.push_service(
            Stop::EdgeService {
                id: ServiceId::new(2),
                from: 4,
                to: 3,
            },
            13,
            1,
            6,
        );
        reversed.close(5);
        assert_eq!(eval.route_cost(&reversed), Some(19));
    }

    #[test]
    fn test_expand_route() {
        let graph = setup();
        let paths = ShortestPaths::compute(&graph);
        let eval = SolutionEvaluator::new(&graph, &paths);

        let mut route = Route::new(1);
        route.push_service(node_stop(), 3, 2, 5);
        route.close(3);
        assert_eq!(eval.expand_route(&route), Some(vec![1, 2, 1]));

        let mut route = Route::new(2);
        route.push_service(edge_stop(), 9, 1, 6);
        route.close(9);
        let walk = eval.expand_route(&route).expect("walkable");
        assert_eq!(&walk[..4], &[1, 2, 3, 4]);
        assert_eq!(walk.last(), Some(&1));
    }

    #[test]
    fn test_capacity_and_cost_violations() {
        let graph = setup();
        let paths = ShortestPaths::compute(&graph);
        let eval = SolutionEvaluator::new(&graph, &paths);

        let mut route = Route::new(1);
        route.push_service(node_stop(), 3, 2, 5);
        route.push_service(edge_stop(), 5, 1, 6);
        route.close(1);
        let mut sol = Solution::new();
        sol.add_route(route);

        let violations = eval.evaluate(&sol);
        assert!(violations.iter().any(|v| matches!(
            v.kind,
            ViolationType::CapacityExceeded {
                route_id: 1,
                demand: 11,
                capacity: 10
            }
        )));
        assert!(violations.iter().any(|v| matches!(
            v.kind,
            ViolationType::CostMismatch {
                route_id: 1,
                recomputed: Some(21),
                ..
            }
        )));
    }

    #[test]
    fn test_capacity_check_does_not_wrap() {
        let mut b = GraphBuilder::new();
        b.add_edge(1, 2, 1, None);
        b.add_edge(1, 3, 1, None);
        b.require_vertex(2, Requirement::new(3_000_000_000, 0))
            .expect("first time");
        b.require_vertex(3, Requirement::new(3_000_000_000, 0))
            .expect("first time");
        b.set_depot(1).set_capacity(4_000_000_000);
        let graph = b.build().expect("valid");
        let paths = ShortestPaths::compute(&graph);
        let eval = SolutionEvaluator::new(&graph, &paths);

        let mut route = Route::new(1);
        route.push_service(node_stop(), 1, 0, 3_000_000_000);
        route.push_service(
            Stop::NodeService {
                id: ServiceId::new(2),
                vertex: 3,
            },
            2,
            0,
            3_000_000_000,
        );
        route.close(1);
        let mut sol = Solution::new();
        sol.add_route(route);

        let violations = eval.evaluate(&sol);
        assert!(violations.contains(&Violation::new(ViolationType::CapacityExceeded {
            route_id: 1,
            demand: 6_000_000_000,
            capacity: 4_000_000_000,
        })));
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_route_cost_overflow_is_none() {
        let mut b = GraphBuilder::new();
        b.add_edge(1, 2, Cost::MAX, Some(Requirement::new(1, 1)));
        b.set_depot(1).set_capacity(1);
        let graph = b.build().expect("valid");
        let paths = ShortestPaths::compute(&graph);
        let eval = SolutionEvaluator::new(&graph, &paths);

        let mut route = Route::new(1);
        route.push_service(
            Stop::EdgeService {
                id: ServiceId::new(1),
                from: 1,
                to: 2,
            },
            Cost::MAX,
            1,
            1,
        );
        route.close(Cost::MAX);
        assert_eq!(eval.route_cost(&route), None);
    }

    #[test]
    fn test_missing_and_duplicate() {
        let graph = setup();
        let paths = ShortestPaths::compute(&graph);
        let eval = SolutionEvaluator::new(&graph, &paths);

        let mut sol = Solution::new();
        for id in 1..=2 {
            let mut route = Route::new(id);
            route.push_service(node_stop(), 3, 2, 5);
            route.close(3);
            sol.add_route(route);
        }

        let violations = eval.evaluate(&sol);
        assert!(violations.contains(&Violation::new(ViolationType::DuplicateService {
            service: ServiceId::new(1)
        })));
        assert!(violations.contains(&Violation::new(ViolationType::MissingService {
            service: ServiceId::new(2)
        })));
    }

    #[test]
    fn test_unknown_service() {
        let graph = setup();
        let paths = ShortestPaths::compute(&graph);
        let eval = SolutionEvaluator::new(&graph, &paths);

        let mut route = Route::new(1);
        // Service 1 is a node, not an arc.
        route.push_service(
            Stop::ArcService {
                id: ServiceId::new(1),
                from: 1,
                to: 2,
            },
            3,
            2,
            5,
        );
        route.close(3);
        assert_eq!(eval.route_cost(&route), None);

        let mut sol = Solution::new();
        sol.add_route(route);
        assert!(eval.evaluate(&sol).iter().any(|v| matches!(
            v.kind,
            ViolationType::UnknownService { route_id: 1, .. }
        )));
    }
}
