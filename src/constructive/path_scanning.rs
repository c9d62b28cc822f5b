//! Greedy path-scanning construction.
//!
//! Builds routes one at a time: starting from the depot, always perform the
//! unserved service that is cheapest to reach and serve from the current
//! position, as long as it still fits in the vehicle. When nothing fits,
//! return to the depot and open a new route.
//!
//! # Candidate cost
//!
//! ```text
//! node v      : d(p, v) + s
//! arc (u, v)  : d(p, u) + c(u, v) + s
//! edge {u, v} : min(d(p, u), d(p, v)) + c(u, v) + s
//! ```
//!
//! where `p` is the current position and `s` the service cost. Equal costs
//! are broken by the lowest service id, and an edge whose two endpoints are
//! equally close is entered at `u`.
//!
//! # Complexity
//!
//! O(m²) distance lookups for m required services. There is no lookahead and
//! no backtracking: once assigned, a service is never reconsidered.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::distance::ShortestPaths;
use crate::error::{Infeasibility, Infeasible};
use crate::models::{
    Cost, Demand, Graph, Route, Service, ServiceId, ServiceKind, Solution, Stop, VertexId,
};

/// The next service a route could perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    id: ServiceId,
    stop: Stop,
    exit: VertexId,
    /// Deadhead to the entry vertex plus traversal of the serviced link.
    travel: Cost,
    service_cost: Cost,
    /// `travel + service_cost`, checked when the candidate is evaluated.
    incremental_cost: Cost,
    demand: Demand,
}

/// Greedy constructor of CARP routes over a graph and its distance table.
///
/// The set of unserved services belongs to a single [`RouteBuilder::build`]
/// call, so a builder can be reused and always yields the same routes.
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::{GraphBuilder, Requirement};
/// use u_arc_routing::distance::ShortestPaths;
/// use u_arc_routing::constructive::RouteBuilder;
///
/// let mut builder = GraphBuilder::new();
/// builder.add_edge(1, 2, 3, None);
/// builder.add_edge(2, 3, 2, Some(Requirement::new(4, 1)));
/// builder.require_vertex(2, Requirement::new(5, 2)).unwrap();
/// builder.set_depot(1).set_capacity(10);
/// let graph = builder.build().unwrap();
///
/// let paths = ShortestPaths::compute(&graph);
/// let solution = RouteBuilder::new(&graph, &paths).build().unwrap();
/// assert_eq!(solution.num_routes(), 1);
/// assert_eq!(solution.num_served(), 2);
/// // 1 -> 2 (3) + serve node (2) + edge 2-3 (2 + 1) + 3 -> 1 (5)
/// assert_eq!(solution.total_cost(), 13);
/// ```
pub struct RouteBuilder<'a> {
    graph: &'a Graph,
    paths: &'a ShortestPaths,
}

impl<'a> RouteBuilder<'a> {
    /// Creates a builder for the given graph and its distance table.
    pub fn new(graph: &'a Graph, paths: &'a ShortestPaths) -> Self {
        Self { graph, paths }
    }

    /// Builds routes until every required service is served.
    ///
    /// # Errors
    ///
    /// Returns [`Infeasible`] with the routes built so far when a route
    /// cannot return to the depot, or when some services cannot be reached
    /// from the depot at all.
    pub fn build(&self) -> Result<Solution, Infeasible> {
        let depot = self.graph.depot();
        let mut unserved: BTreeSet<ServiceId> =
            self.graph.services().iter().map(Service::id).collect();
        let mut solution = Solution::new();
        let mut reasons = Vec::new();

        while !unserved.is_empty() {
            let route_id = solution.num_routes() + 1;
            let mut route = Route::new(route_id);
            let mut position = depot;
            let mut unreachable = BTreeSet::new();

            while let Some(next) =
                self.select(position, route.demand(), &unserved, &mut unreachable)
            {
                route.push_service(next.stop, next.travel, next.service_cost, next.demand);
                unserved.remove(&next.id);
                position = next.exit;
            }

            if route.is_empty() {
                // Every service fits an empty vehicle, so nothing left can be
                // reached from the depot.
                let services: Vec<ServiceId> = unserved.iter().copied().collect();
                warn!(?services, "services unreachable from the depot");
                reasons.push(Infeasibility::UnreachableServices { services });
                break;
            }

            match self.paths.distance(position, depot) {
                Some(back) => route.close(back),
                None => {
                    warn!(route = route_id, from = position, "depot unreachable");
                    reasons.push(Infeasibility::DepotUnreachable {
                        route_id,
                        from: position,
                    });
                }
            }

            debug!(
                route = route_id,
                services = route.num_services(),
                demand = route.demand(),
                cost = route.cost(),
                "route finished"
            );
            solution.add_route(route);
        }

        if reasons.is_empty() {
            info!(
                routes = solution.num_routes(),
                cost = solution.total_cost(),
                "construction finished"
            );
            Ok(solution)
        } else {
            Err(Infeasible {
                partial: solution,
                reasons,
            })
        }
    }

    /// Cheapest unserved service that fits, or `None` when the route is done.
    ///
    /// Services found unreachable are remembered in `unreachable` and not
    /// evaluated again for this route.
    fn select(
        &self,
        position: VertexId,
        load: Demand,
        unserved: &BTreeSet<ServiceId>,
        unreachable: &mut BTreeSet<ServiceId>,
    ) -> Option<Candidate> {
        let capacity = self.graph.capacity();
        let mut best: Option<Candidate> = None;

        for &id in unserved {
            if unreachable.contains(&id) {
                continue;
            }
            let Some(service) = self.graph.service(id) else {
                continue;
            };
            // `load <= capacity` holds for every route under construction.
            if service.demand() > capacity.saturating_sub(load) {
                continue;
            }
            let Some(candidate) = self.evaluate(position, service) else {
                unreachable.insert(id);
                continue;
            };
            // Ids are visited in ascending order; strict comparison keeps the
            // lowest id among equal costs.
            if best.map_or(true, |b| candidate.incremental_cost < b.incremental_cost) {
                best = Some(candidate);
            }
        }

        best
    }

    /// Cost of serving `service` next from `position`.
    ///
    /// `None` if unreachable, or if the cost does not fit in [`Cost`].
    fn evaluate(&self, position: VertexId, service: &Service) -> Option<Candidate> {
        let id = service.id();
        let (stop, exit, travel) = match *service.kind() {
            ServiceKind::Node { vertex } => {
                let d = self.paths.distance(position, vertex)?;
                (Stop::NodeService { id, vertex }, vertex, d)
            }
            ServiceKind::Arc {
                tail,
                head,
                traversal_cost,
                ..
            } => {
                let d = self.paths.distance(position, tail)?;
                let stop = Stop::ArcService {
                    id,
                    from: tail,
                    to: head,
                };
                (stop, head, d.checked_add(traversal_cost)?)
            }
            ServiceKind::Edge {
                u,
                v,
                traversal_cost,
                ..
            } => {
                let to_u = self.paths.distance(position, u);
                let to_v = self.paths.distance(position, v);
                let (from, to, d) = match (to_u, to_v) {
                    (Some(du), Some(dv)) if dv < du => (v, u, dv),
                    (Some(du), _) => (u, v, du),
                    (None, Some(dv)) => (v, u, dv),
                    (None, None) => return None,
                };
                (Stop::EdgeService { id, from, to }, to, d.checked_add(traversal_cost)?)
            }
        };

        let service_cost = service.service_cost();
        Some(Candidate {
            id,
            stop,
            exit,
            travel,
            service_cost,
            incremental_cost: travel.checked_add(service_cost)?,
            demand: service.demand(),
        })
    }
}
