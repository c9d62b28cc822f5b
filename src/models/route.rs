//! Route and stop types.

use serde::{Deserialize, Serialize};

use super::{Cost, Demand, ServiceId, VertexId};

/// A single token of a route: a depot visit or a performed service.
///
/// For edge and arc services `(from, to)` is the direction actually
/// traversed while servicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stop {
    /// Departure from or return to the depot.
    DepotVisit,
    /// Service of a required vertex.
    NodeService { id: ServiceId, vertex: VertexId },
    /// Service of a required edge.
    EdgeService {
        id: ServiceId,
        from: VertexId,
        to: VertexId,
    },
    /// Service of a required arc.
    ArcService {
        id: ServiceId,
        from: VertexId,
        to: VertexId,
    },
}

impl Stop {
    /// Service performed at this stop, `None` for depot visits.
    pub fn service_id(&self) -> Option<ServiceId> {
        match *self {
            Stop::DepotVisit => None,
            Stop::NodeService { id, .. }
            | Stop::EdgeService { id, .. }
            | Stop::ArcService { id, .. } => Some(id),
        }
    }

    /// Returns `true` for depot visits.
    pub fn is_depot(&self) -> bool {
        matches!(self, Stop::DepotVisit)
    }

    /// Vertex where the stop is entered and vertex where it is left.
    ///
    /// Depot visits have no vertex of their own and return `None`.
    pub fn traversal(&self) -> Option<(VertexId, VertexId)> {
        match *self {
            Stop::DepotVisit => None,
            Stop::NodeService { vertex, .. } => Some((vertex, vertex)),
            Stop::EdgeService { from, to, .. } | Stop::ArcService { from, to, .. } => {
                Some((from, to))
            }
        }
    }
}

/// A closed walk from the depot that performs a sequence of services.
///
/// A route opens with a [`Stop::DepotVisit`] and, once closed, ends with
/// another one. Costs are split into deadhead and traversal travel on one
/// side and service cost on the other.
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::{Route, ServiceId, Stop};
///
/// let mut route = Route::new(1);
/// route.push_service(
///     Stop::NodeService { id: ServiceId::new(1), vertex: 2 },
///     3, // travel to the vertex
///     2, // service cost
///     5, // demand
/// );
/// route.close(3);
///
/// assert_eq!(route.cost(), 8);
/// assert_eq!(route.demand(), 5);
/// assert_eq!(route.stops().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    id: usize,
    stops: Vec<Stop>,
    demand: Demand,
    travel_cost: Cost,
    service_cost: Cost,
    closed: bool,
}

impl Route {
    /// Starts a route at the depot.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            stops: vec![Stop::DepotVisit],
            demand: 0,
            travel_cost: 0,
            service_cost: 0,
            closed: false,
        }
    }

    /// Appends a service stop.
    ///
    /// `travel` covers the deadhead from the previous position plus the
    /// traversal of the serviced link, if any. Totals saturate at their
    /// type's maximum.
    pub fn push_service(&mut self, stop: Stop, travel: Cost, service_cost: Cost, demand: Demand) {
        debug_assert!(!self.closed, "route {} is already closed", self.id);
        self.stops.push(stop);
        self.travel_cost = self.travel_cost.saturating_add(travel);
        self.service_cost = self.service_cost.saturating_add(service_cost);
        self.demand = self.demand.saturating_add(demand);
    }

    /// Returns to the depot at the given travel cost.
    pub fn close(&mut self, return_cost: Cost) {
        self.travel_cost = self.travel_cost.saturating_add(return_cost);
        self.stops.push(Stop::DepotVisit);
        self.closed = true;
    }

    /// 1-based route id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Ordered stops, depot visits included.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Demand collected by this route.
    pub fn demand(&self) -> Demand {
        self.demand
    }

    /// Deadhead and traversal cost.
    pub fn travel_cost(&self) -> Cost {
        self.travel_cost
    }

    /// Sum of the service costs.
    pub fn service_cost(&self) -> Cost {
        self.service_cost
    }

    /// Total cost: travel plus service, saturating at [`Cost::MAX`].
    pub fn cost(&self) -> Cost {
        self.travel_cost.saturating_add(self.service_cost)
    }

    /// Returns `true` once the route has returned to the depot.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of services performed.
    pub fn num_services(&self) -> usize {
        self.stops.iter().filter(|s| !s.is_depot()).count()
    }

    /// Returns `true` if no service is performed.
    pub fn is_empty(&self) -> bool {
        self.num_services() == 0
    }

    /// Service ids in visiting order.
    pub fn service_ids(&self) -> Vec<ServiceId> {
        self.stops.iter().filter_map(Stop::service_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_new() {
        let r = Route::new(3);
        assert_eq!(r.id(), 3);
        assert_eq!(r.stops(), &[Stop::DepotVisit]);
        assert!(r.is_empty());
        assert!(!r.is_closed());
        assert_eq!(r.cost(), 0);
    }

    #[test]
    fn test_route_accumulates() {
        let mut r = Route::new(1);
        r.push_service(
            Stop::EdgeService {
                id: ServiceId::new(4),
                from: 3,
                to: 4,
            },
            9,
            1,
            6,
        );
        r.push_service(
            Stop::NodeService {
                id: ServiceId::new(1),
                vertex: 4,
            },
            0,
            2,
            3,
        );
        assert_eq!(r.travel_cost(), 9);
        assert_eq!(r.service_cost(), 3);
        assert_eq!(r.demand(), 9);
        assert_eq!(r.service_ids(), vec![ServiceId::new(4), ServiceId::new(1)]);

        r.close(9);
        assert!(r.is_closed());
        assert_eq!(r.cost(), 21);
        assert_eq!(r.num_services(), 2);
        assert_eq!(r.stops().len(), 4);
        assert!(r.stops()[3].is_depot());
    }

    #[test]
    fn test_totals_saturate() {
        let mut r = Route::new(1);
        for id in 1..=2 {
            r.push_service(
                Stop::NodeService {
                    id: ServiceId::new(id),
                    vertex: 2,
                },
                Cost::MAX - 1,
                1,
                3_000_000_000,
            );
        }
        assert_eq!(r.demand(), Demand::MAX);
        assert_eq!(r.travel_cost(), Cost::MAX);
        assert_eq!(r.cost(), Cost::MAX);
        r.close(1);
        assert_eq!(r.travel_cost(), Cost::MAX);
    }

    #[test]
    fn test_stop_traversal() {
        let s = Stop::ArcService {
            id: ServiceId::new(2),
            from: 5,
            to: 6,
        };
        assert_eq!(s.traversal(), Some((5, 6)));
        assert_eq!(s.service_id(), Some(ServiceId::new(2)));
        assert_eq!(Stop::DepotVisit.traversal(), None);
        assert_eq!(Stop::DepotVisit.service_id(), None);
    }
}
