//! Solution type.

use serde::{Deserialize, Serialize};

use super::{Cost, Route, ServiceId};

/// Routes produced by a construction, in the order they were built.
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::{Route, Solution};
///
/// let mut route = Route::new(1);
/// route.close(0);
///
/// let mut sol = Solution::new();
/// sol.add_route(route);
/// assert_eq!(sol.num_routes(), 1);
/// assert_eq!(sol.total_cost(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    routes: Vec<Route>,
    total_cost: Cost,
}

impl Solution {
    /// Creates an empty solution.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            total_cost: 0,
        }
    }

    /// Appends a finished route and adds its cost to the total, saturating
    /// at [`Cost::MAX`].
    pub fn add_route(&mut self, route: Route) {
        self.total_cost = self.total_cost.saturating_add(route.cost());
        self.routes.push(route);
    }

    /// Routes in construction order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Number of routes (vehicles used).
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Sum of route costs.
    pub fn total_cost(&self) -> Cost {
        self.total_cost
    }

    /// Total number of services performed across all routes.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(Route::num_services).sum()
    }

    /// All served ids in route order.
    pub fn service_ids(&self) -> Vec<ServiceId> {
        self.routes.iter().flat_map(Route::service_ids).collect()
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stop;

    #[test]
    fn test_solution_empty() {
        let sol = Solution::new();
        assert_eq!(sol.num_routes(), 0);
        assert_eq!(sol.total_cost(), 0);
        assert_eq!(sol.num_served(), 0);
    }

    #[test]
    fn test_solution_with_routes() {
        let mut r1 = Route::new(1);
        r1.push_service(
            Stop::NodeService {
                id: ServiceId::new(1),
                vertex: 2,
            },
            3,
            2,
            5,
        );
        r1.close(3);

        let mut r2 = Route::new(2);
        r2.push_service(
            Stop::EdgeService {
                id: ServiceId::new(2),
                from: 3,
                to: 4,
            },
            9,
            1,
            6,
        );
        r2.close(9);

        let mut sol = Solution::new();
        sol.add_route(r1);
        sol.add_route(r2);

        assert_eq!(sol.num_routes(), 2);
        assert_eq!(sol.num_served(), 2);
        assert_eq!(sol.total_cost(), 8 + 19);
        assert_eq!(sol.service_ids(), vec![ServiceId::new(1), ServiceId::new(2)]);
    }

    #[test]
    fn test_solution_default() {
        assert_eq!(Solution::default(), Solution::new());
    }
}
