//! Constructive heuristics for building initial CARP solutions.
//!
//! - [`RouteBuilder`] — greedy path scanning over the shortest-path table, O(m²)
//! - [`solve`] — computes the table and runs the builder in one call

mod path_scanning;

pub use path_scanning::RouteBuilder;

use crate::distance::ShortestPaths;
use crate::error::Infeasible;
use crate::models::{Graph, Solution};

/// Computes the shortest-path table for `graph` and builds routes on it.
///
/// # Errors
///
/// See [`RouteBuilder::build`].
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::{GraphBuilder, Requirement};
/// use u_arc_routing::constructive::solve;
///
/// let mut builder = GraphBuilder::new();
/// builder.add_edge(1, 2, 4, Some(Requirement::new(1, 1)));
/// builder.set_depot(1).set_capacity(5);
/// let graph = builder.build().unwrap();
///
/// let solution = solve(&graph).unwrap();
/// assert_eq!(solution.total_cost(), 4 + 1 + 4);
/// ```
pub fn solve(graph: &Graph) -> Result<Solution, Infeasible> {
    let paths = ShortestPaths::compute(graph);
    RouteBuilder::new(graph, &paths).build()
}
