//! # u-arc-routing
//!
//! Capacitated arc routing (CARP) on mixed graphs: required services on
//! vertices, edges and arcs are served by capacity-limited routes that start
//! and end at a depot.
//!
//! ## Modules
//!
//! - [`models`] — Domain model types (Graph, Service, Route, Stop, Solution)
//! - [`distance`] — All-pairs shortest-path table with path reconstruction
//! - [`constructive`] — Greedy path-scanning route construction
//! - [`evaluation`] — Independent cost recomputation and invariant checks
//! - [`io`] — Instance reader and solution writer
//! - [`error`] — Instance, parse and infeasibility errors
//!
//! ## Example
//!
//! ```
//! use u_arc_routing::io::{parse_instance, write_solution, ReadOptions};
//! use u_arc_routing::constructive::solve;
//!
//! let text = "\
//! Capacity: 10
//! Depot Node: 1
//! ReN. DEMAND S. COST
//! N2 5 2
//! ReE. FROM TO COST DEMAND S. COST
//! E1 3 4 4 6 1
//! EDGE FROM TO COST
//! NrE1 1 2 3
//! NrE2 2 3 2
//! NrE3 1 4 9
//! ";
//! let graph = parse_instance(text, ReadOptions::default()).unwrap().build().unwrap();
//! let solution = solve(&graph).unwrap();
//! assert_eq!(solution.num_routes(), 2);
//! assert_eq!(solution.total_cost(), 27);
//!
//! let mut out = Vec::new();
//! write_solution(&mut out, &solution, graph.depot(), None).unwrap();
//! ```

pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod io;
pub mod models;
