//! Domain model types for capacitated arc routing.
//!
//! Provides the mixed graph with its required services, routes as ordered
//! sequences of stops, and the solution handed to writers.

mod graph;
mod route;
mod service;
mod solution;

pub use graph::{Graph, GraphBuilder, Link, LinkId, LinkKind};
pub use route::{Route, Stop};
pub use service::{Requirement, Service, ServiceId, ServiceKind};
pub use solution::Solution;

/// External vertex label, as written in the instance file.
pub type VertexId = usize;

/// Travel and service cost. Instances use integer costs only.
pub type Cost = u64;

/// Demand and vehicle capacity.
pub type Demand = u32;
