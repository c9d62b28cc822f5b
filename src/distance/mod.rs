//! Shortest travel costs between vertices.
//!
//! Provides the all-pairs shortest-path table consumed by the route builder.

mod shortest_paths;

pub use shortest_paths::ShortestPaths;
