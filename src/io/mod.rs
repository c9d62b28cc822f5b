//! Instance reading and solution writing.
//!
//! - [`reader`] — line-oriented instance format into a [`GraphBuilder`](crate::models::GraphBuilder)
//! - [`writer`] — solution format with optional reference values

pub mod reader;
pub mod writer;

pub use reader::{load_instance, parse_instance, read_instance, read_references, ReadOptions};
pub use writer::{save_solution, write_solution, Reference};
