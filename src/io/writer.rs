//! Writer for constructed solutions.
//!
//! ```text
//! <total cost>
//! <route count>
//! [<reference value>
//!  <reference value>]
//! 0 1 <route id> <demand> <cost> <stops> (D 0,1,1) (S 3,4,5) ... (D 0,1,1)
//! ```
//!
//! Depot visits are tagged `D` with id 0, service stops `S` with the service
//! id and the pair of vertices traversed to perform it.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::{Solution, Stop, VertexId};

/// Two benchmark values passed through to the output unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference(pub u64, pub u64);

/// Writes a solution in text form.
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::{Route, ServiceId, Solution, Stop};
/// use u_arc_routing::io::write_solution;
///
/// let mut route = Route::new(1);
/// route.push_service(Stop::NodeService { id: ServiceId::new(1), vertex: 2 }, 3, 2, 5);
/// route.close(3);
/// let mut solution = Solution::new();
/// solution.add_route(route);
///
/// let mut out = Vec::new();
/// write_solution(&mut out, &solution, 1, None).unwrap();
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "8\n1\n0 1 1 5 8 3 (D 0,1,1) (S 1,2,2) (D 0,1,1)\n"
/// );
/// ```
///
/// # Errors
///
/// Propagates any I/O error of `out`.
pub fn write_solution<W: Write>(
    out: &mut W,
    solution: &Solution,
    depot: VertexId,
    reference: Option<Reference>,
) -> io::Result<()> {
    writeln!(out, "{}", solution.total_cost())?;
    writeln!(out, "{}", solution.num_routes())?;
    if let Some(Reference(first, second)) = reference {
        writeln!(out, "{first}")?;
        writeln!(out, "{second}")?;
    }

    for route in solution.routes() {
        write!(
            out,
            "0 1 {} {} {} {}",
            route.id(),
            route.demand(),
            route.cost(),
            route.stops().len()
        )?;
        for stop in route.stops() {
            match *stop {
                Stop::DepotVisit => write!(out, " (D 0,{depot},{depot})")?,
                Stop::NodeService { id, vertex } => write!(out, " (S {id},{vertex},{vertex})")?,
                Stop::EdgeService { id, from, to } | Stop::ArcService { id, from, to } => {
                    write!(out, " (S {id},{from},{to})")?
                }
            }
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Creates `path` and writes the solution into it.
///
/// # Errors
///
/// Propagates creation, write and flush errors.
pub fn save_solution(
    path: impl AsRef<Path>,
    solution: &Solution,
    depot: VertexId,
    reference: Option<Reference>,
) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_solution(&mut out, solution, depot, reference)?;
    out.flush()
}
