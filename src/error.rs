//! Error types.
//!
//! Instance problems are fatal and surface while loading. An infeasible
//! construction is a distinct outcome that still carries the routes built so
//! far, see [`Infeasible`].

use std::fmt;

use crate::models::{Demand, LinkId, ServiceId, Solution, VertexId};

/// A violated precondition of the instance, detected by
/// [`GraphBuilder::build`](crate::models::GraphBuilder::build).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstanceError {
    #[error("no depot was set")]
    MissingDepot,

    #[error("depot {0} is not a vertex of the graph")]
    DepotNotInGraph(VertexId),

    #[error("no vehicle capacity was set")]
    MissingCapacity,

    #[error("vehicle capacity must be positive")]
    ZeroCapacity,

    #[error("link {0} does not exist")]
    UnknownLink(LinkId),

    #[error("vertex {0} is already required")]
    DuplicateVertexRequirement(VertexId),

    #[error("link {0} is already required")]
    DuplicateLinkRequirement(LinkId),

    #[error("service {service} has demand {demand} above capacity {capacity}")]
    DemandExceedsCapacity {
        service: ServiceId,
        demand: Demand,
        capacity: Demand,
    },
}

/// Failure while reading an instance file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Only raised in strict mode; lenient reading skips the row.
    #[error("line {line}: cannot parse `{content}` in section {section}")]
    Malformed {
        line: usize,
        section: &'static str,
        content: String,
    },

    #[error("invalid value for `{key}`: {value}")]
    InvalidHeader { key: &'static str, value: String },

    #[error(transparent)]
    Instance(#[from] InstanceError),
}

/// Why a construction could not produce a closed, complete solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Infeasibility {
    /// The depot cannot be reached from the last vertex of this route.
    DepotUnreachable { route_id: usize, from: VertexId },
    /// These services cannot be reached from the depot at all.
    UnreachableServices { services: Vec<ServiceId> },
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DepotUnreachable { route_id, from } => {
                write!(f, "route {route_id} cannot return to the depot from vertex {from}")
            }
            Self::UnreachableServices { services } => {
                write!(f, "services {services:?} are unreachable from the depot")
            }
        }
    }
}

/// An infeasible construction.
///
/// `partial` holds every route built before and after the failure. Routes
/// that could not return to the depot have no closing depot visit and their
/// return leg is not part of any cost.
#[derive(Debug, Clone, thiserror::Error)]
#[error("infeasible solution: {}", display_reasons(.reasons))]
pub struct Infeasible {
    pub partial: Solution,
    pub reasons: Vec<Infeasibility>,
}

fn display_reasons(reasons: &[Infeasibility]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
