//! Required services: nodes, edges and arcs with demand.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Cost, Demand, LinkId, VertexId};

/// Demand and service cost attached to a required vertex, edge or arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Requirement {
    /// Units of capacity consumed by servicing it.
    pub demand: Demand,
    /// Cost paid on top of any traversal when servicing it.
    pub service_cost: Cost,
}

impl Requirement {
    /// Creates a requirement.
    pub fn new(demand: Demand, service_cost: Cost) -> Self {
        Self {
            demand,
            service_cost,
        }
    }
}

/// 1-based identifier of a required service.
///
/// Ids are handed out in registration order: required vertices first, then
/// required links in the order they were added to the graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ServiceId(usize);

impl ServiceId {
    /// Wraps a raw id.
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Raw id.
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a service is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceKind {
    /// Visit a vertex; no traversal involved.
    Node { vertex: VertexId },
    /// Traverse an undirected edge in either direction.
    Edge {
        link: LinkId,
        u: VertexId,
        v: VertexId,
        traversal_cost: Cost,
    },
    /// Traverse a directed arc from `tail` to `head`.
    Arc {
        link: LinkId,
        tail: VertexId,
        head: VertexId,
        traversal_cost: Cost,
    },
}

/// A required service, resolved once when the graph is built.
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::{GraphBuilder, Requirement, ServiceKind};
///
/// let mut builder = GraphBuilder::new();
/// builder.add_edge(1, 2, 4, Some(Requirement::new(3, 1)));
/// builder.set_depot(1).set_capacity(10);
/// let graph = builder.build().unwrap();
///
/// let service = &graph.services()[0];
/// assert_eq!(service.id().get(), 1);
/// assert_eq!(service.demand(), 3);
/// assert!(matches!(service.kind(), ServiceKind::Edge { u: 1, v: 2, .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    id: ServiceId,
    kind: ServiceKind,
    requirement: Requirement,
}

impl Service {
    pub(crate) fn new(id: ServiceId, kind: ServiceKind, requirement: Requirement) -> Self {
        Self {
            id,
            kind,
            requirement,
        }
    }

    /// Service id.
    pub fn id(&self) -> ServiceId {
        self.id
    }

    /// Where the service takes place.
    pub fn kind(&self) -> &ServiceKind {
        &self.kind
    }

    /// Demand consumed.
    pub fn demand(&self) -> Demand {
        self.requirement.demand
    }

    /// Service cost, excluding traversal.
    pub fn service_cost(&self) -> Cost {
        self.requirement.service_cost
    }

    /// Cost of traversing the serviced link, zero for nodes.
    pub fn traversal_cost(&self) -> Cost {
        match self.kind {
            ServiceKind::Node { .. } => 0,
            ServiceKind::Edge { traversal_cost, .. } | ServiceKind::Arc { traversal_cost, .. } => {
                traversal_cost
            }
        }
    }

    /// Endpoints of the service: `(v, v)` for nodes, `(u, v)` for edges
    /// and `(tail, head)` for arcs.
    pub fn endpoints(&self) -> (VertexId, VertexId) {
        match self.kind {
            ServiceKind::Node { vertex } => (vertex, vertex),
            ServiceKind::Edge { u, v, .. } => (u, v),
            ServiceKind::Arc { tail, head, .. } => (tail, head),
        }
    }
}
