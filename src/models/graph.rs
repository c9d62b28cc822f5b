//! Mixed graph with required services, depot and vehicle capacity.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Cost, Demand, Requirement, Service, ServiceId, ServiceKind, VertexId};
use crate::error::InstanceError;

/// Index of a link in the order it was added to the graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LinkId(usize);

impl LinkId {
    /// Wraps a raw index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a link can be traversed both ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkKind {
    /// Undirected.
    Edge,
    /// Directed, enterable only at `from`.
    Arc,
}

/// An edge or arc of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    kind: LinkKind,
    from: VertexId,
    to: VertexId,
    cost: Cost,
    label: Option<u32>,
    requirement: Option<Requirement>,
}

impl Link {
    /// Edge or arc.
    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    /// First endpoint (tail for arcs).
    pub fn from(&self) -> VertexId {
        self.from
    }

    /// Second endpoint (head for arcs).
    pub fn to(&self) -> VertexId {
        self.to
    }

    /// Traversal cost.
    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// Number taken from the instance label (`A12` → 12), if any.
    pub fn label(&self) -> Option<u32> {
        self.label
    }

    /// Requirement, if this link must be serviced.
    pub fn requirement(&self) -> Option<&Requirement> {
        self.requirement.as_ref()
    }

    /// Returns `true` if this link must be serviced.
    pub fn is_required(&self) -> bool {
        self.requirement.is_some()
    }
}

/// Incremental construction of a [`Graph`].
///
/// Adding a link registers both of its endpoints. Validation of the depot,
/// the capacity and service demands happens once in [`GraphBuilder::build`].
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::{GraphBuilder, Requirement};
///
/// let mut builder = GraphBuilder::new();
/// builder.add_edge(1, 2, 3, None);
/// builder.add_arc(2, 3, 5, Some(Requirement::new(4, 1)), Some(1));
/// builder.require_vertex(2, Requirement::new(5, 2)).unwrap();
/// builder.set_depot(1).set_capacity(10);
///
/// let graph = builder.build().unwrap();
/// assert_eq!(graph.num_vertices(), 3);
/// assert_eq!(graph.num_services(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    name: Option<String>,
    vertices: BTreeSet<VertexId>,
    links: Vec<Link>,
    required_vertices: Vec<(VertexId, Requirement)>,
    depot: Option<VertexId>,
    capacity: Option<Demand>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the instance name.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the depot vertex.
    pub fn set_depot(&mut self, depot: VertexId) -> &mut Self {
        self.depot = Some(depot);
        self
    }

    /// Sets the vehicle capacity.
    pub fn set_capacity(&mut self, capacity: Demand) -> &mut Self {
        self.capacity = Some(capacity);
        self
    }

    /// Registers a vertex. Registering twice is a no-op.
    pub fn add_vertex(&mut self, vertex: VertexId) -> &mut Self {
        self.vertices.insert(vertex);
        self
    }

    /// Adds an undirected edge.
    pub fn add_edge(
        &mut self,
        u: VertexId,
        v: VertexId,
        cost: Cost,
        requirement: Option<Requirement>,
    ) -> LinkId {
        self.push_link(LinkKind::Edge, u, v, cost, None, requirement)
    }

    /// Adds a directed arc from `tail` to `head`.
    pub fn add_arc(
        &mut self,
        tail: VertexId,
        head: VertexId,
        cost: Cost,
        requirement: Option<Requirement>,
        label: Option<u32>,
    ) -> LinkId {
        self.push_link(LinkKind::Arc, tail, head, cost, label, requirement)
    }

    fn push_link(
        &mut self,
        kind: LinkKind,
        from: VertexId,
        to: VertexId,
        cost: Cost,
        label: Option<u32>,
        requirement: Option<Requirement>,
    ) -> LinkId {
        self.vertices.insert(from);
        self.vertices.insert(to);
        let id = LinkId::new(self.links.len());
        self.links.push(Link {
            kind,
            from,
            to,
            cost,
            label,
            requirement,
        });
        id
    }

    /// Marks a vertex as required, registering it if needed.
    pub fn require_vertex(
        &mut self,
        vertex: VertexId,
        requirement: Requirement,
    ) -> Result<&mut Self, InstanceError> {
        if self.required_vertices.iter().any(|&(v, _)| v == vertex) {
            return Err(InstanceError::DuplicateVertexRequirement(vertex));
        }
        self.vertices.insert(vertex);
        self.required_vertices.push((vertex, requirement));
        Ok(self)
    }

    /// Marks an existing link as required.
    pub fn require_link(
        &mut self,
        link: LinkId,
        requirement: Requirement,
    ) -> Result<&mut Self, InstanceError> {
        let entry = self
            .links
            .get_mut(link.index())
            .ok_or(InstanceError::UnknownLink(link))?;
        if entry.requirement.is_some() {
            return Err(InstanceError::DuplicateLinkRequirement(link));
        }
        entry.requirement = Some(requirement);
        Ok(self)
    }

    /// Validates the instance and freezes it into a [`Graph`].
    ///
    /// # Errors
    ///
    /// Fails if the depot or capacity is missing, the depot is not a vertex,
    /// the capacity is zero, or a single service needs more than the capacity.
    pub fn build(self) -> Result<Graph, InstanceError> {
        let depot = self.depot.ok_or(InstanceError::MissingDepot)?;
        if !self.vertices.contains(&depot) {
            return Err(InstanceError::DepotNotInGraph(depot));
        }
        let capacity = self.capacity.ok_or(InstanceError::MissingCapacity)?;
        if capacity == 0 {
            return Err(InstanceError::ZeroCapacity);
        }

        let mut services = Vec::with_capacity(
            self.required_vertices.len() + self.links.iter().filter(|l| l.is_required()).count(),
        );
        for &(vertex, requirement) in &self.required_vertices {
            let id = ServiceId::new(services.len() + 1);
            services.push(Service::new(id, ServiceKind::Node { vertex }, requirement));
        }
        for (index, link) in self.links.iter().enumerate() {
            let Some(requirement) = link.requirement else {
                continue;
            };
            let id = ServiceId::new(services.len() + 1);
            let link_id = LinkId::new(index);
            let kind = match link.kind {
                LinkKind::Edge => ServiceKind::Edge {
                    link: link_id,
                    u: link.from,
                    v: link.to,
                    traversal_cost: link.cost,
                },
                LinkKind::Arc => ServiceKind::Arc {
                    link: link_id,
                    tail: link.from,
                    head: link.to,
                    traversal_cost: link.cost,
                },
            };
            services.push(Service::new(id, kind, requirement));
        }

        if let Some(service) = services.iter().find(|s| s.demand() > capacity) {
            return Err(InstanceError::DemandExceedsCapacity {
                service: service.id(),
                demand: service.demand(),
                capacity,
            });
        }

        let vertices: Vec<VertexId> = self.vertices.into_iter().collect();
        let index: HashMap<VertexId, usize> =
            vertices.iter().enumerate().map(|(i, &v)| (v, i)).collect();

        let mut adjacency = vec![Vec::new(); vertices.len()];
        for link in &self.links {
            let from = index[&link.from];
            let to = index[&link.to];
            adjacency[from].push((to, link.cost));
            if link.kind == LinkKind::Edge {
                adjacency[to].push((from, link.cost));
            }
        }

        Ok(Graph {
            name: self.name,
            vertices,
            index,
            links: self.links,
            adjacency,
            services,
            depot,
            capacity,
        })
    }
}

/// A validated, immutable CARP instance.
///
/// Vertices are kept in ascending label order; the position of a vertex in
/// that order is its dense index, used by the distance table.
#[derive(Debug, Clone)]
pub struct Graph {
    name: Option<String>,
    vertices: Vec<VertexId>,
    index: HashMap<VertexId, usize>,
    links: Vec<Link>,
    adjacency: Vec<Vec<(usize, Cost)>>,
    services: Vec<Service>,
    depot: VertexId,
    capacity: Demand,
}

impl Graph {
    /// Instance name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Vertex labels in ascending order.
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if the label is a vertex of this graph.
    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.index.contains_key(&vertex)
    }

    /// Dense index of a vertex label.
    pub fn index_of(&self, vertex: VertexId) -> Option<usize> {
        self.index.get(&vertex).copied()
    }

    /// Vertex label at a dense index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn vertex_at(&self, index: usize) -> VertexId {
        self.vertices[index]
    }

    /// All edges and arcs.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Looks up a link by id.
    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.index())
    }

    /// Outgoing `(neighbor, travel_cost)` pairs of a vertex.
    ///
    /// Edges yield entries in both directions, arcs only tail to head.
    /// Unknown vertices have no neighbors.
    pub fn neighbors(&self, vertex: VertexId) -> impl Iterator<Item = (VertexId, Cost)> + '_ {
        self.index_of(vertex)
            .into_iter()
            .flat_map(move |i| self.adjacency[i].iter())
            .map(move |&(j, cost)| (self.vertices[j], cost))
    }

    /// Outgoing `(index, travel_cost)` pairs by dense index.
    pub(crate) fn neighbors_by_index(&self, index: usize) -> &[(usize, Cost)] {
        &self.adjacency[index]
    }

    /// Required services ordered by id.
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Looks up a service by id.
    pub fn service(&self, id: ServiceId) -> Option<&Service> {
        id.get()
            .checked_sub(1)
            .and_then(|i| self.services.get(i))
    }

    /// Number of required services.
    pub fn num_services(&self) -> usize {
        self.services.len()
    }

    /// Total demand over all services.
    pub fn total_demand(&self) -> u64 {
        self.services.iter().map(|s| u64::from(s.demand())).sum()
    }

    /// Depot vertex.
    pub fn depot(&self) -> VertexId {
        self.depot
    }

    /// Vehicle capacity.
    pub fn capacity(&self) -> Demand {
        self.capacity
    }
}
