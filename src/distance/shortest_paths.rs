//! All-pairs shortest paths by Floyd–Warshall relaxation.
//!
//! # Algorithm
//!
//! The table starts with the cheapest direct link between every ordered pair,
//! zero on the diagonal and "unreachable" elsewhere. Every vertex `k` is then
//! tried as an intermediate:
//!
//! ```text
//! d(i, j) = min(d(i, j), d(i, k) + d(k, j))
//! ```
//!
//! Predecessors are recorded alongside so full paths can be rebuilt. A path
//! whose cost would exceed [`Cost::MAX`] is never recorded.
//!
//! # Complexity
//!
//! O(|V|³) time, O(|V|²) memory. The route builder issues many more distance
//! queries than there are vertices, so one exhaustive pass pays off.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{Cost, Graph, VertexId};

/// Dense shortest-path table over the vertices of a [`Graph`].
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::GraphBuilder;
/// use u_arc_routing::distance::ShortestPaths;
///
/// let mut builder = GraphBuilder::new();
/// builder.add_edge(1, 2, 3, None);
/// builder.add_edge(2, 3, 2, None);
/// builder.add_arc(3, 4, 1, None, None);
/// builder.set_depot(1).set_capacity(10);
/// let graph = builder.build().unwrap();
///
/// let sp = ShortestPaths::compute(&graph);
/// assert_eq!(sp.distance(1, 4), Some(6));
/// assert_eq!(sp.distance(4, 1), None);
/// assert_eq!(sp.path(1, 4), Some(vec![1, 2, 3, 4]));
/// ```
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    vertices: Vec<VertexId>,
    index: HashMap<VertexId, usize>,
    dist: Vec<Option<Cost>>,
    pred: Vec<Option<usize>>,
    size: usize,
}

impl ShortestPaths {
    /// Computes the table for every ordered vertex pair of the graph.
    pub fn compute(graph: &Graph) -> Self {
        let n = graph.num_vertices();
        let mut dist: Vec<Option<Cost>> = vec![None; n * n];
        let mut pred = vec![None; n * n];

        for i in 0..n {
            dist[i * n + i] = Some(0);
            for &(j, cost) in graph.neighbors_by_index(i) {
                // Parallel links: keep the cheapest.
                if dist[i * n + j].map_or(true, |d| cost < d) {
                    dist[i * n + j] = Some(cost);
                    pred[i * n + j] = Some(i);
                }
            }
        }

        for k in 0..n {
            for i in 0..n {
                let Some(d_ik) = dist[i * n + k] else {
                    continue;
                };
                for j in 0..n {
                    let Some(through_k) = dist[k * n + j].and_then(|d_kj| d_ik.checked_add(d_kj))
                    else {
                        continue;
                    };
                    if dist[i * n + j].map_or(true, |d| through_k < d) {
                        dist[i * n + j] = Some(through_k);
                        pred[i * n + j] = pred[k * n + j];
                    }
                }
            }
        }

        debug!(vertices = n, "computed all-pairs shortest paths");

        let vertices = graph.vertices().to_vec();
        let index = vertices.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        Self {
            vertices,
            index,
            dist,
            pred,
            size: n,
        }
    }

    /// Shortest travel cost from `from` to `to`.
    ///
    /// Returns `None` if `to` cannot be reached, either vertex is unknown, or
    /// every path costs more than [`Cost::MAX`].
    pub fn distance(&self, from: VertexId, to: VertexId) -> Option<Cost> {
        let (i, j) = self.indices(from, to)?;
        self.distance_by_index(i, j)
    }

    /// Shortest travel cost between dense indices.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn distance_by_index(&self, i: usize, j: usize) -> Option<Cost> {
        self.dist[i * self.size + j]
    }

    /// Vertex sequence of a shortest path, both ends included.
    ///
    /// Returns `[from]` when `from == to` and `None` when unreachable.
    pub fn path(&self, from: VertexId, to: VertexId) -> Option<Vec<VertexId>> {
        let (i, j) = self.indices(from, to)?;
        self.distance_by_index(i, j)?;

        let mut path = vec![self.vertices[j]];
        let mut current = j;
        while current != i {
            // A simple path never revisits a vertex.
            if path.len() > self.size {
                return None;
            }
            current = self.pred[i * self.size + current]?;
            path.push(self.vertices[current]);
        }
        path.reverse();
        Some(path)
    }

    /// Number of vertices covered by the table.
    pub fn size(&self) -> usize {
        self.size
    }

    fn indices(&self, from: VertexId, to: VertexId) -> Option<(usize, usize)> {
        Some((*self.index.get(&from)?, *self.index.get(&to)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GraphBuilder;

    fn diamond() -> Graph {
        let mut b = GraphBuilder::new();
        b.add_edge(1, 2, 3, None);
        b.add_edge(2, 3, 2, None);
        b.add_edge(3, 4, 4, None);
        b.add_edge(1, 4, 9, None);
        b.set_depot(1).set_capacity(10);
        b.build().expect("valid")
    }

    #[test]
    fn test_diagonal_zero() {
        let sp = ShortestPaths::compute(&diamond());
        for v in 1..=4 {
            assert_eq!(sp.distance(v, v), Some(0));
            assert_eq!(sp.path(v, v), Some(vec![v]));
        }
    }

    #[test]
    fn test_relaxation() {
        let sp = ShortestPaths::compute(&diamond());
        assert_eq!(sp.distance(1, 3), Some(5));
        assert_eq!(sp.distance(1, 4), Some(9));
        assert_eq!(sp.distance(4, 2), Some(6));
        assert_eq!(sp.path(1, 3), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_symmetric_for_edges() {
        let sp = ShortestPaths::compute(&diamond());
        for a in 1..=4 {
            for b in 1..=4 {
                assert_eq!(sp.distance(a, b), sp.distance(b, a));
            }
        }
    }

    #[test]
    fn test_arcs_are_directed() {
        let mut b = GraphBuilder::new();
        b.add_arc(1, 2, 4, None, None);
        b.add_arc(2, 3, 1, None, None);
        b.add_arc(3, 1, 1, None, None);
        b.set_depot(1).set_capacity(1);
        let sp = ShortestPaths::compute(&b.build().expect("valid"));
        assert_eq!(sp.distance(1, 3), Some(5));
        assert_eq!(sp.distance(3, 2), Some(5));
        assert_eq!(sp.path(3, 2), Some(vec![3, 1, 2]));
    }

    #[test]
    fn test_parallel_links_keep_cheapest() {
        let mut b = GraphBuilder::new();
        b.add_edge(1, 2, 10, None);
        b.add_arc(1, 2, 4, None, None);
        b.set_depot(1).set_capacity(1);
        let sp = ShortestPaths::compute(&b.build().expect("valid"));
        assert_eq!(sp.distance(1, 2), Some(4));
        assert_eq!(sp.distance(2, 1), Some(10));
    }

    #[test]
    fn test_disconnected() {
        let mut b = GraphBuilder::new();
        b.add_edge(1, 2, 1, None);
        b.add_edge(3, 4, 1, None);
        b.set_depot(1).set_capacity(1);
        let sp = ShortestPaths::compute(&b.build().expect("valid"));
        assert_eq!(sp.distance(1, 3), None);
        assert_eq!(sp.path(1, 4), None);
        assert_eq!(sp.distance(1, 99), None);
        assert_eq!(sp.size(), 4);
    }

    #[test]
    fn test_triangle_inequality() {
        let sp = ShortestPaths::compute(&diamond());
        for i in 0..sp.size() {
            for j in 0..sp.size() {
                for k in 0..sp.size() {
                    let (Some(ij), Some(ik), Some(kj)) = (
                        sp.distance_by_index(i, j),
                        sp.distance_by_index(i, k),
                        sp.distance_by_index(k, j),
                    ) else {
                        continue;
                    };
                    assert!(ij <= ik + kj);
                }
            }
        }
    }

    #[test]
    fn test_max_cost_link_is_reachable() {
        let mut b = GraphBuilder::new();
        b.add_edge(1, 2, Cost::MAX, None);
        b.set_depot(1).set_capacity(1);
        let sp = ShortestPaths::compute(&b.build().expect("valid"));
        assert_eq!(sp.distance(1, 2), Some(Cost::MAX));
        assert_eq!(sp.path(1, 2), Some(vec![1, 2]));
    }

    #[test]
    fn test_overflowing_sum_is_not_relaxed() {
        let half = Cost::MAX / 2 + 1;
        let mut b = GraphBuilder::new();
        b.add_edge(1, 2, half, None);
        b.add_edge(2, 3, half, None);
        b.add_arc(3, 1, 5, None, None);
        b.set_depot(1).set_capacity(1);
        let sp = ShortestPaths::compute(&b.build().expect("valid"));
        assert_eq!(sp.distance(1, 2), Some(half));
        // 1 -> 2 -> 3 overflows, 3 -> 1 does not.
        assert_eq!(sp.distance(1, 3), None);
        assert_eq!(sp.distance(3, 1), Some(5));
        assert_eq!(sp.distance(3, 2), Some(half));
    }
}
