use crate::{coord::Coord, triangle::Edge, Scalar};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::{BTreeSet, BinaryHeap},
};
use thiserror::Error;

/// Error thrown by graph construction and queries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    /// Vertex index does not exist in graph.
    /// (vertex index, vertices count)
    #[error("vertex {0} is out of range of {1} vertices")]
    InvalidVertex(usize, usize),
    /// There is no path between source and target vertices.
    #[error("vertex {to} is not reachable from vertex {from}")]
    Unreachable { from: usize, to: usize },
}

/// Weighted half-edge stored in graph adjacency list.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjacent {
    /// Destination vertex index.
    pub destination: usize,
    /// Euclidean length of the edge.
    pub weight: Scalar,
}

/// Shortest path between two vertices.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Vertex indices from source to target (both inclusive).
    pub nodes: Vec<usize>,
    /// Total path length.
    pub length: Scalar,
}

/// Undirected graph embedded in plane, with edge weights equal to their Euclidean length.
///
/// Adjacency is stored in compressed form: `offsets[v]..offsets[v + 1]` is the range of `v`
/// half-edges in flat adjacency list.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// let positions = vec![
///     Coord::new(0.0, 0.0),
///     Coord::new(3.0, 0.0),
///     Coord::new(3.0, 4.0),
/// ];
/// let graph = Graph::new(&positions, vec![Edge::new(0, 1), Edge::new(1, 2)]).unwrap();
/// assert_eq!(graph.num_vertices(), 3);
/// assert_eq!(graph.num_edges(), 2);
/// let path = graph.shortest_path(0, 2).unwrap();
/// assert_eq!(path.nodes, vec![0, 1, 2]);
/// assert_eq!(path.length, 7.0);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    offsets: Vec<usize>,
    adjacents: Vec<Adjacent>,
}

impl Graph {
    /// Create new graph.
    ///
    /// # Arguments
    /// * `positions` - Vertex positions.
    /// * `edges` - Undirected edges (duplicates and self edges are ignored).
    ///
    /// # Returns
    /// Graph or error when edge references vertex out of range.
    pub fn new<I, E>(positions: &[Coord], edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Edge>,
    {
        let count = positions.len();
        let mut half_edges = BTreeSet::new();
        for edge in edges {
            let edge = edge.into();
            if edge.to >= count {
                return Err(GraphError::InvalidVertex(edge.to, count));
            }
            if edge.is_loop() {
                continue;
            }
            half_edges.insert((edge.from, edge.to));
            half_edges.insert((edge.to, edge.from));
        }
        let mut offsets = Vec::with_capacity(count + 1);
        let mut adjacents = Vec::with_capacity(half_edges.len());
        offsets.push(0);
        let mut current = 0;
        for (from, to) in half_edges {
            while current < from {
                offsets.push(adjacents.len());
                current += 1;
            }
            adjacents.push(Adjacent {
                destination: to,
                weight: positions[from].distance(positions[to]),
            });
        }
        while offsets.len() <= count {
            offsets.push(adjacents.len());
        }
        Ok(Self { offsets, adjacents })
    }

    /// Returns number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Returns number of undirected edges.
    pub fn num_edges(&self) -> usize {
        self.adjacents.len() / 2
    }

    fn range(&self, vertex: usize) -> Option<(usize, usize)> {
        Some((
            *self.offsets.get(vertex)?,
            *self.offsets.get(vertex.checked_add(1)?)?,
        ))
    }

    /// Returns number of vertex neighbors.
    ///
    /// # Returns
    /// Neighbors count or `None` when `vertex` is out of range.
    pub fn num_adjacents(&self, vertex: usize) -> Option<usize> {
        let (from, to) = self.range(vertex)?;
        Some(to - from)
    }

    /// Returns `index`-th neighbor half-edge of `vertex`.
    ///
    /// # Returns
    /// Half-edge or `None` when `vertex` or `index` is out of range.
    pub fn adjacent(&self, vertex: usize, index: usize) -> Option<&Adjacent> {
        self.adjacents(vertex)?.get(index)
    }

    /// Returns all neighbor half-edges of `vertex`, sorted by destination.
    ///
    /// # Returns
    /// Half-edges or `None` when `vertex` is out of range.
    pub fn adjacents(&self, vertex: usize) -> Option<&[Adjacent]> {
        let (from, to) = self.range(vertex)?;
        self.adjacents.get(from..to)
    }

    /// Find shortest path with Dijkstra algorithm.
    ///
    /// # Arguments
    /// * `source` - Source vertex index.
    /// * `target` - Target vertex index.
    ///
    /// # Returns
    /// Path or error when vertex is out of range or target is not reachable.
    pub fn shortest_path(&self, source: usize, target: usize) -> Result<Path, GraphError> {
        let count = self.num_vertices();
        for vertex in [source, target] {
            if vertex >= count {
                return Err(GraphError::InvalidVertex(vertex, count));
            }
        }
        let mut distance = vec![Scalar::INFINITY; count];
        let mut predecessor = vec![None; count];
        let mut queue = BinaryHeap::new();
        distance[source] = 0.0;
        queue.push(QueueEntry {
            distance: 0.0,
            vertex: source,
        });
        while let Some(QueueEntry {
            distance: current,
            vertex,
        }) = queue.pop()
        {
            if vertex == target {
                break;
            }
            if current > distance[vertex] {
                continue;
            }
            for adjacent in self.adjacents(vertex).unwrap_or_default() {
                let next = current + adjacent.weight;
                if next < distance[adjacent.destination] {
                    distance[adjacent.destination] = next;
                    predecessor[adjacent.destination] = Some(vertex);
                    queue.push(QueueEntry {
                        distance: next,
                        vertex: adjacent.destination,
                    });
                }
            }
        }
        if !distance[target].is_finite() {
            return Err(GraphError::Unreachable {
                from: source,
                to: target,
            });
        }
        let mut nodes = vec![target];
        let mut vertex = target;
        while let Some(previous) = predecessor[vertex] {
            nodes.push(previous);
            vertex = previous;
        }
        nodes.reverse();
        Ok(Path {
            nodes,
            length: distance[target],
        })
    }
}

/// Min-heap entry: smaller distance first, then smaller vertex index.
#[derive(Debug, Copy, Clone)]
struct QueueEntry {
    distance: Scalar,
    vertex: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}
