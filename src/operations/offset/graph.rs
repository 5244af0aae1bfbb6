use slotmap::{SecondaryMap, SlotMap};

use crate::geometry::intersection::{approx_eq, compare_approx, Intersection};
use crate::operations::stitch::IntersectionPairEdge;

use super::moved_edge::MovedEdge;

slotmap::new_key_type! {
    /// Stable identifier for a moved edge; survives removal of other edges.
    pub struct EdgeKey;
}

/// A crossing between two moved edges, seen from `first`.
///
/// Parameters are on the full padded trajectories.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeIntersection {
    pub first: EdgeKey,
    pub second: EdgeKey,
    pub first_t: f64,
    pub second_t: f64,
}

impl EdgeIntersection {
    /// The same crossing seen from `second`.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            first: self.second,
            second: self.first,
            first_t: self.second_t,
            second_t: self.first_t,
        }
    }
}

/// Crossings on one edge, ascending by `first_t`.
#[derive(Debug, Clone, Default)]
pub struct MovedEdgeIntersections {
    entries: Vec<EdgeIntersection>,
}

impl MovedEdgeIntersections {
    #[must_use]
    pub fn entries(&self) -> &[EdgeIntersection] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts keeping the order; equal parameters go after existing ones.
    pub fn insert(&mut self, value: EdgeIntersection) -> usize {
        let at = self
            .entries
            .partition_point(|e| e.first_t <= value.first_t);
        self.entries.insert(at, value);
        at
    }

    /// Index of an entry crossing `second` at approximately the given
    /// parameters.
    #[must_use]
    pub fn find(
        &self,
        second: EdgeKey,
        first_t: f64,
        second_t: f64,
        tolerance: f64,
    ) -> Option<usize> {
        let start = self.entries.partition_point(|e| {
            compare_approx(e.first_t, first_t, tolerance) == std::cmp::Ordering::Less
        });
        self.entries[start..]
            .iter()
            .take_while(|e| approx_eq(e.first_t, first_t, tolerance))
            .position(|e| e.second == second && approx_eq(e.second_t, second_t, tolerance))
            .map(|i| start + i)
    }

    fn position_of(&self, value: &EdgeIntersection) -> Option<usize> {
        self.entries.iter().position(|e| e == value)
    }

    fn remove(&mut self, index: usize) -> EdgeIntersection {
        self.entries.remove(index)
    }
}

#[derive(Debug)]
struct Node {
    edge: MovedEdge,
    hits: MovedEdgeIntersections,
    collapsed: bool,
}

/// Moved edges and their symmetric crossing lists.
///
/// Every crossing is stored twice, once on each edge with the sides swapped.
/// All mutators keep the two copies in sync.
#[derive(Debug)]
pub struct IntersectionGraph {
    nodes: SlotMap<EdgeKey, Node>,
    order: Vec<EdgeKey>,
    index: SecondaryMap<EdgeKey, usize>,
}

impl IntersectionGraph {
    /// Builds a graph with no crossings, keeping the contour order.
    #[must_use]
    pub fn new(edges: Vec<MovedEdge>) -> Self {
        let mut nodes = SlotMap::with_key();
        let order = edges
            .into_iter()
            .map(|edge| {
                nodes.insert(Node {
                    edge,
                    hits: MovedEdgeIntersections::default(),
                    collapsed: false,
                })
            })
            .collect();
        let mut graph = Self {
            nodes,
            order,
            index: SecondaryMap::new(),
        };
        graph.reindex();
        graph
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in contour order.
    #[must_use]
    pub fn keys(&self) -> &[EdgeKey] {
        &self.order
    }

    /// Current position of `key` in contour order.
    #[must_use]
    pub fn index_of(&self, key: EdgeKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    #[must_use]
    pub fn edge(&self, key: EdgeKey) -> Option<&MovedEdge> {
        self.nodes.get(key).map(|n| &n.edge)
    }

    /// Crossings on `key`, empty for an unknown key.
    #[must_use]
    pub fn hits(&self, key: EdgeKey) -> &[EdgeIntersection] {
        self.nodes
            .get(key)
            .map(|n| n.hits.entries())
            .unwrap_or_default()
    }

    /// The edge `steps` places after `key` in contour order, wrapping.
    /// Negative steps walk backward.
    #[must_use]
    pub fn neighbour(&self, key: EdgeKey, steps: isize) -> Option<EdgeKey> {
        let n = self.order.len();
        let at = self.index_of(key)?;
        #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
        let target = (at as isize + steps).rem_euclid(n as isize) as usize;
        self.order.get(target).copied()
    }

    #[must_use]
    pub fn predecessor(&self, key: EdgeKey) -> Option<EdgeKey> {
        self.neighbour(key, -1)
    }

    #[must_use]
    pub fn successor(&self, key: EdgeKey) -> Option<EdgeKey> {
        self.neighbour(key, 1)
    }

    /// Records a crossing on both edges.
    pub fn add(&mut self, first: EdgeKey, second: EdgeKey, first_t: f64, second_t: f64) {
        let value = EdgeIntersection {
            first,
            second,
            first_t,
            second_t,
        };
        if let Some(node) = self.nodes.get_mut(first) {
            node.hits.insert(value);
        }
        if let Some(node) = self.nodes.get_mut(second) {
            node.hits.insert(value.reversed());
        }
    }

    /// Whether `first` already has an approximately equal crossing with
    /// `second`.
    #[must_use]
    pub fn contains(
        &self,
        first: EdgeKey,
        second: EdgeKey,
        first_t: f64,
        second_t: f64,
        tolerance: f64,
    ) -> bool {
        self.nodes
            .get(first)
            .and_then(|n| n.hits.find(second, first_t, second_t, tolerance))
            .is_some()
    }

    /// Removes the crossing at `position` on `key` and its mirror.
    pub fn remove_hit(&mut self, key: EdgeKey, position: usize) -> Option<EdgeIntersection> {
        let node = self.nodes.get_mut(key)?;
        if position >= node.hits.len() {
            return None;
        }
        let removed = node.hits.remove(position);
        let mirror = removed.reversed();
        if let Some(other) = self.nodes.get_mut(removed.second) {
            if let Some(at) = other.hits.position_of(&mirror) {
                other.hits.remove(at);
            }
        }
        Some(removed)
    }

    /// Flags `key` as shrunk to a single point by its neighbours.
    pub fn mark_collapsed(&mut self, key: EdgeKey) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.collapsed = true;
        }
    }

    #[must_use]
    pub fn is_collapsed(&self, key: EdgeKey) -> bool {
        self.nodes.get(key).is_some_and(|n| n.collapsed)
    }

    /// Removes every crossing on `key` and their mirrors. Returns how many
    /// were removed.
    pub fn clear_hits(&mut self, key: EdgeKey) -> usize {
        let mut removed = 0;
        while self.remove_hit(key, 0).is_some() {
            removed += 1;
        }
        removed
    }

    /// Keeps only the crossings of `key` with positions in `[lo, hi]`.
    /// Returns how many were removed.
    pub fn retain_window(&mut self, key: EdgeKey, lo: usize, hi: usize) -> usize {
        let len = self.hits(key).len();
        let mut removed = 0;
        for position in (0..len).rev() {
            if (position < lo || position > hi) && self.remove_hit(key, position).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Drops edges without crossings and renumbers the rest. Returns how many
    /// edges were dropped.
    pub fn drop_empty(&mut self) -> usize {
        let before = self.order.len();
        let nodes = &self.nodes;
        self.order
            .retain(|&key| nodes.get(key).is_some_and(|n| !n.hits.is_empty()));
        let kept: Vec<EdgeKey> = self.order.clone();
        self.nodes.retain(|key, _| kept.contains(&key));
        self.reindex();
        before - self.order.len()
    }

    /// Global parameters `edge_index + t` of a crossing.
    #[must_use]
    pub fn global(&self, hit: &EdgeIntersection) -> Option<Intersection> {
        let first = self.index_of(hit.first)?;
        let second = self.index_of(hit.second)?;
        #[allow(clippy::cast_precision_loss)]
        Some(Intersection::new(
            first as f64 + hit.first_t,
            second as f64 + hit.second_t,
        ))
    }

    /// One forward piece per pair of consecutive crossings on every edge.
    #[must_use]
    pub fn pieces(&self) -> Vec<IntersectionPairEdge> {
        let mut pieces = Vec::new();
        for &key in &self.order {
            for pair in self.hits(key).windows(2) {
                if let (Some(from), Some(to)) = (self.global(&pair[0]), self.global(&pair[1])) {
                    pieces.push(IntersectionPairEdge::contour(from, to));
                }
            }
        }
        pieces
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, &key) in self.order.iter().enumerate() {
            self.index.insert(key, i);
        }
    }
}
