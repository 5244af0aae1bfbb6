//! Passes that reduce the all-pairs crossing graph to the crossings that
//! bound the offset result.
//!
//! Each pass works on an [`IntersectionGraph`] and keeps both copies of every
//! crossing in sync. [`run`] applies them in the required order.

use tracing::trace;

use crate::math::polygon_2d::signed_angle;
use crate::math::POINT_TOLERANCE;

use super::graph::{EdgeIntersection, EdgeKey, IntersectionGraph};

/// Angles closer than this count as a tie when widening a window.
const ANGLE_TIE: f64 = 1e-9;

/// Runs every cleanup pass in order.
pub fn run(graph: &mut IntersectionGraph, tolerance: f64) {
    let merged = merge_coincident_corners(graph, tolerance);
    let dangling = drop_dangling(graph);
    let empty = graph.drop_empty();
    let pruned = prune_windows(graph);
    let dangling_again = drop_dangling(graph);
    trace!(
        merged,
        dangling,
        empty,
        pruned,
        dangling_again,
        edges = graph.len(),
        "offset graph cleaned"
    );
}

/// Replaces coincident predecessor and successor crossings with one direct
/// crossing between the neighbours.
///
/// The direct crossing is only added when the neighbours do not already
/// cross there. The edge is marked collapsed so [`prune_windows`] drops what
/// is left on it. Returns the number of edges collapsed.
pub fn merge_coincident_corners(graph: &mut IntersectionGraph, tolerance: f64) -> usize {
    let mut merged = 0;
    for key in graph.keys().to_vec() {
        let (Some(pred), Some(succ)) = (graph.predecessor(key), graph.successor(key)) else {
            continue;
        };
        if pred == succ || pred == key {
            continue;
        }
        let Some((at, p, s)) = coincident_pair(graph, key, pred, succ) else {
            continue;
        };

        trace!(?key, "collapsing degenerate edge");
        graph.remove_hit(key, at + 1);
        graph.remove_hit(key, at);
        if !graph.contains(pred, succ, p.second_t, s.second_t, tolerance) {
            graph.add(pred, succ, p.second_t, s.second_t);
        }
        graph.mark_collapsed(key);
        merged += 1;
    }
    merged
}

/// Consecutive crossings on `key` with `pred` and `succ` at the same point,
/// with the position of the first of the two.
fn coincident_pair(
    graph: &IntersectionGraph,
    key: EdgeKey,
    pred: EdgeKey,
    succ: EdgeKey,
) -> Option<(usize, EdgeIntersection, EdgeIntersection)> {
    let trajectory = graph.edge(key)?.trajectory();
    graph.hits(key).windows(2).enumerate().find_map(|(at, w)| {
        let (p, s) = if w[0].second == pred && w[1].second == succ {
            (w[0], w[1])
        } else if w[0].second == succ && w[1].second == pred {
            (w[1], w[0])
        } else {
            return None;
        };
        let gap = (trajectory.position(p.first_t) - trajectory.position(s.first_t)).norm();
        (gap <= POINT_TOLERANCE).then_some((at, p, s))
    })
}

/// Repeatedly removes edges left with a single crossing. Returns the number
/// of crossings removed.
pub fn drop_dangling(graph: &mut IntersectionGraph) -> usize {
    let mut removed = 0;
    loop {
        let Some(key) = graph
            .keys()
            .iter()
            .copied()
            .find(|&k| graph.hits(k).len() == 1)
        else {
            return removed;
        };
        removed += graph.clear_hits(key);
    }
}

/// Restricts every edge to the crossings between its neighbour crossings.
/// A collapsed edge has an empty window. Returns the number of crossings
/// removed.
pub fn prune_windows(graph: &mut IntersectionGraph) -> usize {
    let mut removed = 0;
    for key in graph.keys().to_vec() {
        if graph.is_collapsed(key) {
            removed += graph.clear_hits(key);
            continue;
        }
        match window(graph, key) {
            Some((lo, hi)) if lo <= hi => removed += graph.retain_window(key, lo, hi),
            // The neighbours cross in the wrong order: the edge is inverted.
            Some(_) => removed += graph.clear_hits(key),
            None => {}
        }
    }
    removed
}

/// Index range on `key` bounded by its predecessor and successor crossings.
fn window(graph: &IntersectionGraph, key: EdgeKey) -> Option<(usize, usize)> {
    let edge = graph.edge(key)?;
    let hits = graph.hits(key);
    let (pred, first) = neighbour_hit(graph, key, -1, edge.min_t)?;
    let (succ, last) = neighbour_hit(graph, key, 1, edge.max_t)?;
    if pred == succ {
        return None;
    }

    let full = first == 0 && last + 1 == hits.len();
    if hits.len() <= 3 || !full || first > last {
        return Some((first, last));
    }

    let inside: Vec<usize> = (0..hits.len())
        .filter(|&i| edge.in_main(hits[i].first_t, 0.0))
        .collect();
    let (Some(&lo), Some(&hi)) = (inside.first(), inside.last()) else {
        return Some((first, last));
    };

    Some(widen(graph, key, pred, succ, lo, hi))
}

/// Widens `[lo, hi]` by one crossing toward the neighbour meeting the edge
/// at the shallower angle.
fn widen(
    graph: &IntersectionGraph,
    key: EdgeKey,
    pred: EdgeKey,
    succ: EdgeKey,
    lo: usize,
    hi: usize,
) -> (usize, usize) {
    let hits = graph.hits(key);
    let can_lower = lo > 0;
    let can_raise = hi + 1 < hits.len();

    let (Some(edge), Some(p), Some(s)) = (graph.edge(key), graph.edge(pred), graph.edge(succ)) else {
        return (lo, hi);
    };
    let into = signed_angle(
        &p.trajectory().tangent(p.max_t),
        &edge.trajectory().tangent(edge.min_t),
    )
    .abs();
    let out = signed_angle(
        &edge.trajectory().tangent(edge.max_t),
        &s.trajectory().tangent(s.min_t),
    )
    .abs();

    let partner_in_main = |hit: &EdgeIntersection| {
        graph
            .edge(hit.second)
            .is_some_and(|e| e.in_main(hit.second_t, 0.0))
    };

    let toward_pred = if (into - out).abs() <= ANGLE_TIE {
        can_lower && partner_in_main(&hits[lo - 1])
    } else {
        into < out
    };

    if toward_pred && can_lower {
        (lo - 1, hi)
    } else if !toward_pred && can_raise {
        (lo, hi + 1)
    } else {
        (lo, hi)
    }
}

/// The nearest edge in direction `step` that crosses `key`, with the index
/// of the crossing on `key` closest to `anchor`.
fn neighbour_hit(
    graph: &IntersectionGraph,
    key: EdgeKey,
    step: isize,
    anchor: f64,
) -> Option<(EdgeKey, usize)> {
    let hits = graph.hits(key);
    #[allow(clippy::cast_possible_wrap)]
    let len = graph.len() as isize;
    (1..len)
        .filter_map(|k| graph.neighbour(key, k * step))
        .take_while(|&other| other != key)
        .find_map(|other| {
            hits.iter()
                .enumerate()
                .filter(|(_, h)| h.second == other)
                .min_by(|(_, a), (_, b)| {
                    (a.first_t - anchor)
                        .abs()
                        .total_cmp(&(b.first_t - anchor).abs())
                })
                .map(|(i, _)| (other, i))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::contour::Contour;
    use crate::math::Point2;
    use crate::operations::offset::discover::discover;
    use crate::operations::offset::moved_edge::MovedEdge;

    /// Unmoved square edges with short padding: main range `[1/3, 2/3]`.
    fn square_graph() -> IntersectionGraph {
        let square = Contour::from_points(&[
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ]);
        IntersectionGraph::new(
            square
                .iter()
                .map(|e| MovedEdge::build(e, 0.0, 10.0))
                .collect(),
        )
    }

    fn partners(graph: &IntersectionGraph, key: EdgeKey) -> Vec<EdgeKey> {
        graph.hits(key).iter().map(|h| h.second).collect()
    }

    #[test]
    fn dangling_edges_are_dropped_until_stable() {
        let mut g = square_graph();
        let k = g.keys().to_vec();
        g.add(k[0], k[1], 0.6, 0.4);
        g.add(k[1], k[2], 0.6, 0.4);
        g.add(k[2], k[3], 0.6, 0.4);
        // 0 and 3 hang off a chain; removing them exposes 1 and 2.
        assert_eq!(drop_dangling(&mut g), 3);
        assert!(k.iter().all(|&key| g.hits(key).is_empty()));
    }

    #[test]
    fn closed_chain_has_nothing_dangling() {
        let mut g = square_graph();
        discover(&mut g, 0.001);
        assert_eq!(drop_dangling(&mut g), 0);
        assert!(g.keys().iter().all(|&key| g.hits(key).len() == 2));
    }

    #[test]
    fn coincident_neighbour_crossings_are_merged() {
        let mut g = square_graph();
        let k = g.keys().to_vec();
        // Edge 1 is crossed by both neighbours at one point, and by edge 3
        // elsewhere.
        g.add(k[1], k[0], 0.5, 0.5);
        g.add(k[1], k[2], 0.5, 0.5);
        g.add(k[1], k[3], 0.55, 0.5);
        assert_eq!(merge_coincident_corners(&mut g, 0.001), 1);
        assert_eq!(partners(&g, k[1]), vec![k[3]]);
        assert_eq!(partners(&g, k[3]), vec![k[1]]);
        assert_eq!(partners(&g, k[0]), vec![k[2]]);
        assert!(g.is_collapsed(k[1]));

        // An existing direct crossing is not duplicated.
        let mut g = square_graph();
        let k = g.keys().to_vec();
        g.add(k[1], k[0], 0.5, 0.5);
        g.add(k[1], k[2], 0.5, 0.5);
        g.add(k[0], k[2], 0.5, 0.5);
        merge_coincident_corners(&mut g, 0.001);
        assert_eq!(g.hits(k[0]).len(), 1);
    }

    #[test]
    fn collapsed_edge_keeps_nothing_after_windowing() {
        let mut g = square_graph();
        let k = g.keys().to_vec();
        g.add(k[1], k[0], 0.5, 0.5);
        g.add(k[1], k[2], 0.5, 0.5);
        g.add(k[1], k[3], 0.55, 0.5);
        merge_coincident_corners(&mut g, 0.001);
        prune_windows(&mut g);
        assert!(g.hits(k[1]).is_empty());
        assert!(g.hits(k[3]).is_empty());
        assert_eq!(partners(&g, k[0]), vec![k[2]]);
    }

    #[test]
    fn distinct_neighbour_crossings_are_kept() {
        let mut g = square_graph();
        let k = g.keys().to_vec();
        g.add(k[1], k[0], 0.4, 0.6);
        g.add(k[1], k[2], 0.6, 0.4);
        assert_eq!(merge_coincident_corners(&mut g, 0.001), 0);
        assert_eq!(g.hits(k[1]).len(), 2);
    }

    #[test]
    fn window_drops_crossings_beyond_neighbours() {
        let mut g = square_graph();
        let k = g.keys().to_vec();
        g.add(k[0], k[2], 0.1, 0.5);
        g.add(k[0], k[3], 0.3, 0.6);
        g.add(k[0], k[1], 0.7, 0.4);
        assert_eq!(prune_windows(&mut g), 1);
        assert_eq!(partners(&g, k[0]), vec![k[3], k[1]]);
        assert!(partners(&g, k[2]).is_empty());
    }

    #[test]
    fn full_window_is_trimmed_to_main_range_then_widened() {
        let mut g = square_graph();
        let k = g.keys().to_vec();
        g.add(k[0], k[3], 0.1, 0.5);
        g.add(k[0], k[2], 0.4, 0.5);
        g.add(k[0], k[2], 0.5, 0.6);
        g.add(k[0], k[1], 0.9, 0.0);
        prune_windows(&mut g);
        // Right angles tie; the predecessor crossing sits in its own main
        // range, so the window grows back toward it.
        assert_eq!(partners(&g, k[0]), vec![k[3], k[2], k[2]]);
        assert!(g.hits(k[1]).is_empty());
    }

    #[test]
    fn inverted_edge_loses_all_crossings() {
        let mut g = square_graph();
        let k = g.keys().to_vec();
        g.add(k[0], k[1], 0.4, 0.5);
        g.add(k[0], k[3], 0.6, 0.5);
        prune_windows(&mut g);
        assert!(g.hits(k[0]).is_empty());
    }
}
