use tracing::trace;

use crate::geometry::intersect::calculate;
use crate::geometry::intersection::approx_eq;

use super::graph::IntersectionGraph;
use super::moved_edge::MovedEdge;

/// Finds crossings between every pair of moved edges and records them in
/// `graph`. Returns the number of crossings recorded.
pub fn discover(graph: &mut IntersectionGraph, tolerance: f64) -> usize {
    let keys = graph.keys().to_vec();
    let n = keys.len();
    let mut total = 0;

    for i in 0..n {
        for j in (i + 1)..n {
            let found = {
                let (Some(a), Some(b)) = (graph.edge(keys[i]), graph.edge(keys[j])) else {
                    continue;
                };
                if !a.moved && !b.moved && (j == i + 1 || (i == 0 && j == n - 1)) {
                    shared_corners(a, b, i, j, n)
                } else {
                    solve(a, b, tolerance)
                }
            };
            total += found.len();
            for (ta, tb) in found {
                graph.add(keys[i], keys[j], ta, tb);
            }
        }
    }

    trace!(edges = n, crossings = total, "offset crossings discovered");
    total
}

/// Unmoved neighbours still meet at their original corner.
fn shared_corners(a: &MovedEdge, b: &MovedEdge, i: usize, j: usize, n: usize) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    if j == i + 1 {
        out.push((a.max_t, b.min_t));
    }
    if i == 0 && j == n - 1 {
        out.push((a.min_t, b.max_t));
    }
    out
}

/// Crossings of the main parts first; the padded trajectories are only
/// consulted when that finds nothing usable.
fn solve(a: &MovedEdge, b: &MovedEdge, tolerance: f64) -> Vec<(f64, f64)> {
    let mut found: Vec<(f64, f64)> = calculate(&a.main(), &b.main())
        .into_iter()
        .map(|h| (a.main_to_full(h.first_t), b.main_to_full(h.second_t)))
        .collect();

    let usable = !found.is_empty()
        && found
            .iter()
            .all(|&(ta, tb)| a.in_main(ta, 0.0) && b.in_main(tb, 0.0));
    if usable {
        return found;
    }

    for hit in calculate(a.trajectory(), b.trajectory()) {
        let known = found.iter().any(|&(ta, tb)| {
            approx_eq(ta, hit.first_t, tolerance) && approx_eq(tb, hit.second_t, tolerance)
        });
        if !known {
            found.push((hit.first_t, hit.second_t));
        }
    }
    found
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::contour::Edge;
    use crate::geometry::trajectory::Trajectory;
    use crate::math::Point2;
    use approx::assert_abs_diff_eq;

    fn moved(a: (f64, f64), b: (f64, f64), shift: f64) -> MovedEdge {
        let edge = Edge::line(Trajectory::straight(
            Point2::new(a.0, a.1),
            Point2::new(b.0, b.1),
        ));
        MovedEdge::build(&edge, shift, 100.0)
    }

    #[test]
    fn unmoved_neighbours_meet_at_their_corner() {
        let mut g = IntersectionGraph::new(vec![
            moved((0.0, 0.0), (10.0, 0.0), 0.0),
            moved((10.0, 0.0), (0.0, 10.0), 0.0),
            moved((0.0, 10.0), (0.0, 0.0), 0.0),
        ]);
        assert_eq!(discover(&mut g, 0.001), 3);
        let k = g.keys().to_vec();
        let first = g.edge(k[0]).unwrap();
        let hits = g.hits(k[0]);
        assert_eq!(hits[0].first_t, first.min_t);
        assert_eq!(hits[0].second, k[2]);
        assert_eq!(hits[1].first_t, first.max_t);
        assert_eq!(hits[1].second, k[1]);
    }

    #[test]
    fn moved_corner_is_found_on_main_parts() {
        let mut g = IntersectionGraph::new(vec![
            moved((0.0, 0.0), (10.0, 0.0), 1.0),
            moved((10.0, 0.0), (10.0, 10.0), 1.0),
        ]);
        discover(&mut g, 0.001);
        let k = g.keys().to_vec();
        let hit = g.hits(k[0])[0];
        let p = g.edge(k[0]).unwrap().trajectory().position(hit.first_t);
        assert_abs_diff_eq!(p, Point2::new(9.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn separated_ends_are_joined_through_padding() {
        // After an outward shift the two edges no longer touch.
        let mut g = IntersectionGraph::new(vec![
            moved((0.0, 0.0), (10.0, 0.0), -1.0),
            moved((10.0, 0.0), (10.0, 10.0), -1.0),
        ]);
        discover(&mut g, 0.001);
        let k = g.keys().to_vec();
        let hits = g.hits(k[0]);
        assert_eq!(hits.len(), 1);
        let a = g.edge(k[0]).unwrap();
        assert!(!a.in_main(hits[0].first_t, 0.0));
        let p = a.trajectory().position(hits[0].first_t);
        assert_abs_diff_eq!(p, Point2::new(11.0, -1.0), epsilon = 1e-9);
    }
}
