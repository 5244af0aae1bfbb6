use tracing::debug;

use crate::error::{OperationError, Result};
use crate::geometry::contour::{Contour, ContourGroup, Edge};
use crate::geometry::intersect::{calculate, get_side, Side};
use crate::geometry::intersection::{Intersection, IntersectionOrder};
use crate::geometry::trajectory::Trajectory;
use crate::math::Point2;

use super::stitch::{self, IntersectionPairEdge, StitchMode};

/// Local parameters this close to an edge end snap onto it, so a crossing
/// through a vertex is found once.
const VERTEX_SNAP: f64 = 1e-9;

/// Global parameter step past the first crossing where the contour is
/// classified against the cutter.
const SIDE_STEP: f64 = 1e-4;

/// Tunables for [`ContourCut`].
#[derive(Debug, Clone, Copy)]
pub struct CutOptions {
    /// Result pieces shorter than this are dropped.
    pub min_piece_length: f64,
}

impl Default for CutOptions {
    fn default() -> Self {
        Self {
            min_piece_length: 0.05,
        }
    }
}

/// Keeps the part of a contour lying on one side of a cutting curve.
#[derive(Debug)]
pub struct ContourCut {
    contour: Contour,
    line: Trajectory,
    side: Side,
    options: CutOptions,
}

impl ContourCut {
    /// Creates a new cut operation.
    #[must_use]
    pub fn new(contour: Contour, line: Trajectory, side: Side) -> Self {
        Self {
            contour,
            line,
            side,
            options: CutOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: CutOptions) -> Self {
        self.options = options;
        self
    }

    /// Executes the cut, returning every closed region on the requested side.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidOption` for a negative or non-finite
    /// minimum piece length.
    pub fn execute(&self) -> Result<ContourGroup> {
        let min = self.options.min_piece_length;
        if !min.is_finite() || min < 0.0 {
            return Err(OperationError::InvalidOption {
                option: "min_piece_length",
                reason: "must be finite and non-negative",
            }
            .into());
        }

        if self.contour.len() < 2 {
            return Ok(ContourGroup::new());
        }

        let hits = if self.contour.can_intersect(&self.line, false) {
            find_intersections(&self.contour, &self.line)
        } else {
            Vec::new()
        };
        debug!(edges = self.contour.len(), hits = hits.len(), side = ?self.side, "cutting contour");

        if hits.len() <= 1 {
            return Ok(self.classify_whole());
        }

        let pieces = self.build_pieces(hits);
        let forward: Vec<IntersectionPairEdge> =
            pieces.iter().filter(|p| p.is_contour).copied().collect();

        let mut group = ContourGroup::new();
        for chain in stitch::connect(pieces, StitchMode::Cut) {
            let contour = self.materialize(&chain, &forward);
            if contour.len() > 1 {
                group.push(contour);
            }
        }
        debug!(results = group.len(), "cut finished");
        Ok(group)
    }

    /// The whole contour, or nothing, depending on which half-plane of the
    /// cutter's start it lies in.
    fn classify_whole(&self) -> ContourGroup {
        #[allow(clippy::cast_precision_loss)]
        let count = self.contour.len() as f64;
        let sum = self
            .contour
            .iter()
            .fold(Point2::origin().coords, |acc, e| {
                acc + e.trajectory().start_position().coords
            });
        let sample = Point2::from(sum / count);
        let side = get_side(
            &self.line.start_direction(),
            &(sample - self.line.start_position()),
        );
        let mut group = ContourGroup::new();
        if side == self.side {
            group.push(self.contour.clone());
        }
        group
    }

    /// Bridges along the cutter plus the contour spans to keep.
    fn build_pieces(&self, hits: Vec<Intersection>) -> Vec<IntersectionPairEdge> {
        let mut line_order = hits.clone();
        IntersectionOrder::First.sort(&mut line_order);
        let mut contour_order = hits;
        IntersectionOrder::Second.sort(&mut contour_order);

        let first = contour_order[0];
        let step = (0.5 * (contour_order[1].second_t - first.second_t)).min(SIDE_STEP);
        let sample = self.contour.position(first.second_t + step);
        let after_first = get_side(
            &self.line.tangent(first.first_t),
            &(sample - self.line.position(first.first_t)),
        );

        let m = contour_order.len();
        let start = usize::from(after_first != self.side);
        let mut pieces: Vec<IntersectionPairEdge> = (start..m)
            .step_by(2)
            .filter_map(|k| {
                if k + 1 < m {
                    Some(IntersectionPairEdge::contour(
                        contour_order[k],
                        contour_order[k + 1],
                    ))
                } else if start == 1 {
                    Some(IntersectionPairEdge::contour(contour_order[k], contour_order[0]))
                } else {
                    None
                }
            })
            .collect();
        pieces.extend(
            line_order
                .chunks_exact(2)
                .map(|pair| IntersectionPairEdge::bridge(pair[0], pair[1])),
        );
        pieces
    }

    fn materialize(&self, chain: &[IntersectionPairEdge], forward: &[IntersectionPairEdge]) -> Contour {
        let min = self.options.min_piece_length;
        let mut contour = Contour::new();
        for piece in chain {
            if piece.is_contour {
                if forward.contains(piece) {
                    contour.extend(contour_span(&self.contour, piece.from.second_t, piece.to.second_t, min));
                } else {
                    let span = contour_span(&self.contour, piece.to.second_t, piece.from.second_t, min);
                    contour.extend(
                        span.into_iter()
                            .rev()
                            .map(|e| e.with_trajectory(e.trajectory().reversed())),
                    );
                }
            } else {
                let start = self.contour.position(piece.from.second_t);
                let end = self.contour.position(piece.to.second_t);
                if (end - start).norm() >= min {
                    contour.push(Edge::line(Trajectory::straight(start, end)));
                }
            }
        }
        contour
    }
}

/// Crossings of `line` with every edge: `first_t` on the line, `second_t`
/// the global contour parameter. Crossings at a shared vertex collapse into
/// one.
#[must_use]
pub fn find_intersections(contour: &Contour, line: &Trajectory) -> Vec<Intersection> {
    #[allow(clippy::cast_precision_loss)]
    let n = contour.len() as f64;
    let mut hits = Vec::new();
    for (index, edge) in contour.iter().enumerate() {
        for hit in calculate(line, edge.trajectory()) {
            let local = if hit.second_t < VERTEX_SNAP {
                0.0
            } else if hit.second_t > 1.0 - VERTEX_SNAP {
                1.0
            } else {
                hit.second_t
            };
            #[allow(clippy::cast_precision_loss)]
            let global = (index as f64 + local) % n;
            hits.push(Intersection::new(hit.first_t, global));
        }
    }
    IntersectionOrder::Second.sort(&mut hits);
    hits.dedup_by(|a, b| a.second_t == b.second_t);
    hits
}

/// Edges covering the contour from global parameter `from` forward to `to`,
/// wrapping past the last edge. Pieces shorter than `min_length` are dropped.
fn contour_span(contour: &Contour, from: f64, to: f64, min_length: f64) -> Vec<Edge> {
    #[allow(clippy::cast_precision_loss)]
    let n = contour.len() as f64;
    let (mut index, mut local) = contour.locate(from);
    let mut edge_start = from - local;
    let end = if to <= from { to + n } else { to };

    let mut out = Vec::new();
    loop {
        let stop = end.min(edge_start + 1.0);
        let local_end = stop - edge_start;
        if local_end > local {
            let edge = &contour.edges()[index];
            let piece = edge.trajectory().cut(local, local_end);
            out.extend(
                piece
                    .split_pieces(min_length)
                    .into_iter()
                    .map(|t| edge.with_trajectory(t)),
            );
        }
        if stop >= end {
            break;
        }
        index = (index + 1) % contour.len();
        local = 0.0;
        edge_start += 1.0;
    }
    out
}
