mod cleanup;
mod discover;
mod graph;
mod moved_edge;

pub use graph::{EdgeIntersection, EdgeKey, IntersectionGraph, MovedEdgeIntersections};
pub use moved_edge::MovedEdge;

use tracing::{debug, trace};

use crate::error::{ensure_finite, OperationError, Result};
use crate::geometry::contour::{is_full_turn, Contour, ContourGroup, Edge};
use crate::geometry::intersection::DEFAULT_RELATIVE_TOLERANCE;

use super::stitch::{self, IntersectionPairEdge, StitchMode};

/// Tunables for [`ContourOffset`].
#[derive(Debug, Clone, Copy)]
pub struct OffsetOptions {
    /// How far moved edges are extended past their ends.
    pub padding: f64,
    /// Result pieces shorter than this are dropped.
    pub min_piece_length: f64,
    /// Relative tolerance for treating two crossings as the same.
    pub relative_tolerance: f64,
}

impl Default for OffsetOptions {
    fn default() -> Self {
        Self {
            padding: 100.0,
            min_piece_length: 0.05,
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
        }
    }
}

impl OffsetOptions {
    fn validate(&self) -> Result<()> {
        let checks = [
            ("padding", self.padding),
            ("min_piece_length", self.min_piece_length),
            ("relative_tolerance", self.relative_tolerance),
        ];
        for (option, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(OperationError::InvalidOption {
                    option,
                    reason: "must be finite and non-negative",
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Insets a contour, moving ordinary edges by `line_offset` and enter edges
/// by `median_offset`.
///
/// Positive offsets move edges toward the interior whichever way the contour
/// winds. Corners that cross after moving are resolved, so a contour with a
/// narrow neck can come back as several contours.
#[derive(Debug)]
pub struct ContourOffset {
    contour: Contour,
    line_offset: f64,
    median_offset: f64,
    options: OffsetOptions,
}

impl ContourOffset {
    /// Creates a new offset operation.
    #[must_use]
    pub fn new(contour: Contour, line_offset: f64, median_offset: f64) -> Self {
        Self {
            contour,
            line_offset,
            median_offset,
            options: OffsetOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: OffsetOptions) -> Self {
        self.options = options;
        self
    }

    /// Executes the offset.
    ///
    /// When neither offset is positive the input comes back unchanged.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::NonFinite` for a NaN or infinite offset and
    /// `OperationError::InvalidOption` for invalid options.
    pub fn execute(&self) -> Result<ContourGroup> {
        ensure_finite("line_offset", self.line_offset)?;
        ensure_finite("median_offset", self.median_offset)?;
        self.options.validate()?;

        if self.line_offset <= 0.0 && self.median_offset <= 0.0 {
            return Ok(std::iter::once(self.contour.clone()).collect());
        }
        if self.contour.len() < 2 {
            return Ok(ContourGroup::new());
        }

        let winding = self.contour.direction();
        let moved: Vec<MovedEdge> = self
            .contour
            .iter()
            .map(|edge| {
                let offset = if edge.is_enter() {
                    self.median_offset
                } else {
                    self.line_offset
                };
                MovedEdge::build(edge, winding.sign() * offset, self.options.padding)
            })
            .collect();

        let tolerance = self.options.relative_tolerance;
        let mut graph = IntersectionGraph::new(moved);
        let crossings = discover::discover(&mut graph, tolerance);
        cleanup::run(&mut graph, tolerance);

        let pieces = graph.pieces();
        trace!(pieces = pieces.len(), "offset pieces built");

        let mut group = ContourGroup::new();
        for chain in stitch::connect(pieces, StitchMode::Offset) {
            let contour = self.materialize(&graph, &chain);
            if contour.len() < 2 {
                continue;
            }
            let turn = contour.total_turn();
            if !is_full_turn(turn) || contour.direction() != winding {
                trace!(edges = contour.len(), turn, "dropping inverted loop");
                continue;
            }
            group.push(contour);
        }

        debug!(
            edges = self.contour.len(),
            crossings,
            results = group.len(),
            "offset finished"
        );
        Ok(group)
    }

    /// Cuts each moved trajectory to the range between its two crossings.
    fn materialize(&self, graph: &IntersectionGraph, chain: &[IntersectionPairEdge]) -> Contour {
        let mut contour = Contour::new();
        for piece in chain {
            let Some((index, t0, t1)) = local_range(graph.len(), piece) else {
                continue;
            };
            let Some(moved) = graph.keys().get(index).and_then(|&k| graph.edge(k)) else {
                continue;
            };
            let is_enter = moved.edge.is_enter();
            contour.extend(
                moved
                    .trajectory()
                    .cut(t0, t1)
                    .split_pieces(self.options.min_piece_length)
                    .into_iter()
                    .map(|t| Edge::new(t, is_enter)),
            );
        }
        contour
    }
}

/// Edge index and local parameters of a piece with global coordinates.
fn local_range(edges: usize, piece: &IntersectionPairEdge) -> Option<(usize, f64, f64)> {
    if edges == 0 {
        return None;
    }
    let mid = 0.5 * (piece.from.first_t + piece.to.first_t);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (mid.floor().max(0.0) as usize).min(edges - 1);
    #[allow(clippy::cast_precision_loss)]
    let base = index as f64;
    Some((index, piece.from.first_t - base, piece.to.first_t - base))
}

/// Insets `contour` by the given offsets with default options.
///
/// # Errors
///
/// See [`ContourOffset::execute`].
pub fn offset(contour: &Contour, line_offset: f64, median_offset: f64) -> Result<ContourGroup> {
    ContourOffset::new(contour.clone(), line_offset, median_offset).execute()
}
