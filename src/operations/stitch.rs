use tracing::trace;

use crate::geometry::intersection::Intersection;

/// A directed piece of a result loop between two crossings.
///
/// Contour pieces follow the source boundary between the crossings; bridges
/// are straight connectors between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionPairEdge {
    pub from: Intersection,
    pub to: Intersection,
    pub is_contour: bool,
}

impl IntersectionPairEdge {
    #[must_use]
    pub fn contour(from: Intersection, to: Intersection) -> Self {
        Self {
            from,
            to,
            is_contour: true,
        }
    }

    #[must_use]
    pub fn bridge(from: Intersection, to: Intersection) -> Self {
        Self {
            from,
            to,
            is_contour: false,
        }
    }

    /// Same piece traversed the other way.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            is_contour: self.is_contour,
        }
    }
}

/// How consecutive pieces are matched while walking a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StitchMode {
    /// Each crossing is stored once per curve with its coordinates swapped,
    /// so the next piece must start at the exact reverse of the current end
    /// and must run forward along its curve.
    Offset,
    /// Crossings are shared values; a piece touching the current end at
    /// either side continues the loop, reversed if needed.
    Cut,
}

impl StitchMode {
    /// Whether a loop ending at `end` continues (or closes) at `start`.
    fn connects(self, end: &Intersection, start: &Intersection) -> bool {
        match self {
            Self::Offset => *start == end.reversed(),
            Self::Cut => start == end,
        }
    }
}

/// Walks the bag of pieces into closed loops.
///
/// Pieces are consumed as they are matched. Loops that fail to close or have
/// a single piece are dropped.
#[must_use]
pub fn connect(
    mut pieces: Vec<IntersectionPairEdge>,
    mode: StitchMode,
) -> Vec<Vec<IntersectionPairEdge>> {
    let mut loops = Vec::new();

    while !pieces.is_empty() {
        let first = pieces.remove(0);
        let mut chain = vec![first];
        let mut abandoned = false;

        loop {
            let end = chain[chain.len() - 1].to;
            let Some(next) = take_next(&mut pieces, &end, mode) else {
                break;
            };
            if mode == StitchMode::Offset && next.from.first_t > next.to.first_t {
                trace!(?next, "backward continuation, abandoning loop");
                abandoned = true;
                break;
            }
            chain.push(next);
        }

        let closed = mode.connects(&chain[chain.len() - 1].to, &chain[0].from);
        if !abandoned && chain.len() > 1 && closed {
            loops.push(chain);
        } else {
            trace!(pieces = chain.len(), closed, "dropping open loop");
        }
    }

    loops
}

/// Removes and returns the piece continuing from `end`, if any.
fn take_next(
    pieces: &mut Vec<IntersectionPairEdge>,
    end: &Intersection,
    mode: StitchMode,
) -> Option<IntersectionPairEdge> {
    match mode {
        StitchMode::Offset => {
            let idx = pieces.iter().position(|p| mode.connects(end, &p.from))?;
            Some(pieces.remove(idx))
        }
        StitchMode::Cut => {
            let idx = pieces
                .iter()
                .position(|p| p.from == *end || p.to == *end)?;
            let piece = pieces.remove(idx);
            Some(if piece.from == *end {
                piece
            } else {
                piece.reversed()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i(a: f64, b: f64) -> Intersection {
        Intersection::new(a, b)
    }

    #[test]
    fn offset_mode_follows_reversed_crossings() {
        // Square: crossing of edge k with edge k+1 is stored on both edges.
        let pieces = vec![
            IntersectionPairEdge::contour(i(0.1, 3.9), i(0.9, 1.1)),
            IntersectionPairEdge::contour(i(1.1, 0.9), i(1.9, 2.1)),
            IntersectionPairEdge::contour(i(2.1, 1.9), i(2.9, 3.1)),
            IntersectionPairEdge::contour(i(3.1, 2.9), i(3.9, 0.1)),
        ];
        let loops = connect(pieces, StitchMode::Offset);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 4);
    }

    #[test]
    fn offset_mode_abandons_backward_piece() {
        let pieces = vec![
            IntersectionPairEdge::contour(i(0.1, 1.9), i(0.9, 1.1)),
            IntersectionPairEdge::contour(i(1.1, 0.9), i(1.05, 0.1)),
        ];
        assert!(connect(pieces, StitchMode::Offset).is_empty());
    }

    #[test]
    fn cut_mode_reverses_bridges() {
        let a = i(0.25, 3.5);
        let b = i(0.75, 1.5);
        let pieces = vec![
            IntersectionPairEdge::contour(a, b),
            IntersectionPairEdge::bridge(a, b),
        ];
        let loops = connect(pieces, StitchMode::Cut);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0][1].from, b);
        assert_eq!(loops[0][1].to, a);
        assert!(!loops[0][1].is_contour);
    }

    #[test]
    fn open_chain_is_dropped() {
        let pieces = vec![
            IntersectionPairEdge::contour(i(0.0, 1.0), i(0.5, 2.0)),
            IntersectionPairEdge::bridge(i(0.5, 2.0), i(0.7, 3.0)),
        ];
        assert!(connect(pieces, StitchMode::Cut).is_empty());
    }

    #[test]
    fn single_piece_loop_is_dropped() {
        let a = i(0.0, 1.0);
        let pieces = vec![IntersectionPairEdge::contour(a, a)];
        assert!(connect(pieces, StitchMode::Cut).is_empty());
    }
}
