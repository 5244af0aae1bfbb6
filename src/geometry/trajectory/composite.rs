use super::Trajectory;

/// A chain of trajectories traversed one after another.
///
/// Each of the `n` parts owns an equal slice `[i / n, (i + 1) / n]` of the
/// parameter domain, so a composite parameter encodes both the part index and
/// the local parameter inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeTrajectory {
    parts: Vec<Trajectory>,
}

impl CompositeTrajectory {
    /// Creates a composite from its parts.
    ///
    /// Returns `None` for an empty part list.
    #[must_use]
    pub fn new(parts: Vec<Trajectory>) -> Option<Self> {
        if parts.is_empty() {
            None
        } else {
            Some(Self { parts })
        }
    }

    #[must_use]
    pub fn parts(&self) -> &[Trajectory] {
        &self.parts
    }

    #[must_use]
    pub fn into_parts(self) -> Vec<Trajectory> {
        self.parts
    }

    /// Maps a composite parameter to `(part index, local parameter)`.
    ///
    /// Parameters below 0 or above 1 extrapolate the first or last part.
    #[must_use]
    pub fn locate(&self, t: f64) -> (usize, f64) {
        let n = self.parts.len();
        #[allow(clippy::cast_precision_loss)]
        let scaled = t * n as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = if scaled <= 0.0 {
            0
        } else {
            (scaled.floor() as usize).min(n - 1)
        };
        #[allow(clippy::cast_precision_loss)]
        let local = scaled - index as f64;
        (index, local)
    }

    /// Maps a local parameter on part `index` back to the composite domain.
    #[must_use]
    pub fn global(&self, index: usize, local: f64) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let n = self.parts.len() as f64;
        #[allow(clippy::cast_precision_loss)]
        let i = index as f64;
        (i + local) / n
    }

    pub(super) fn part_at(&self, t: f64) -> (&Trajectory, f64) {
        let (i, local) = self.locate(t);
        (&self.parts[i], local)
    }

    #[must_use]
    pub fn first(&self) -> &Trajectory {
        &self.parts[0]
    }

    #[must_use]
    pub fn last(&self) -> &Trajectory {
        &self.parts[self.parts.len() - 1]
    }

    pub(super) fn cut(&self, t0: f64, t1: f64) -> Trajectory {
        if t0 > t1 {
            return self.cut(t1, t0).reversed();
        }
        let (i0, l0) = self.locate(t0);
        let (mut i1, mut l1) = self.locate(t1);
        if i1 > i0 && l1 <= 0.0 {
            i1 -= 1;
            l1 = 1.0;
        }
        if i0 == i1 {
            return self.parts[i0].cut(l0, l1);
        }
        let mut parts = Vec::with_capacity(i1 - i0 + 1);
        parts.push(self.parts[i0].cut(l0, 1.0));
        parts.extend(self.parts[i0 + 1..i1].iter().cloned());
        parts.push(self.parts[i1].cut(0.0, l1));
        Trajectory::Composite(Self { parts })
    }

    /// Shifts every part, interpolating the offset by arc length so the
    /// joints stay connected.
    pub(super) fn shift(&self, start_offset: f64, end_offset: f64) -> Self {
        let lengths: Vec<f64> = self.parts.iter().map(Trajectory::length).collect();
        let total: f64 = lengths.iter().sum();
        let mut walked = 0.0;
        let offset_at = |distance: f64| {
            if total > 0.0 {
                start_offset + (end_offset - start_offset) * distance / total
            } else {
                start_offset
            }
        };
        let parts = self
            .parts
            .iter()
            .zip(&lengths)
            .map(|(part, len)| {
                let a = offset_at(walked);
                walked += len;
                part.shift(a, offset_at(walked))
            })
            .collect();
        Self { parts }
    }

    pub(super) fn reversed(&self) -> Self {
        Self {
            parts: self.parts.iter().rev().map(Trajectory::reversed).collect(),
        }
    }
}
