// src/chord.rs

use log::warn;
use rand::Rng;

use crate::error::{ShatterError, ShatterResult};
use crate::geometry::{ConvexPolygon, LineCoefficients, Point2, POINT_EPSILON};

/// A straight cutting line, given by two points on it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chord {
    pub start: Point2,
    pub end: Point2,
}

impl Chord {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    pub fn coefficients(&self) -> LineCoefficients {
        LineCoefficients::through(&self.start, &self.end)
    }

    /// Vertical chords, coincident endpoints and non-finite input cannot be
    /// expressed in slope-intercept form and are never used for cutting.
    pub fn is_degenerate(&self) -> bool {
        !self.start.is_finite()
            || !self.end.is_finite()
            || self.start.approx_eq(&self.end, POINT_EPSILON)
            || !self.coefficients().is_finite()
    }
}

/// Draws random chords between two distinct sides of a fixed reference
/// polygon. Degenerate draws are discarded and re-drawn.
#[derive(Clone, Debug)]
pub struct ChordSampler {
    reference: ConvexPolygon,
    midpoint_bias: u32,
    max_attempts: usize,
}

impl ChordSampler {
    pub const DEFAULT_MAX_ATTEMPTS: usize = 64;

    pub fn new(reference: ConvexPolygon) -> Self {
        Self {
            reference,
            midpoint_bias: 1,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_midpoint_bias(mut self, midpoint_bias: u32) -> Self {
        self.midpoint_bias = midpoint_bias.max(1);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn reference(&self) -> &ConvexPolygon {
        &self.reference
    }

    /// One draw, degenerate or not.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Chord {
        let sides = self.reference.count();
        let first = rng.gen_range(0..sides);
        let second = (first + 1 + rng.gen_range(0..sides - 1)) % sides;
        Chord::new(
            self.reference.edge(first).random_point(rng, self.midpoint_bias),
            self.reference.edge(second).random_point(rng, self.midpoint_bias),
        )
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShatterResult<Chord> {
        for attempt in 1..=self.max_attempts {
            let chord = self.draw(rng);
            if !chord.is_degenerate() {
                return Ok(chord);
            }
            warn!("Discarding degenerate chord {:?} (attempt {})", chord, attempt);
        }
        Err(ShatterError::DegenerateChord {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn vertical_chord_is_degenerate() {
        let chord = Chord::new(Point2::new(0.25, -1.0), Point2::new(0.25, 1.0));
        assert!(chord.is_degenerate());
    }

    #[test]
    fn point_chord_is_degenerate() {
        let p = Point2::new(0.5, 0.5);
        assert!(Chord::new(p, p).is_degenerate());
    }

    #[test]
    fn sampled_chords_join_two_distinct_reference_sides() {
        let sampler = ChordSampler::new(ConvexPolygon::reference_square());
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let chord = sampler.sample(&mut rng).unwrap();
            assert!(!chord.is_degenerate());
            let sides_of = |p: &Point2| -> Vec<usize> {
                sampler
                    .reference()
                    .edges()
                    .enumerate()
                    .filter(|(_, e)| {
                        e.bounds_contain(p)
                            && (e.coefficients().y_at(p.x) - p.y).abs() < 1e-9
                    })
                    .map(|(i, _)| i)
                    .collect()
            };
            let a = sides_of(&chord.start);
            let b = sides_of(&chord.end);
            assert!(!a.is_empty() && !b.is_empty());
            assert!(a.iter().any(|i| !b.contains(i)) || b.iter().any(|i| !a.contains(i)));
        }
    }

    #[test]
    fn vertical_only_reference_exhausts_attempts() {
        // Both sides of this sliver are vertical and share an x, so every
        // chord between them is vertical too.
        let sliver = ConvexPolygon::from_points(&[
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(0.0, 2.0),
        ])
        .unwrap();
        let sampler = ChordSampler::new(sliver).with_max_attempts(5);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            sampler.sample(&mut rng),
            Err(ShatterError::DegenerateChord { attempts: 5 })
        );
    }
}
