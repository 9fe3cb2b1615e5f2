// src/pulse.rs

use web_time::Instant;

use crate::geometry::{ConvexPolygon, Point2};

/// Milliseconds since construction. Backed by `performance.now()` on the web.
#[derive(Clone, Copy, Debug)]
pub struct PulseClock {
    started: Instant,
}

impl PulseClock {
    pub fn start() -> Self {
        Self { started: Instant::now() }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for PulseClock {
    fn default() -> Self {
        Self::start()
    }
}

/// Triangle wave in `[0, 1]`: 1 at phase 0 and 1, 0 at phase 0.5.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseWave {
    pub period_ms: f64,
}

impl PulseWave {
    pub fn new(period_ms: f64) -> Self {
        Self { period_ms }
    }

    pub fn phase(&self, clock_ms: f64) -> f64 {
        (clock_ms / self.period_ms).rem_euclid(1.0)
    }

    pub fn at(&self, clock_ms: f64) -> f64 {
        (2.0 * (self.phase(clock_ms) - 0.5)).abs()
    }
}

/// Pushes each polygon away from the origin by `centroid * pulse * scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BreathingTransform {
    pub scale: f64,
}

impl BreathingTransform {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    pub fn displacement(&self, polygon: &ConvexPolygon, pulse: f64) -> Point2 {
        polygon.centroid().scale(pulse * self.scale)
    }

    pub fn apply(&self, polygon: &ConvexPolygon, pulse: f64) -> Vec<Point2> {
        let offset = self.displacement(polygon, pulse);
        polygon.vertices().iter().map(|v| v.add(&offset)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pulse_hits_its_extremes() {
        let wave = PulseWave::new(5000.0);
        assert_relative_eq!(wave.at(0.0), 1.0);
        assert_relative_eq!(wave.at(2500.0), 0.0);
        assert_relative_eq!(wave.at(1250.0), 0.5);
        assert_relative_eq!(wave.at(3750.0), 0.5);
        assert_relative_eq!(wave.at(10_000.0), 1.0);
    }

    #[test]
    fn pulse_stays_in_unit_range() {
        let wave = PulseWave::new(777.0);
        for step in 0..2000 {
            let p = wave.at(step as f64 * 3.3);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn clock_never_runs_backwards() {
        let clock = PulseClock::start();
        let mut last = clock.elapsed_ms();
        assert!(last >= 0.0);
        for _ in 0..1000 {
            let now = clock.elapsed_ms();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn zero_pulse_is_identity() {
        let square = ConvexPolygon::reference_square();
        let transform = BreathingTransform::new(0.5);
        assert_eq!(transform.apply(&square, 0.0), square.vertices().to_vec());
    }

    #[test]
    fn full_pulse_moves_by_scaled_centroid() {
        let triangle = ConvexPolygon::from_points(&[
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(0.0, 3.0),
        ])
        .unwrap();
        let transform = BreathingTransform::new(0.5);
        let moved = transform.apply(&triangle, 1.0);
        for (before, after) in triangle.vertices().iter().zip(&moved) {
            assert_relative_eq!(after.x - before.x, 0.5);
            assert_relative_eq!(after.y - before.y, 0.5);
        }
    }
}
