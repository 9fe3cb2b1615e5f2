// src/generator.rs

use std::collections::VecDeque;

use log::{debug, info};
use rand::Rng;

use crate::chord::ChordSampler;
use crate::config::{ShatterConfig, SubdivisionStrategy};
use crate::error::{ShatterError, ShatterResult};
use crate::geometry::{ConvexPolygon, Shape};
use crate::splitter::{ChordSplitter, TriangleSplitter};

/// Cut attempts allowed per requested shape before the per-shape driver
/// gives up.
const STALL_FACTOR: usize = 1000;

/// The finished tiling. Built once, read-only afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct CellSet {
    cells: Vec<Shape>,
}

impl CellSet {
    pub fn cells(&self) -> &[Shape] {
        &self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Shape> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn total_area(&self) -> f64 {
        self.cells.iter().map(|c| c.polygon().area()).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.cells.iter().map(|c| c.polygon().count()).sum()
    }
}

impl<'a> IntoIterator for &'a CellSet {
    type Item = &'a Shape;
    type IntoIter = std::slice::Iter<'a, Shape>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

pub struct CellGenerator {
    strategy: SubdivisionStrategy,
    midpoint_bias: u32,
    max_chord_attempts: usize,
    stall_factor: usize,
}

impl CellGenerator {
    pub fn new(strategy: SubdivisionStrategy) -> Self {
        Self {
            strategy,
            midpoint_bias: 1,
            max_chord_attempts: ChordSampler::DEFAULT_MAX_ATTEMPTS,
            stall_factor: STALL_FACTOR,
        }
    }

    pub fn from_config(config: &ShatterConfig) -> Self {
        Self::new(config.strategy)
            .with_midpoint_bias(config.midpoint_bias)
            .with_max_chord_attempts(config.max_chord_attempts)
    }

    pub fn with_midpoint_bias(mut self, midpoint_bias: u32) -> Self {
        self.midpoint_bias = midpoint_bias.max(1);
        self
    }

    pub fn with_max_chord_attempts(mut self, max_chord_attempts: usize) -> Self {
        self.max_chord_attempts = max_chord_attempts.max(1);
        self
    }

    #[cfg(test)]
    pub(crate) fn with_stall_factor(mut self, stall_factor: usize) -> Self {
        self.stall_factor = stall_factor;
        self
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> ShatterResult<CellSet> {
        let cells = match self.strategy {
            SubdivisionStrategy::GlobalRounds { rounds } => self.global_rounds(rounds, rng)?,
            SubdivisionStrategy::PerShape { target } => self.per_shape(target, rng)?,
            SubdivisionStrategy::Triangles { target } => self.triangles(target, rng)?,
        };
        let set = CellSet { cells };
        info!(
            "Generated {} cells ({} vertices) with strategy {}",
            set.len(),
            set.vertex_count(),
            self.strategy
        );
        Ok(set)
    }

    fn sampler(&self) -> ChordSampler {
        ChordSampler::new(ConvexPolygon::reference_square())
            .with_midpoint_bias(self.midpoint_bias)
            .with_max_attempts(self.max_chord_attempts)
    }

    fn global_rounds<R: Rng + ?Sized>(&self, rounds: usize, rng: &mut R) -> ShatterResult<Vec<Shape>> {
        let sampler = self.sampler();
        let mut shapes = vec![Shape::with_random_color(sampler.reference().clone(), rng)];

        for round in 0..rounds {
            let chord = sampler.sample(rng)?;
            let mut next: Vec<Shape> = Vec::with_capacity(shapes.len() + 1);
            for shape in shapes {
                ChordSplitter::split(shape, &chord, rng).push_into(&mut next);
            }
            debug!("Round {}: {} shapes", round + 1, next.len());
            shapes = next;
        }

        Ok(shapes)
    }

    fn per_shape<R: Rng + ?Sized>(&self, target: usize, rng: &mut R) -> ShatterResult<Vec<Shape>> {
        let sampler = self.sampler();
        let mut queue = VecDeque::with_capacity(target + 1);
        queue.push_back(Shape::with_random_color(sampler.reference().clone(), rng));

        let budget = target.saturating_mul(self.stall_factor);
        let mut attempts = 0;
        while queue.len() < target {
            attempts += 1;
            if attempts > budget {
                return Err(ShatterError::GenerationStalled { target, attempts: budget });
            }
            let Some(shape) = queue.pop_front() else {
                break;
            };
            let chord = sampler.sample(rng)?;
            ChordSplitter::split(shape, &chord, rng).push_into(&mut queue);
        }
        debug!("Reached {} shapes after {} cut attempts", queue.len(), attempts);

        Ok(queue.into())
    }

    fn triangles<R: Rng + ?Sized>(&self, target: usize, rng: &mut R) -> ShatterResult<Vec<Shape>> {
        let mut queue: VecDeque<Shape> = ConvexPolygon::triangle_pair()
            .into_iter()
            .map(|triangle| Shape::with_random_color(triangle, &mut *rng))
            .collect();

        while queue.len() < target {
            let Some(shape) = queue.pop_front() else {
                break;
            };
            TriangleSplitter::split(shape, rng, self.midpoint_bias)?.push_into(&mut queue);
        }

        Ok(queue.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn zero_rounds_leaves_the_seed() {
        let mut rng = StdRng::seed_from_u64(1);
        let cells = CellGenerator::new(SubdivisionStrategy::GlobalRounds { rounds: 0 })
            .generate(&mut rng)
            .unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells.cells()[0].polygon(), &ConvexPolygon::reference_square());
    }

    #[test]
    fn global_rounds_stay_within_bounds() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rounds = 6;
            let cells = CellGenerator::new(SubdivisionStrategy::GlobalRounds { rounds })
                .generate(&mut rng)
                .unwrap();
            assert!(cells.len() >= 1 && cells.len() <= 1 << rounds);
            assert_relative_eq!(cells.total_area(), 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn per_shape_hits_target_exactly() {
        let mut rng = StdRng::seed_from_u64(2);
        let cells = CellGenerator::new(SubdivisionStrategy::PerShape { target: 40 })
            .generate(&mut rng)
            .unwrap();
        assert_eq!(cells.len(), 40);
        assert_relative_eq!(cells.total_area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn per_shape_target_of_one_is_the_seed() {
        let mut rng = StdRng::seed_from_u64(3);
        let cells = CellGenerator::new(SubdivisionStrategy::PerShape { target: 1 })
            .generate(&mut rng)
            .unwrap();
        assert_eq!(cells.len(), 1);
    }

    #[test]
    fn per_shape_reports_a_stall_when_the_budget_runs_out() {
        let mut rng = StdRng::seed_from_u64(5);
        let result = CellGenerator::new(SubdivisionStrategy::PerShape { target: 2 })
            .with_stall_factor(0)
            .generate(&mut rng);
        assert_eq!(
            result,
            Err(ShatterError::GenerationStalled { target: 2, attempts: 0 })
        );
    }

    #[test]
    fn per_shape_stall_budget_does_not_trip_on_a_normal_run() {
        let mut rng = StdRng::seed_from_u64(6);
        let cells = CellGenerator::new(SubdivisionStrategy::PerShape { target: 25 })
            .with_stall_factor(STALL_FACTOR)
            .generate(&mut rng)
            .unwrap();
        assert_eq!(cells.len(), 25);
    }

    #[test]
    fn triangles_hit_target_and_stay_triangles() {
        let mut rng = StdRng::seed_from_u64(4);
        let cells = CellGenerator::new(SubdivisionStrategy::Triangles { target: 33 })
            .with_midpoint_bias(3)
            .generate(&mut rng)
            .unwrap();
        assert_eq!(cells.len(), 33);
        assert!(cells.iter().all(|c| c.polygon().count() == 3));
        assert_relative_eq!(cells.total_area(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn same_seed_same_cells() {
        let generator = CellGenerator::new(SubdivisionStrategy::GlobalRounds { rounds: 8 });
        let a = generator.generate(&mut StdRng::seed_from_u64(9)).unwrap();
        let b = generator.generate(&mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }
}
