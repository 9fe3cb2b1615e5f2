// src/config.rs

use std::fmt;
use std::str::FromStr;

use log::warn;

use crate::canvas::{CanvasLayout, Orientation};
use crate::error::{ShatterError, ShatterResult};

pub const SEED_ENV: &str = "SHATTER_SEED";
pub const STRATEGY_ENV: &str = "SHATTER_STRATEGY";

const MIN_FRAME_INTERVAL_MS: u64 = 10;
const MAX_FRAME_INTERVAL_MS: u64 = 25;
const MAX_TARGET: usize = 100_000;
/// Cell count grows roughly with the square of the round count.
const MAX_ROUNDS: usize = 512;

/// How the seed region is cut into cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubdivisionStrategy {
    /// Each round draws one chord and applies it to every current shape.
    GlobalRounds { rounds: usize },
    /// Cut the oldest shape with its own chord until `target` shapes exist.
    PerShape { target: usize },
    /// Start from two triangles and split vertex-to-opposite-edge.
    Triangles { target: usize },
}

impl SubdivisionStrategy {
    pub fn orientation(&self) -> Orientation {
        match self {
            SubdivisionStrategy::GlobalRounds { .. } | SubdivisionStrategy::PerShape { .. } => {
                Orientation::Rotate45
            }
            SubdivisionStrategy::Triangles { .. } => Orientation::Direct,
        }
    }
}

impl fmt::Display for SubdivisionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubdivisionStrategy::GlobalRounds { rounds } => write!(f, "rounds:{}", rounds),
            SubdivisionStrategy::PerShape { target } => write!(f, "shapes:{}", target),
            SubdivisionStrategy::Triangles { target } => write!(f, "triangles:{}", target),
        }
    }
}

impl FromStr for SubdivisionStrategy {
    type Err = ShatterError;

    /// Accepts `rounds:N`, `shapes:N` or `triangles:N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ShatterError::InvalidConfiguration {
            message: format!("unrecognised strategy '{}'", s),
        };
        let (kind, count) = s.trim().split_once(':').ok_or_else(invalid)?;
        let count: usize = count.trim().parse().map_err(|_| invalid())?;
        match kind.trim() {
            "rounds" => Ok(SubdivisionStrategy::GlobalRounds { rounds: count }),
            "shapes" => Ok(SubdivisionStrategy::PerShape { target: count }),
            "triangles" => Ok(SubdivisionStrategy::Triangles { target: count }),
            _ => Err(invalid()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShatterConfig {
    pub strategy: SubdivisionStrategy,
    /// Length of one full breathing cycle.
    pub period_ms: f64,
    /// Delay between redraws.
    pub frame_interval_ms: u64,
    /// Side of the square content area on the canvas, in canvas pixels.
    pub condensed_size: f32,
    /// Empty border around the content area, in canvas pixels.
    pub margin: f32,
    /// Uniform draws averaged per random point on a segment.
    pub midpoint_bias: u32,
    /// `None` seeds the generator from entropy.
    pub seed: Option<u64>,
    pub max_chord_attempts: usize,
}

impl Default for ShatterConfig {
    fn default() -> Self {
        Self {
            strategy: SubdivisionStrategy::GlobalRounds { rounds: 10 },
            period_ms: 5000.0,
            frame_interval_ms: 10,
            condensed_size: 400.0,
            margin: 100.0,
            midpoint_bias: 1,
            seed: None,
            max_chord_attempts: 64,
        }
    }
}

impl ShatterConfig {
    pub fn with_strategy(mut self, strategy: SubdivisionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_period_ms(mut self, period_ms: f64) -> Self {
        self.period_ms = period_ms;
        self
    }

    pub fn with_midpoint_bias(mut self, midpoint_bias: u32) -> Self {
        self.midpoint_bias = midpoint_bias;
        self
    }

    /// Applies textual overrides (as found in `SHATTER_SEED` and
    /// `SHATTER_STRATEGY`). Unparseable values are logged and skipped.
    pub fn with_overrides(mut self, seed: Option<&str>, strategy: Option<&str>) -> Self {
        if let Some(raw) = seed {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(e) => warn!("Ignoring {}={:?}: {}", SEED_ENV, raw, e),
            }
        }
        if let Some(raw) = strategy {
            match raw.parse::<SubdivisionStrategy>() {
                Ok(strategy) => self.strategy = strategy,
                Err(e) => warn!("Ignoring {}={:?}: {}", STRATEGY_ENV, raw, e),
            }
        }
        self
    }

    pub fn from_env() -> Self {
        let seed = std::env::var(SEED_ENV).ok();
        let strategy = std::env::var(STRATEGY_ENV).ok();
        Self::default().with_overrides(seed.as_deref(), strategy.as_deref())
    }

    pub fn validate(&self) -> ShatterResult<()> {
        let invalid = |message: String| Err(ShatterError::InvalidConfiguration { message });

        match self.strategy {
            SubdivisionStrategy::GlobalRounds { rounds } if rounds > MAX_ROUNDS => {
                return invalid(format!("rounds must be at most {}", MAX_ROUNDS));
            }
            SubdivisionStrategy::PerShape { target } if target == 0 || target > MAX_TARGET => {
                return invalid(format!("shape target must be in 1..={}", MAX_TARGET));
            }
            SubdivisionStrategy::Triangles { target } if target < 2 || target > MAX_TARGET => {
                return invalid(format!("triangle target must be in 2..={}", MAX_TARGET));
            }
            _ => {}
        }
        if !(self.period_ms.is_finite() && self.period_ms > 0.0) {
            return invalid(format!("period_ms must be positive, got {}", self.period_ms));
        }
        if !(MIN_FRAME_INTERVAL_MS..=MAX_FRAME_INTERVAL_MS).contains(&self.frame_interval_ms) {
            return invalid(format!(
                "frame_interval_ms must be in {}..={}, got {}",
                MIN_FRAME_INTERVAL_MS, MAX_FRAME_INTERVAL_MS, self.frame_interval_ms
            ));
        }
        if !(self.condensed_size > 0.0) || !(self.margin >= 0.0) {
            return invalid("canvas sizes must be positive".to_string());
        }
        if self.midpoint_bias == 0 {
            return invalid("midpoint_bias must be at least 1".to_string());
        }
        if self.max_chord_attempts == 0 {
            return invalid("max_chord_attempts must be at least 1".to_string());
        }
        Ok(())
    }

    /// Displacement factor of the breathing transform at full pulse.
    pub fn breathing_scale(&self) -> f64 {
        2.0 * self.margin as f64 / self.condensed_size as f64
    }

    pub fn canvas_layout(&self) -> CanvasLayout {
        CanvasLayout {
            condensed_size: self.condensed_size,
            margin: self.margin,
            orientation: self.strategy.orientation(),
        }
    }
}
