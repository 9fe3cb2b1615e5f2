// src/geometry.rs

use rand::Rng;

use crate::error::{ShatterError, ShatterResult};

/// Two computed points closer than this are treated as the same point.
pub const POINT_EPSILON: f64 = 1e-9;

/// Slack applied to segment bounding boxes so crossings on axis-aligned
/// edges survive rounding of the intersection's y coordinate.
const BOUNDS_EPSILON: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Point2 = Point2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &Point2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3D cross product.
    pub fn cross(&self, other: &Point2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn add(&self, other: &Point2) -> Point2 {
        Point2::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: &Point2) -> Point2 {
        Point2::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(&self, factor: f64) -> Point2 {
        Point2::new(self.x * factor, self.y * factor)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn approx_eq(&self, other: &Point2, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

/// A non-vertical line in slope-intercept form, `y = slope * x + intercept`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineCoefficients {
    pub slope: f64,
    pub intercept: f64,
}

impl LineCoefficients {
    /// Coefficients of the line through `p0` and `p1`.
    ///
    /// A vertical line (`p0.x == p1.x`) yields non-finite coefficients; callers
    /// either avoid such input or check [`LineCoefficients::is_finite`].
    pub fn through(p0: &Point2, p1: &Point2) -> Self {
        let slope = (p0.y - p1.y) / (p0.x - p1.x);
        Self {
            slope,
            intercept: p1.y - slope * p1.x,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.slope.is_finite() && self.intercept.is_finite()
    }

    pub fn y_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Intersection of two lines. Parallel lines produce a non-finite point.
    pub fn intersect(&self, other: &LineCoefficients) -> Point2 {
        let x = (self.intercept - other.intercept) / (other.slope - self.slope);
        Point2::new(x, self.y_at(x))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Point2,
    pub end: Point2,
}

impl Segment {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    pub fn coefficients(&self) -> LineCoefficients {
        LineCoefficients::through(&self.start, &self.end)
    }

    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    pub fn length(&self) -> f64 {
        let d = self.end.sub(&self.start);
        d.dot(&d).sqrt()
    }

    /// Axis-aligned bounding box test, inclusive on every side.
    ///
    /// This is only an "on segment" test for points already known to lie on
    /// the segment's supporting line. Non-finite points are never contained.
    pub fn bounds_contain(&self, point: &Point2) -> bool {
        let (min_x, max_x) = min_max(self.start.x, self.end.x);
        let (min_y, max_y) = min_max(self.start.y, self.end.y);
        point.x >= min_x - BOUNDS_EPSILON
            && point.x <= max_x + BOUNDS_EPSILON
            && point.y >= min_y - BOUNDS_EPSILON
            && point.y <= max_y + BOUNDS_EPSILON
    }

    /// `start * t + end * (1 - t)`; `t = 1` is the start, `t = 0` the end.
    pub fn lerp(&self, t: f64) -> Point2 {
        self.start.scale(t).add(&self.end.scale(1.0 - t))
    }

    pub fn midpoint(&self) -> Point2 {
        self.lerp(0.5)
    }

    /// A random point on the segment. `midpoint_bias` uniform draws are
    /// averaged to pick the interpolation parameter, so values above 1 pull
    /// the point towards the middle.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R, midpoint_bias: u32) -> Point2 {
        self.lerp(biased_unit(rng, midpoint_bias))
    }
}

fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Mean of `samples` uniform draws from `[0, 1)`.
pub fn biased_unit<R: Rng + ?Sized>(rng: &mut R, samples: u32) -> f64 {
    let samples = samples.max(1);
    let sum: f64 = (0..samples).map(|_| rng.gen::<f64>()).sum();
    sum / samples as f64
}

/// A simple convex polygon. Vertices are kept in a consistent winding order
/// and edge `i` runs from vertex `i` to vertex `(i + 1) % n`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexPolygon {
    vertices: Vec<Point2>, // Kept private so the vertex-count invariant holds
}

impl ConvexPolygon {
    pub const MIN_VERTICES: usize = 3;

    pub fn from_points(points: &[Point2]) -> ShatterResult<Self> {
        Self::from_vec(points.to_vec())
    }

    pub fn from_vec(vertices: Vec<Point2>) -> ShatterResult<Self> {
        if vertices.len() < Self::MIN_VERTICES {
            return Err(ShatterError::InsufficientVertices {
                expected: Self::MIN_VERTICES,
                actual: vertices.len(),
            });
        }
        Ok(Self { vertices })
    }

    /// The diamond `(0,1), (1,0), (0,-1), (-1,0)`; seed and chord reference
    /// for the chord-cutting strategies.
    pub fn reference_square() -> Self {
        Self {
            vertices: vec![
                Point2::new(0.0, 1.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, -1.0),
                Point2::new(-1.0, 0.0),
            ],
        }
    }

    /// Two triangles tiling the square `[-1, 1]^2`, both wound clockwise.
    pub fn triangle_pair() -> [Self; 2] {
        [
            Self {
                vertices: vec![
                    Point2::new(-1.0, -1.0),
                    Point2::new(-1.0, 1.0),
                    Point2::new(1.0, -1.0),
                ],
            },
            Self {
                vertices: vec![
                    Point2::new(1.0, 1.0),
                    Point2::new(1.0, -1.0),
                    Point2::new(-1.0, 1.0),
                ],
            },
        ]
    }

    pub fn vertices(&self) -> &[Point2] {
        &self.vertices
    }

    pub fn count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge(&self, index: usize) -> Segment {
        let n = self.vertices.len();
        Segment::new(self.vertices[index % n], self.vertices[(index + 1) % n])
    }

    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        (0..self.vertices.len()).map(move |i| self.edge(i))
    }

    /// Shoelace area; positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f64 {
        self.edges().map(|e| e.start.cross(&e.end)).sum::<f64>() / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Mean of the vertices.
    pub fn centroid(&self) -> Point2 {
        let sum = self
            .vertices
            .iter()
            .fold(Point2::ORIGIN, |acc, v| acc.add(v));
        sum.scale(1.0 / self.vertices.len() as f64)
    }

    /// True when every turn has the same orientation. Collinear runs are
    /// tolerated.
    pub fn is_convex(&self) -> bool {
        let n = self.vertices.len();
        let mut orientation = 0.0_f64;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let c = self.vertices[(i + 2) % n];
            let turn = b.sub(&a).cross(&c.sub(&b));
            if turn.abs() <= POINT_EPSILON {
                continue;
            }
            if orientation == 0.0 {
                orientation = turn.signum();
            } else if turn.signum() != orientation {
                return false;
            }
        }
        true
    }

    /// Whether `point` lies inside the polygon, shrunk by `epsilon` so
    /// points on a shared boundary count as outside.
    pub fn strictly_contains(&self, point: &Point2, epsilon: f64) -> bool {
        let orientation = self.signed_area().signum();
        self.edges().all(|e| {
            let edge = e.end.sub(&e.start);
            let length = e.length();
            if length == 0.0 {
                return true;
            }
            orientation * edge.cross(&point.sub(&e.start)) / length > epsilon
        })
    }
}

/// Packed 24-bit RGB display color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(u32);

impl Rgb {
    pub const MASK: u32 = 0x00FF_FFFF;

    pub fn new(packed: u32) -> Self {
        Self(packed & Self::MASK)
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(0..=Self::MASK))
    }

    pub fn packed(&self) -> u32 {
        self.0
    }

    pub fn channels(&self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    /// `#rrggbb`, always six digits.
    pub fn to_hex(&self) -> String {
        format!("#{:06x}", self.0)
    }

    /// Linear-light RGBA for an sRGB render target.
    pub fn to_linear_rgba(&self) -> [f32; 4] {
        let [r, g, b] = self.channels();
        [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), 1.0]
    }
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// A convex cell together with the color it is drawn with. The color is
/// fixed when the shape is created.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    polygon: ConvexPolygon,
    color: Rgb,
}

impl Shape {
    pub fn new(polygon: ConvexPolygon, color: Rgb) -> Self {
        Self { polygon, color }
    }

    pub fn with_random_color<R: Rng + ?Sized>(polygon: ConvexPolygon, rng: &mut R) -> Self {
        Self::new(polygon, Rgb::random(rng))
    }

    pub fn polygon(&self) -> &ConvexPolygon {
        &self.polygon
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn vertices(&self) -> &[Point2] {
        self.polygon.vertices()
    }
}
