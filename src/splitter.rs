// src/splitter.rs

use log::debug;
use rand::Rng;

use crate::chord::Chord;
use crate::error::{ShatterError, ShatterResult};
use crate::geometry::{
    biased_unit, ConvexPolygon, LineCoefficients, Point2, Segment, Shape, POINT_EPSILON,
};

/// Result of offering one shape to a cut.
#[derive(Clone, Debug, PartialEq)]
pub enum SplitOutcome {
    /// The cut missed or only touched the shape; it is handed back untouched.
    Unsplit(Shape),
    Split(Shape, Shape),
}

impl SplitOutcome {
    pub fn is_split(&self) -> bool {
        matches!(self, SplitOutcome::Split(..))
    }

    /// Appends the resulting shape(s) to `out`, first child first.
    pub fn push_into<E: Extend<Shape>>(self, out: &mut E) {
        match self {
            SplitOutcome::Unsplit(shape) => out.extend(std::iter::once(shape)),
            SplitOutcome::Split(first, second) => out.extend([first, second]),
        }
    }
}

/// Where a chord crosses a polygon: one slot per edge, `Some` for the edges
/// that are crossed. At most two slots are ever filled.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeCrossings {
    slots: Vec<Option<Point2>>,
}

impl EdgeCrossings {
    pub fn at(&self, edge_index: usize) -> Option<Point2> {
        self.slots.get(edge_index).copied().flatten()
    }

    pub fn count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// `(edge index, crossing point)` pairs in edge order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Point2)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|p| (index, p)))
    }
}

pub struct ChordSplitter;

impl ChordSplitter {
    const MAX_CROSSINGS: usize = 2;

    fn edge_crossing(chord: &LineCoefficients, edge: &Segment) -> Option<Point2> {
        let point = if edge.is_vertical() {
            Point2::new(edge.start.x, chord.y_at(edge.start.x))
        } else {
            chord.intersect(&edge.coefficients())
        };
        (point.is_finite() && edge.bounds_contain(&point)).then_some(point)
    }

    /// Records the chord's crossings with every edge of `polygon`.
    ///
    /// A chord through a vertex reports that vertex on both adjacent edges;
    /// only the first report is kept. Beyond that the first two distinct
    /// crossings in edge order win and any further ones are ignored.
    pub fn crossings(polygon: &ConvexPolygon, chord: &Chord) -> EdgeCrossings {
        let line = chord.coefficients();
        let mut slots: Vec<Option<Point2>> = vec![None; polygon.count()];
        let mut kept = 0;

        for (index, edge) in polygon.edges().enumerate() {
            if kept == Self::MAX_CROSSINGS {
                break;
            }
            let Some(point) = Self::edge_crossing(&line, &edge) else {
                continue;
            };
            let already_seen = slots
                .iter()
                .flatten()
                .any(|seen| seen.approx_eq(&point, POINT_EPSILON));
            if already_seen {
                continue;
            }
            slots[index] = Some(point);
            kept += 1;
        }

        EdgeCrossings { slots }
    }

    /// Walks the polygon once, switching output ring at every crossing. Both
    /// rings keep the parent's winding and share the crossing points as their
    /// common edge.
    ///
    /// Returns `None` when either side would be degenerate (fewer than three
    /// distinct vertices or no area).
    pub fn partition(
        polygon: &ConvexPolygon,
        crossings: &EdgeCrossings,
    ) -> Option<(ConvexPolygon, ConvexPolygon)> {
        let capacity = polygon.count() + 2;
        let mut rings = [Vec::with_capacity(capacity), Vec::with_capacity(capacity)];
        let mut current = 0;

        for (index, vertex) in polygon.vertices().iter().enumerate() {
            push_distinct(&mut rings[current], *vertex);
            if let Some(crossing) = crossings.at(index) {
                push_distinct(&mut rings[current], crossing);
                current = 1 - current;
                push_distinct(&mut rings[current], crossing);
            }
        }

        let [first, second] = rings;
        Some((close_ring(first)?, close_ring(second)?))
    }

    /// Splits `shape` along `chord`. Children get fresh colors; an unsplit
    /// shape is returned as it came in.
    pub fn split<R: Rng + ?Sized>(shape: Shape, chord: &Chord, rng: &mut R) -> SplitOutcome {
        let crossings = Self::crossings(shape.polygon(), chord);
        if crossings.count() < Self::MAX_CROSSINGS {
            return SplitOutcome::Unsplit(shape);
        }

        match Self::partition(shape.polygon(), &crossings) {
            Some((first, second)) => {
                debug!(
                    "Split {}-gon into {}-gon and {}-gon",
                    shape.polygon().count(),
                    first.count(),
                    second.count()
                );
                SplitOutcome::Split(
                    Shape::with_random_color(first, rng),
                    Shape::with_random_color(second, rng),
                )
            }
            None => SplitOutcome::Unsplit(shape),
        }
    }
}

fn push_distinct(ring: &mut Vec<Point2>, point: Point2) {
    if ring.last().map_or(true, |last| !last.approx_eq(&point, POINT_EPSILON)) {
        ring.push(point);
    }
}

fn close_ring(mut ring: Vec<Point2>) -> Option<ConvexPolygon> {
    if ring.len() > 1 && ring[0].approx_eq(&ring[ring.len() - 1], POINT_EPSILON) {
        ring.pop();
    }
    let polygon = ConvexPolygon::from_vec(ring).ok()?;
    (polygon.area() > 0.0).then_some(polygon)
}

/// Splits triangles by a line from one vertex to a point on the opposite
/// edge. The two children are triangles and keep the parent's winding.
pub struct TriangleSplitter;

impl TriangleSplitter {
    /// Cuts from vertex `apex` to `start * t + end * (1 - t)` on the opposite
    /// edge, where the edge runs from vertex `apex + 1` to vertex `apex + 2`.
    pub fn split_at(
        triangle: &ConvexPolygon,
        apex: usize,
        t: f64,
    ) -> ShatterResult<(ConvexPolygon, ConvexPolygon)> {
        let vertices = triangle.vertices();
        if vertices.len() != 3 {
            return Err(ShatterError::NotATriangle {
                actual: vertices.len(),
            });
        }
        let a = vertices[apex % 3];
        let b = vertices[(apex + 1) % 3];
        let c = vertices[(apex + 2) % 3];
        let foot = Segment::new(b, c).lerp(t);

        Ok((
            ConvexPolygon::from_vec(vec![a, b, foot])?,
            ConvexPolygon::from_vec(vec![a, foot, c])?,
        ))
    }

    pub fn split<R: Rng + ?Sized>(
        shape: Shape,
        rng: &mut R,
        midpoint_bias: u32,
    ) -> ShatterResult<SplitOutcome> {
        let apex = rng.gen_range(0..3);
        let t = biased_unit(rng, midpoint_bias);
        let (first, second) = Self::split_at(shape.polygon(), apex, t)?;
        Ok(SplitOutcome::Split(
            Shape::with_random_color(first, rng),
            Shape::with_random_color(second, rng),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::ChordSampler;
    use crate::geometry::Rgb;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square_shape() -> Shape {
        Shape::new(ConvexPolygon::reference_square(), Rgb::new(0x336699))
    }

    fn contains_point(polygon: &ConvexPolygon, p: Point2) -> bool {
        polygon.vertices().iter().any(|v| v.approx_eq(&p, 1e-12))
    }

    #[test]
    fn horizontal_chord_cuts_off_the_top_corner() {
        let mut rng = StdRng::seed_from_u64(1);
        let chord = Chord::new(Point2::new(0.5, 0.5), Point2::new(-0.5, 0.5));

        let crossings = ChordSplitter::crossings(&ConvexPolygon::reference_square(), &chord);
        let found: Vec<_> = crossings.iter().collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, 0);
        assert_eq!(found[1].0, 3);

        let SplitOutcome::Split(top, bottom) = ChordSplitter::split(square_shape(), &chord, &mut rng)
        else {
            panic!("chord should split the square");
        };
        let right = Point2::new(0.5, 0.5);
        let left = Point2::new(-0.5, 0.5);
        for child in [&top, &bottom] {
            assert!(child.polygon().is_convex());
            assert!(contains_point(child.polygon(), right));
            assert!(contains_point(child.polygon(), left));
        }
        assert_eq!(top.polygon().count(), 3);
        assert_eq!(bottom.polygon().count(), 5);
        assert_relative_eq!(top.polygon().area(), 0.25, epsilon = 1e-12);
        assert_relative_eq!(bottom.polygon().area(), 1.75, epsilon = 1e-12);
    }

    #[test]
    fn children_keep_parent_winding() {
        let mut rng = StdRng::seed_from_u64(2);
        let chord = Chord::new(Point2::new(0.5, 0.5), Point2::new(-0.5, -0.5 + 1e-3));
        let parent = ConvexPolygon::reference_square();
        let SplitOutcome::Split(a, b) = ChordSplitter::split(square_shape(), &chord, &mut rng) else {
            panic!("chord should split the square");
        };
        let sign = parent.signed_area().signum();
        assert_eq!(a.polygon().signed_area().signum(), sign);
        assert_eq!(b.polygon().signed_area().signum(), sign);
    }

    #[test]
    fn missing_chord_returns_the_same_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        let chord = Chord::new(Point2::new(5.0, 5.0), Point2::new(6.0, 7.0));
        let shape = square_shape();
        let outcome = ChordSplitter::split(shape.clone(), &chord, &mut rng);
        assert_eq!(outcome, SplitOutcome::Unsplit(shape));
    }

    #[test]
    fn tangent_chord_through_a_vertex_does_not_split() {
        let mut rng = StdRng::seed_from_u64(4);
        let chord = Chord::new(Point2::new(-1.0, 1.0), Point2::new(1.0, 1.0));
        let shape = square_shape();
        let crossings = ChordSplitter::crossings(shape.polygon(), &chord);
        assert_eq!(crossings.count(), 1);
        assert_eq!(
            ChordSplitter::split(shape.clone(), &chord, &mut rng),
            SplitOutcome::Unsplit(shape)
        );
    }

    #[test]
    fn chord_through_two_vertices_yields_two_triangles() {
        let mut rng = StdRng::seed_from_u64(5);
        let chord = Chord::new(Point2::new(1.0, 0.0), Point2::new(-1.0, 0.0));
        let SplitOutcome::Split(a, b) = ChordSplitter::split(square_shape(), &chord, &mut rng) else {
            panic!("chord should split the square");
        };
        assert_eq!(a.polygon().count(), 3);
        assert_eq!(b.polygon().count(), 3);
        assert_relative_eq!(a.polygon().area(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(b.polygon().area(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn vertical_edges_are_crossed() {
        let box_shape = Shape::new(
            ConvexPolygon::from_points(&[
                Point2::new(-1.0, -1.0),
                Point2::new(-1.0, 1.0),
                Point2::new(1.0, 1.0),
                Point2::new(1.0, -1.0),
            ])
            .unwrap(),
            Rgb::new(0),
        );
        let chord = Chord::new(Point2::new(-2.0, 0.0), Point2::new(2.0, 0.5));
        let crossings = ChordSplitter::crossings(box_shape.polygon(), &chord);
        let found: Vec<_> = crossings.iter().map(|(i, _)| i).collect();
        assert_eq!(found, vec![0, 2]);
    }

    #[test]
    fn random_cuts_partition_area_and_stay_convex() {
        let mut rng = StdRng::seed_from_u64(6);
        let sampler = ChordSampler::new(ConvexPolygon::reference_square());
        let mut shapes = vec![square_shape()];
        for _ in 0..8 {
            let chord = sampler.sample(&mut rng).unwrap();
            let mut next: Vec<Shape> = Vec::new();
            for shape in shapes {
                let parent_area = shape.polygon().area();
                let outcome = ChordSplitter::split(shape, &chord, &mut rng);
                if let SplitOutcome::Split(a, b) = &outcome {
                    assert!(a.polygon().is_convex());
                    assert!(b.polygon().is_convex());
                    assert_relative_eq!(
                        a.polygon().area() + b.polygon().area(),
                        parent_area,
                        epsilon = 1e-9
                    );
                }
                outcome.push_into(&mut next);
            }
            shapes = next;
        }
        let total: f64 = shapes.iter().map(|s| s.polygon().area()).sum();
        assert_relative_eq!(total, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn triangle_split_through_hypotenuse_midpoint() {
        let triangle = ConvexPolygon::from_points(&[
            Point2::new(-1.0, -1.0),
            Point2::new(-1.0, 1.0),
            Point2::new(1.0, -1.0),
        ])
        .unwrap();
        let apex = Point2::new(1.0, -1.0);
        let midpoint = Point2::new(-1.0, 0.0);

        let (first, second) = TriangleSplitter::split_at(&triangle, 2, 0.5).unwrap();
        for (child, corner) in [(&first, Point2::new(-1.0, -1.0)), (&second, Point2::new(-1.0, 1.0))] {
            assert_eq!(child.count(), 3);
            assert!(contains_point(child, apex));
            assert!(contains_point(child, midpoint));
            assert!(contains_point(child, corner));
        }
        assert_relative_eq!(first.area() + second.area(), triangle.area());
    }

    #[test]
    fn triangle_split_rejects_quads() {
        let err = TriangleSplitter::split_at(&ConvexPolygon::reference_square(), 0, 0.5).unwrap_err();
        assert_eq!(err, ShatterError::NotATriangle { actual: 4 });
    }

    #[test]
    fn random_triangle_split_always_splits() {
        let mut rng = StdRng::seed_from_u64(8);
        let [seed, _] = ConvexPolygon::triangle_pair();
        let parent = Shape::new(seed, Rgb::new(0xabcdef));
        let outcome = TriangleSplitter::split(parent.clone(), &mut rng, 2).unwrap();
        let SplitOutcome::Split(a, b) = outcome else {
            panic!("triangles always split");
        };
        assert_relative_eq!(
            a.polygon().area() + b.polygon().area(),
            parent.polygon().area(),
            epsilon = 1e-12
        );
    }
}
