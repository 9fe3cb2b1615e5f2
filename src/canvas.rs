// src/canvas.rs

use glam::{Affine2, Mat2, Vec2};

use crate::geometry::Point2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// `(x, y) -> (x - y, x + y)`: turns the diamond seed into an upright square.
    Rotate45,
    Direct,
}

/// Maps geometry space (roughly `[-1, 1]^2`) onto a square canvas of
/// `condensed_size + 2 * margin` pixels, then onto the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasLayout {
    pub condensed_size: f32,
    pub margin: f32,
    pub orientation: Orientation,
}

impl CanvasLayout {
    pub fn canvas_size(&self) -> f32 {
        self.condensed_size + 2.0 * self.margin
    }

    /// `margin + 0.5 * (v + 1) * condensed_size` after the orientation basis.
    pub fn canvas_transform(&self) -> Affine2 {
        let basis = match self.orientation {
            Orientation::Rotate45 => Mat2::from_cols(Vec2::new(1.0, 1.0), Vec2::new(-1.0, 1.0)),
            Orientation::Direct => Mat2::IDENTITY,
        };
        let half = 0.5 * self.condensed_size;
        Affine2::from_translation(Vec2::splat(self.margin + half))
            * Affine2::from_mat2(Mat2::from_diagonal(Vec2::splat(half)) * basis)
    }

    /// Canvas scaled uniformly to fit a `width` x `height` window and centered.
    pub fn window_transform(&self, width: f32, height: f32) -> Affine2 {
        let size = self.canvas_size();
        let fit = (width.min(height) / size).max(0.0);
        let offset = Vec2::new(width - size * fit, height - size * fit) * 0.5;
        Affine2::from_translation(offset)
            * Affine2::from_scale(Vec2::splat(fit))
            * self.canvas_transform()
    }
}

pub fn to_pixels(transform: &Affine2, point: &Point2) -> Vec2 {
    transform.transform_point2(Vec2::new(point.x as f32, point.y as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn layout(orientation: Orientation) -> CanvasLayout {
        CanvasLayout {
            condensed_size: 400.0,
            margin: 100.0,
            orientation,
        }
    }

    #[test]
    fn rotated_diamond_fills_content_area() {
        let t = layout(Orientation::Rotate45).canvas_transform();
        let top = to_pixels(&t, &Point2::new(0.0, 1.0));
        let right = to_pixels(&t, &Point2::new(1.0, 0.0));
        // (0, 1) -> (-1, 1) -> (100, 500); (1, 0) -> (1, 1) -> (500, 500)
        assert_relative_eq!(top.x, 100.0);
        assert_relative_eq!(top.y, 500.0);
        assert_relative_eq!(right.x, 500.0);
        assert_relative_eq!(right.y, 500.0);
    }

    #[test]
    fn direct_maps_corners_to_margin() {
        let t = layout(Orientation::Direct).canvas_transform();
        let p = to_pixels(&t, &Point2::new(-1.0, -1.0));
        assert_relative_eq!(p.x, 100.0);
        assert_relative_eq!(p.y, 100.0);
        let center = to_pixels(&t, &Point2::ORIGIN);
        assert_relative_eq!(center.x, 300.0);
        assert_relative_eq!(center.y, 300.0);
    }

    #[test]
    fn window_fit_centers_the_canvas() {
        let t = layout(Orientation::Direct).window_transform(1200.0, 600.0);
        let center = to_pixels(&t, &Point2::ORIGIN);
        assert_relative_eq!(center.x, 600.0);
        assert_relative_eq!(center.y, 300.0);
    }
}
