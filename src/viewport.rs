use egui::{Pos2, Rect, Vec2};

use crate::geometry::Vector2;

pub const MIN_SCALE: f32 = 0.125;
pub const MAX_SCALE: f32 = 4.0;

/// Pan/zoom mapping between screen space and the image's pixel grid.
///
/// `image_offset` is the screen position of the image's top-left corner,
/// so `screen = image * scale + image_offset`.
#[derive(Clone, Debug)]
pub struct Viewport {
    pub scale: f32,
    pub image_offset: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            image_offset: Vec2::ZERO,
        }
    }
}

impl Viewport {
    /// Maps a pointer position to the image pixel under it, rounded to
    /// the nearest integer pixel.
    pub fn screen_to_image(&self, screen: Pos2) -> Vector2 {
        let x = (screen.x - self.image_offset.x) / self.scale;
        let y = (screen.y - self.image_offset.y) / self.scale;
        Vector2::new(x.round() as i32, y.round() as i32)
    }

    pub fn image_to_screen(&self, image: Vector2) -> Pos2 {
        Pos2::new(
            image.x as f32 * self.scale + self.image_offset.x,
            image.y as f32 * self.scale + self.image_offset.y,
        )
    }

    /// Rescales by `factor` while keeping the image point under `anchor`
    /// fixed on screen (zoom toward the cursor).
    pub fn zoom(&mut self, anchor: Pos2, factor: f32) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        // Unrounded image-space location under the anchor.
        let under = (anchor.to_vec2() - self.image_offset) / self.scale;
        self.image_offset = anchor.to_vec2() - under * new_scale;
        self.scale = new_scale;
    }

    /// Panning moves the viewport itself, so the delta is raw screen
    /// pixels, not divided by the scale.
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.image_offset += screen_delta;
    }

    /// Scales the image to fit inside `container` without ever upscaling
    /// past 1:1, and centers it.
    pub fn fit_to_container(&mut self, image_size: Vec2, container: Rect) {
        let fit = (container.width() / image_size.x)
            .min(container.height() / image_size.y)
            .min(1.0);
        self.scale = fit.max(MIN_SCALE);
        let scaled = image_size * self.scale;
        self.image_offset = container.min.to_vec2() + (container.size() - scaled) * 0.5;
    }
}

#[cfg(test)]
mod tests {
    use super::{Viewport, MAX_SCALE, MIN_SCALE};
    use crate::geometry::Vector2;
    use egui::{Pos2, Rect, Vec2};

    #[test]
    fn screen_image_round_trip_stays_within_one_unit() {
        for scale in [0.125, 0.4, 1.0, 2.3, 4.0] {
            let vp = Viewport {
                scale,
                image_offset: Vec2::new(-37.5, 211.25),
            };
            for point in [
                Pos2::new(0.0, 0.0),
                Pos2::new(123.0, 456.0),
                Pos2::new(-80.0, 13.0),
            ] {
                let back = vp.image_to_screen(vp.screen_to_image(point));
                assert!(
                    (back.x - point.x).abs() <= scale.max(1.0)
                        && (back.y - point.y).abs() <= scale.max(1.0),
                    "scale={scale} point={point:?} back={back:?}"
                );
            }
        }
    }

    #[test]
    fn zoom_keeps_anchor_point_fixed() {
        let mut vp = Viewport {
            scale: 1.0,
            image_offset: Vec2::new(40.0, 60.0),
        };
        let anchor = Pos2::new(300.0, 200.0);
        let before = vp.screen_to_image(anchor);
        vp.zoom(anchor, 1.5);
        assert_eq!(vp.screen_to_image(anchor), before);
        vp.zoom(anchor, 0.25);
        let after = vp.screen_to_image(anchor);
        assert!((after.x - before.x).abs() <= 1 && (after.y - before.y).abs() <= 1);
    }

    #[test]
    fn zoom_clamps_scale_to_bounds() {
        let mut vp = Viewport::default();
        vp.zoom(Pos2::ZERO, 100.0);
        assert_eq!(vp.scale, MAX_SCALE);
        vp.zoom(Pos2::ZERO, 1e-6);
        assert_eq!(vp.scale, MIN_SCALE);
    }

    #[test]
    fn pan_applies_raw_screen_delta() {
        let mut vp = Viewport {
            scale: 2.0,
            image_offset: Vec2::new(10.0, 10.0),
        };
        vp.pan(Vec2::new(5.0, -3.0));
        assert_eq!(vp.image_offset, Vec2::new(15.0, 7.0));
    }

    #[test]
    fn fit_centers_and_never_upscales() {
        let container = Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::new(800.0, 600.0));

        // Small image: stays 1:1, centered.
        let mut vp = Viewport::default();
        vp.fit_to_container(Vec2::new(400.0, 200.0), container);
        assert_eq!(vp.scale, 1.0);
        assert_eq!(vp.image_offset, Vec2::new(300.0, 250.0));

        // Large image: scaled down preserving aspect ratio.
        let mut vp = Viewport::default();
        vp.fit_to_container(Vec2::new(1600.0, 600.0), container);
        assert_eq!(vp.scale, 0.5);
        assert_eq!(vp.image_offset, Vec2::new(100.0, 200.0));

        // Corner under fit maps back to pixel (0, 0).
        assert_eq!(
            vp.screen_to_image(Pos2::new(100.0, 200.0)),
            Vector2::new(0, 0)
        );
    }
}
