//! Rotation augmentation pass.
//!
//! The image is rotated about its center on a fixed canvas; content leaving
//! the frame is clipped and exposed areas take a constant fill. Each box is
//! reprojected by rotating its four corners and taking the axis-aligned
//! rectangle enclosing them, then clipping to the frame. The enclosing
//! rectangle overestimates box area for angles off the 90-degree grid; this
//! is the usual lossy approximation for axis-aligned annotations.

use crate::{
    common::*,
    pool::{self, Pool},
};
use image::Rgba;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

pub const ROTATE_SUFFIX: &str = "-rotated";

/// Clipped extents at or below this many pixels count as degenerate.
const MIN_EXTENT: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct RotateAugmentInit {
    /// A fixed angle in degrees; a random angle in (-180, 180] when `None`.
    pub degrees: Option<f64>,
    /// The RGB fill for canvas areas exposed by the rotation.
    pub fill: [u8; 3],
}

impl Default for RotateAugmentInit {
    fn default() -> Self {
        Self {
            degrees: None,
            fill: [0, 0, 0],
        }
    }
}

impl RotateAugmentInit {
    pub fn build(self) -> Result<RotateAugment> {
        let Self { degrees, fill } = self;
        if let Some(degrees) = degrees {
            ensure!(degrees.is_finite(), "rotation angle must be finite");
        }
        Ok(RotateAugment { degrees, fill })
    }
}

#[derive(Debug, Clone)]
pub struct RotateAugment {
    degrees: Option<f64>,
    fill: [u8; 3],
}

impl RotateAugment {
    /// Writes a rotated variant of one sample into the pool and returns the
    /// derived base name.
    ///
    /// Unlike blur, rotation requires a parseable annotation: without boxes
    /// there is nothing to reproject.
    pub fn forward(&self, pool: &Pool, base: &str, rng: &mut impl Rng) -> Result<String> {
        let labels = pool
            .read_labels(base)?
            .ok_or_else(|| format_err!("no annotation for '{}'", base))?;

        let src = pool.image_path(base);
        let image = image::open(&src)
            .with_context(|| format!("failed to decode '{}'", src.display()))?
            .to_rgba8();
        let (width, height) = image.dimensions();

        let degrees = match self.degrees {
            Some(fixed) => fixed,
            None => 180.0 - rng.gen::<f64>() * 360.0,
        };

        // positive degrees rotate counter-clockwise while
        // rotate_about_center is clockwise-positive, hence the negation
        let [red, green, blue] = self.fill;
        let rotated = rotate_about_center(
            &image,
            -degrees.to_radians() as f32,
            Interpolation::Bilinear,
            Rgba([red, green, blue, 255]),
        );

        let new_labels = rotate_labels(&labels, width, height, degrees);

        let derived = format!("{}{}", base, ROTATE_SUFFIX);
        let dst = pool.image_path(&derived);
        rotated
            .save(&dst)
            .with_context(|| format!("failed to write '{}'", dst.display()))?;
        pool.write_labels(&derived, &new_labels)?;

        Ok(derived)
    }

    /// Runs the pass over every non-derived sample in the pool.
    pub fn run(&self, pool: &Pool, rng: &mut impl Rng) -> Result<usize> {
        let mut count = 0;
        for base in pool.list()? {
            if pool::is_derived(&base) {
                debug!("not rotating derived sample '{}'", base);
                continue;
            }
            match self.forward(pool, &base, rng) {
                Ok(derived) => {
                    count += 1;
                    info!("rotated {}: {}", count, derived);
                }
                Err(err) => warn!("skipping '{}': {:#}", base, err),
            }
        }
        Ok(count)
    }
}

/// Reprojects ratio-unit boxes through a rotation of the image about its
/// center by `degrees` (positive = counter-clockwise) on a fixed canvas.
///
/// Boxes whose clipped projection has zero or near-zero extent rotated out
/// of the frame and are dropped; survivors keep their classes in the
/// original relative order.
pub fn rotate_labels(
    labels: &[RatioLabel],
    width: u32,
    height: u32,
    degrees: f64,
) -> Vec<RatioLabel> {
    let width = width as f64;
    let height = height as f64;
    let center_x = width / 2.0;
    let center_y = height / 2.0;

    // forward map of the canvas rotation in raster coordinates; the sign
    // flip against the textbook matrix accounts for y growing downward
    let (sin, cos) = degrees.to_radians().sin_cos();
    let map = |x: f64, y: f64| {
        let dx = x - center_x;
        let dy = y - center_y;
        (center_x + dx * cos + dy * sin, center_y - dx * sin + dy * cos)
    };

    labels
        .iter()
        .filter_map(|label| {
            let pixel = TLBR::from(&label.rect.to_pixel_frame(height, width));
            let [t, l, b, r] = pixel.tlbr();
            let corners = [map(l, t), map(r, t), map(l, b), map(r, b)];

            let xs = || corners.iter().map(|&(x, _)| x);
            let ys = || corners.iter().map(|&(_, y)| y);
            let new_l = xs().fold(f64::INFINITY, f64::min).max(0.0);
            let new_r = xs().fold(f64::NEG_INFINITY, f64::max).min(width);
            let new_t = ys().fold(f64::INFINITY, f64::min).max(0.0);
            let new_b = ys().fold(f64::NEG_INFINITY, f64::max).min(height);

            // a box entirely outside the frame clamps to a zero or inverted
            // extent
            if new_b - new_t <= MIN_EXTENT || new_r - new_l <= MIN_EXTENT {
                debug!("dropping class {} box rotated out of frame", label.class);
                return None;
            }

            let rect = CyCxHW::try_from_tlbr([
                new_t / height,
                new_l / width,
                new_b / height,
                new_r / width,
            ])
            .ok()?;

            Some(Label {
                rect,
                class: label.class,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use image::{Rgba, RgbaImage};

    fn write_image(pool: &Pool, base: &str) {
        RgbaImage::from_pixel(8, 8, Rgba([60, 180, 90, 255]))
            .save(pool.image_path(base))
            .unwrap();
    }

    #[test]
    fn run_skips_derived_and_malformed_samples() {
        let dir = tempfile::tempdir().unwrap();
        let pool = Pool::new(dir.path(), "png");

        write_image(&pool, "good");
        fs::write(pool.label_path("good"), "0 0.5 0.5 0.25 0.25\n").unwrap();
        write_image(&pool, "bad");
        fs::write(pool.label_path("bad"), "0 0.5 0.5 0.25\n").unwrap();
        write_image(&pool, "old-rotated");
        fs::write(pool.label_path("old-rotated"), "0 0.5 0.5 0.25 0.25\n").unwrap();

        let augment = RotateAugmentInit {
            degrees: Some(90.0),
            ..Default::default()
        }
        .build()
        .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let count = augment.run(&pool, &mut rng).unwrap();

        assert_eq!(count, 1);
        assert!(pool.image_path("good-rotated").is_file());
        assert!(pool.label_path("good-rotated").is_file());
        assert!(!pool.image_path("bad-rotated").is_file());
        assert!(!pool.label_path("bad-rotated").is_file());
        assert!(!pool.image_path("old-rotated-rotated").is_file());
    }

    fn label(class: usize, cx: f64, cy: f64, w: f64, h: f64) -> RatioLabel {
        Label {
            rect: CyCxHW::try_from_cycxhw([cy, cx, h, w]).unwrap(),
            class,
        }
    }

    #[test]
    fn zero_angle_is_the_identity() {
        let labels = vec![label(0, 0.5, 0.5, 0.2, 0.2), label(3, 0.25, 0.75, 0.1, 0.3)];
        let rotated = rotate_labels(&labels, 640, 480, 0.0);

        assert_eq!(rotated.len(), labels.len());
        for (orig, new) in labels.iter().zip(&rotated) {
            assert_eq!(orig.class, new.class);
            let [ocy, ocx, oh, ow] = orig.rect.cycxhw();
            let [ncy, ncx, nh, nw] = new.rect.cycxhw();
            assert_abs_diff_eq!(ocy, ncy, epsilon = 1e-6);
            assert_abs_diff_eq!(ocx, ncx, epsilon = 1e-6);
            assert_abs_diff_eq!(oh, nh, epsilon = 1e-6);
            assert_abs_diff_eq!(ow, nw, epsilon = 1e-6);
        }
    }

    #[test]
    fn out_of_frame_box_is_dropped_without_shifting_classes() {
        // 200x100 canvas; at +90 degrees the right-edge box leaves the frame
        // upward while the two central boxes stay inside
        let labels = vec![
            label(0, 0.5, 0.5, 0.2, 0.2),
            label(1, 0.975, 0.5, 0.05, 0.2),
            label(2, 0.4, 0.5, 0.1, 0.3),
        ];
        let rotated = rotate_labels(&labels, 200, 100, 90.0);

        let classes: Vec<_> = rotated.iter().map(|label| label.class).collect();
        assert_eq!(classes, vec![0, 2]);
        for label in &rotated {
            assert!(label.rect.w() > 0.0);
            assert!(label.rect.h() > 0.0);
        }
    }

    #[test]
    fn quarter_turn_square_swaps_axes() {
        // on a square canvas a quarter turn maps a wide centered box to a
        // tall one of the same area
        let labels = vec![label(0, 0.5, 0.5, 0.5, 0.25)];
        let rotated = rotate_labels(&labels, 100, 100, 90.0);

        assert_eq!(rotated.len(), 1);
        let [cy, cx, h, w] = rotated[0].rect.cycxhw();
        assert_abs_diff_eq!(cx, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(cy, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(w, 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(h, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn half_turn_mirrors_the_center() {
        let labels = vec![label(0, 0.25, 0.4, 0.1, 0.2)];
        let rotated = rotate_labels(&labels, 300, 200, 180.0);

        assert_eq!(rotated.len(), 1);
        let [cy, cx, h, w] = rotated[0].rect.cycxhw();
        assert_abs_diff_eq!(cx, 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(cy, 0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(w, 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(h, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn oblique_angle_grows_the_enclosing_box() {
        // the enclosing-rectangle approximation never shrinks a centered box
        let labels = vec![label(0, 0.5, 0.5, 0.2, 0.2)];
        let rotated = rotate_labels(&labels, 100, 100, 45.0);

        assert_eq!(rotated.len(), 1);
        let [_, _, h, w] = rotated[0].rect.cycxhw();
        assert!(w > 0.2);
        assert!(h > 0.2);
    }

    #[test]
    fn no_zero_area_boxes_for_any_angle() {
        let labels = vec![
            label(0, 0.05, 0.05, 0.1, 0.1),
            label(1, 0.95, 0.95, 0.1, 0.1),
            label(2, 0.5, 0.5, 0.8, 0.8),
        ];
        for step in 0..72 {
            let degrees = step as f64 * 5.0 - 180.0;
            for label in rotate_labels(&labels, 320, 160, degrees) {
                assert!(label.rect.w() > 0.0, "zero width at {} degrees", degrees);
                assert!(label.rect.h() > 0.0, "zero height at {} degrees", degrees);
            }
        }
    }
}
