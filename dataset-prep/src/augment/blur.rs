//! Blur augmentation pass.

use crate::{
    common::*,
    pool::{self, Pool},
};

pub const BLUR_SUFFIX: &str = "-blurry";

/// Blur augmentation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BlurAugmentInit {
    /// The sigma range of the Gaussian blur, drawn uniformly per image.
    /// Excessive blur destroys the detection signal, so the range is part
    /// of the configuration surface rather than a constant.
    pub strength: (f64, f64),
}

impl Default for BlurAugmentInit {
    fn default() -> Self {
        Self {
            strength: (1.0, 5.0),
        }
    }
}

impl BlurAugmentInit {
    pub fn build(self) -> Result<BlurAugment> {
        let (lo, hi) = self.strength;
        ensure!(lo >= 0.0, "blur strength min must be non-negative");
        ensure!(lo <= hi, "blur strength min must not exceed max");
        Ok(BlurAugment {
            strength: self.strength,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BlurAugment {
    strength: (f64, f64),
}

impl BlurAugment {
    /// Writes a blurred variant of one sample into the pool and returns the
    /// derived base name.
    ///
    /// The annotation is copied verbatim when present; blur moves no pixels
    /// relative to the frame, so the boxes stay valid. A sample without an
    /// annotation still produces a blurred image.
    pub fn forward(&self, pool: &Pool, base: &str, rng: &mut impl Rng) -> Result<String> {
        let src = pool.image_path(base);
        let image = image::open(&src)
            .with_context(|| format!("failed to decode '{}'", src.display()))?;

        let (lo, hi) = self.strength;
        let sigma = rng.gen_range(lo..=hi) as f32;
        let blurred = image.blur(sigma);

        let derived = format!("{}{}", base, BLUR_SUFFIX);
        let dst = pool.image_path(&derived);
        blurred
            .save(&dst)
            .with_context(|| format!("failed to write '{}'", dst.display()))?;

        let label_src = pool.label_path(base);
        if label_src.is_file() {
            let label_dst = pool.label_path(&derived);
            fs::copy(&label_src, &label_dst).with_context(|| {
                format!(
                    "failed to copy '{}' to '{}'",
                    label_src.display(),
                    label_dst.display()
                )
            })?;
        } else {
            warn!(
                "no annotation for '{}'; blurred image written without one",
                base
            );
        }

        Ok(derived)
    }

    /// Runs the pass over every non-derived sample in the pool.
    pub fn run(&self, pool: &Pool, rng: &mut impl Rng) -> Result<usize> {
        let mut count = 0;
        for base in pool.list()? {
            if pool::is_derived(&base) {
                debug!("not blurring derived sample '{}'", base);
                continue;
            }
            match self.forward(pool, &base, rng) {
                Ok(derived) => {
                    count += 1;
                    info!("blurred {}: {}", count, derived);
                }
                Err(err) => warn!("skipping '{}': {:#}", base, err),
            }
        }
        Ok(count)
    }
}
