//! Deterministic pool partitioning.

use crate::common::*;

pub const RATIO_SUM_TOLERANCE: f64 = 1e-6;

/// The train/val/test ratio triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl SplitRatios {
    pub fn validate(&self) -> Result<()> {
        let Self { train, val, test } = *self;
        ensure!(
            train >= 0.0 && val >= 0.0 && test >= 0.0,
            "split ratios must be non-negative"
        );
        let sum = train + val + test;
        ensure!(
            (sum - 1.0).abs() <= RATIO_SUM_TOLERANCE,
            "split ratios must sum to 1.0, found {}",
            sum
        );
        Ok(())
    }
}

/// The partitioned base name lists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Split {
    pub train: Vec<String>,
    pub val: Vec<String>,
    pub test: Vec<String>,
}

impl Split {
    pub fn len(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shuffles the names with the injected rng and slices them into three
/// disjoint lists.
///
/// Train and val take `floor(N * ratio)` names each; test takes the
/// remainder, so the three counts always sum to `N`. The input is not
/// mutated.
pub fn partition(names: &[String], ratios: &SplitRatios, rng: &mut impl Rng) -> Result<Split> {
    ratios.validate()?;

    let mut shuffled = names.to_vec();
    shuffled.shuffle(rng);

    let total = shuffled.len();
    let train_count = (total as f64 * ratios.train).floor() as usize;
    let val_count = (total as f64 * ratios.val).floor() as usize;

    let test = shuffled.split_off(train_count + val_count);
    let val = shuffled.split_off(train_count);
    let train = shuffled;

    Ok(Split { train, val, test })
}
