//! Corpus preparation configuration format.

use crate::{common::*, partition::SplitRatios};

/// The main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub pool: PoolConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub augment: AugmentConfig,
    pub split: SplitConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = std::fs::read_to_string(path)?;
        let config: Self = json5::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks configuration invariants before any file is touched.
    pub fn validate(&self) -> Result<()> {
        self.split.ratios().validate()?;
        let (lo, hi) = self.augment.blur_strength;
        ensure!(
            lo >= 0.0 && lo <= hi,
            "blur_strength must be an ascending pair of non-negative values"
        );
        Ok(())
    }
}

/// The staging pool holding image/annotation pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// The directory containing `<base>.<ext>` images and `<base>.txt`
    /// annotations.
    pub dir: PathBuf,
    /// The image file extension.
    #[serde(default = "default_image_ext")]
    pub image_ext: String,
}

/// Output layout options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// The root receiving the `train/`, `val/` and `test/` subsets.
    pub dir: PathBuf,
}

/// Augmentation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentConfig {
    /// If set, blur and rotation variants are generated before partitioning.
    #[serde(default)]
    pub enabled: bool,
    /// The sigma range of the Gaussian blur, drawn uniformly per image.
    #[serde(default = "default_blur_strength")]
    pub blur_strength: (f64, f64),
    /// If set, rotate by this fixed angle in degrees instead of a random one.
    #[serde(default)]
    pub rotate_degrees: Option<f64>,
    /// The RGB fill for canvas areas exposed by rotation.
    #[serde(default)]
    pub fill_color: [u8; 3],
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            blur_strength: default_blur_strength(),
            rotate_degrees: None,
            fill_color: [0, 0, 0],
        }
    }
}

/// Partitioning and relocation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    pub train_ratio: f64,
    pub val_ratio: f64,
    pub test_ratio: f64,
    /// Whether relocation moves or copies pool files.
    #[serde(default)]
    pub mode: RelocationMode,
    /// If set, the shuffle and the augmentation draws are reproducible.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl SplitConfig {
    pub fn ratios(&self) -> SplitRatios {
        SplitRatios {
            train: self.train_ratio,
            val: self.val_ratio,
            test: self.test_ratio,
        }
    }
}

/// Pool file handling during relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelocationMode {
    /// The source pair no longer exists after relocation.
    Move,
    /// The source pair is retained.
    Copy,
}

impl Default for RelocationMode {
    fn default() -> Self {
        Self::Move
    }
}

fn default_image_ext() -> String {
    "png".into()
}

fn default_blur_strength() -> (f64, f64) {
    (1.0, 5.0)
}
