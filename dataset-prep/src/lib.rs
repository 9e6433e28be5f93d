//! Object-detection corpus preparation engine.
//!
//! Optionally augments a pool of image/annotation pairs with blurred and
//! rotated variants, then partitions the pool into train/val/test subsets at
//! configured ratios and relocates each pair into its subset, merging into
//! pre-existing data without loss.

mod common;

pub mod augment;
pub mod config;
pub mod partition;
pub mod pool;
pub mod relocate;

pub use config::{Config, RelocationMode};
pub use partition::{partition, Split, SplitRatios};
pub use pool::Pool;
pub use relocate::{relocate, RelocateStats, SubsetDirs};

use crate::{
    augment::{BlurAugmentInit, RotateAugmentInit},
    common::*,
};

/// Runs the preparation pipeline described by the configuration.
///
/// Processing is sequential: each sample is fully read, transformed and
/// written before the next one, so an aborted run leaves only complete pairs
/// or logged skips behind.
pub fn start(config: &Config) -> Result<()> {
    config.validate()?;

    let pool = Pool::new(&config.pool.dir, config.pool.image_ext.as_str());
    ensure!(
        pool.dir().is_dir(),
        "pool directory '{}' does not exist",
        pool.dir().display()
    );

    let train_dirs = SubsetDirs::create(config.output.dir.join("train"))?;
    let val_dirs = SubsetDirs::create(config.output.dir.join("val"))?;
    let test_dirs = SubsetDirs::create(config.output.dir.join("test"))?;

    let mut rng = match config.split.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if config.augment.enabled {
        info!("augmenting pool with blur variants");
        let blur = BlurAugmentInit {
            strength: config.augment.blur_strength,
        }
        .build()?;
        let blurred = blur.run(&pool, &mut rng)?;
        info!("wrote {} blurred samples", blurred);

        info!("augmenting pool with rotation variants");
        let rotate = RotateAugmentInit {
            degrees: config.augment.rotate_degrees,
            fill: config.augment.fill_color,
        }
        .build()?;
        let rotated = rotate.run(&pool, &mut rng)?;
        info!("wrote {} rotated samples", rotated);
    }

    // the listing is taken after augmentation so derived samples are
    // partitioned along with their sources
    let names = pool.list()?;
    info!("found {} images in the pool", names.len());

    let split = partition(&names, &config.split.ratios(), &mut rng)?;

    let mode = config.split.mode;
    let train_stats = relocate(&split.train, &pool, &train_dirs, mode)?;
    let val_stats = relocate(&split.val, &pool, &val_dirs, mode)?;
    let test_stats = relocate(&split.test, &pool, &test_dirs, mode)?;

    info!(
        "done; train: {} images / {} labels, val: {} / {}, test: {} / {}",
        train_stats.images,
        train_stats.labels,
        val_stats.images,
        val_stats.labels,
        test_stats.images,
        test_stats.labels
    );

    Ok(())
}
