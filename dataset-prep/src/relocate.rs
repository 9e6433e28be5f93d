//! Image/annotation pair relocation into a subset.

use crate::{common::*, config::RelocationMode, pool::Pool};

/// The `images/` and `labels/` areas of one subset.
#[derive(Debug, Clone)]
pub struct SubsetDirs {
    pub images: PathBuf,
    pub labels: PathBuf,
}

impl SubsetDirs {
    /// Creates the subset layout under `root`, keeping any existing content.
    pub fn create(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let images = root.join("images");
        let labels = root.join("labels");
        fs::create_dir_all(&images)
            .with_context(|| format!("failed to create '{}'", images.display()))?;
        fs::create_dir_all(&labels)
            .with_context(|| format!("failed to create '{}'", labels.display()))?;
        Ok(Self { images, labels })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelocateStats {
    pub images: usize,
    pub labels: usize,
    pub missing_images: usize,
    pub missing_labels: usize,
}

/// Transfers each named image and its annotation into the subset directories.
///
/// A name whose image is gone from the pool is reported and skipped, which
/// keeps retried or partially completed runs safe. A missing annotation is a
/// warning; its image is still relocated. Only files named by the relocated
/// bases are written, so unrelated destination content is never touched.
pub fn relocate(
    names: &[String],
    pool: &Pool,
    dest: &SubsetDirs,
    mode: RelocationMode,
) -> Result<RelocateStats> {
    let mut stats = RelocateStats::default();

    for base in names {
        let image_src = pool.image_path(base);
        if !image_src.is_file() {
            error!(
                "image '{}' is gone from the pool; skipping",
                image_src.display()
            );
            stats.missing_images += 1;
            continue;
        }
        let image_dst = dest
            .images
            .join(format!("{}.{}", base, pool.image_ext()));
        transfer(&image_src, &image_dst, mode)?;
        stats.images += 1;

        let label_src = pool.label_path(base);
        if label_src.is_file() {
            let label_dst = dest.labels.join(format!("{}.txt", base));
            transfer(&label_src, &label_dst, mode)?;
            stats.labels += 1;
        } else {
            warn!("no annotation for '{}'; image relocated alone", base);
            stats.missing_labels += 1;
        }
    }

    Ok(stats)
}

fn transfer(src: &Path, dst: &Path, mode: RelocationMode) -> Result<()> {
    match mode {
        RelocationMode::Copy => {
            fs::copy(src, dst).with_context(|| {
                format!("failed to copy '{}' to '{}'", src.display(), dst.display())
            })?;
        }
        RelocationMode::Move => {
            // rename fails across filesystems; fall back to copy + remove
            if fs::rename(src, dst).is_err() {
                fs::copy(src, dst).with_context(|| {
                    format!("failed to copy '{}' to '{}'", src.display(), dst.display())
                })?;
                fs::remove_file(src)
                    .with_context(|| format!("failed to remove '{}'", src.display()))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_pool(dir: &Path, bases: &[&str], with_labels: bool) -> Pool {
        for base in bases {
            fs::write(dir.join(format!("{}.png", base)), b"img").unwrap();
            if with_labels {
                fs::write(dir.join(format!("{}.txt", base)), "0 0.5 0.5 0.1 0.1\n").unwrap();
            }
        }
        Pool::new(dir, "png")
    }

    #[test]
    fn unrelated_destination_files_survive() {
        let pool_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let pool = seed_pool(pool_dir.path(), &["a", "b"], true);
        let dest = SubsetDirs::create(out_dir.path().join("train")).unwrap();

        fs::write(dest.images.join("c.png"), b"keep").unwrap();

        let names = vec!["a".to_owned(), "b".to_owned()];
        let stats = relocate(&names, &pool, &dest, RelocationMode::Move).unwrap();
        assert_eq!(stats.images, 2);
        assert_eq!(stats.labels, 2);

        assert_eq!(fs::read(dest.images.join("c.png")).unwrap(), b"keep");
        assert!(dest.images.join("a.png").is_file());
        assert!(dest.images.join("b.png").is_file());
        assert!(dest.labels.join("a.txt").is_file());
    }

    #[test]
    fn move_drains_the_pool_copy_does_not() {
        let pool_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let pool = seed_pool(pool_dir.path(), &["moved", "copied"], true);

        let dest = SubsetDirs::create(out_dir.path().join("train")).unwrap();
        relocate(&["moved".to_owned()], &pool, &dest, RelocationMode::Move).unwrap();
        relocate(&["copied".to_owned()], &pool, &dest, RelocationMode::Copy).unwrap();

        assert!(!pool.image_path("moved").is_file());
        assert!(!pool.label_path("moved").is_file());
        assert!(pool.image_path("copied").is_file());
        assert!(pool.label_path("copied").is_file());
        assert!(dest.images.join("moved.png").is_file());
        assert!(dest.images.join("copied.png").is_file());
    }

    #[test]
    fn missing_label_is_tolerated() {
        let pool_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let pool = seed_pool(pool_dir.path(), &["lonely"], false);
        let dest = SubsetDirs::create(out_dir.path().join("val")).unwrap();

        let stats = relocate(&["lonely".to_owned()], &pool, &dest, RelocationMode::Move).unwrap();
        assert_eq!(stats.images, 1);
        assert_eq!(stats.labels, 0);
        assert_eq!(stats.missing_labels, 1);
        assert!(dest.images.join("lonely.png").is_file());
        assert!(!dest.labels.join("lonely.txt").is_file());
    }

    #[test]
    fn rerun_is_a_reported_no_op() {
        let pool_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let pool = seed_pool(pool_dir.path(), &["once"], true);
        let dest = SubsetDirs::create(out_dir.path().join("test")).unwrap();

        let names = vec!["once".to_owned()];
        relocate(&names, &pool, &dest, RelocationMode::Move).unwrap();
        let stats = relocate(&names, &pool, &dest, RelocationMode::Move).unwrap();

        assert_eq!(stats.images, 0);
        assert_eq!(stats.missing_images, 1);
        assert!(dest.images.join("once.png").is_file());
    }

    #[test]
    fn create_keeps_existing_subset_content() {
        let out_dir = tempfile::tempdir().unwrap();
        let dest = SubsetDirs::create(out_dir.path().join("train")).unwrap();
        fs::write(dest.images.join("old.png"), b"old").unwrap();

        let again = SubsetDirs::create(out_dir.path().join("train")).unwrap();
        assert_eq!(fs::read(again.images.join("old.png")).unwrap(), b"old");
    }
}
