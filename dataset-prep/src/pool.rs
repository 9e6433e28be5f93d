//! The staging pool of image/annotation pairs.

use crate::common::*;

/// Suffixes tagging samples produced by an augmentation pass.
pub const DERIVED_SUFFIXES: &[&str] = &["-blurry", "-rotated"];

/// Whether a base name was produced by a previous augmentation pass.
pub fn is_derived(base: &str) -> bool {
    DERIVED_SUFFIXES.iter().any(|suffix| base.ends_with(suffix))
}

#[derive(Debug, Clone)]
pub struct Pool {
    dir: PathBuf,
    image_ext: String,
}

impl Pool {
    pub fn new(dir: impl Into<PathBuf>, image_ext: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            image_ext: image_ext.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn image_ext(&self) -> &str {
        &self.image_ext
    }

    /// Lists the base names of pool images.
    ///
    /// The directory is read fresh on every call, so files written by an
    /// earlier pass are always visible. Names are returned sorted to make a
    /// seeded shuffle reproducible.
    pub fn list(&self) -> Result<Vec<String>> {
        let pattern = self.dir.join(format!("*.{}", self.image_ext));
        let pattern = pattern
            .to_str()
            .ok_or_else(|| format_err!("non-UTF-8 pool path '{}'", self.dir.display()))?;

        let names: IndexSet<_> = glob::glob(pattern)?
            .map(|entry| {
                let path = entry?;
                let base = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .ok_or_else(|| format_err!("invalid file name '{}'", path.display()))?;
                Ok(base.to_owned())
            })
            .collect::<Result<_>>()?;

        Ok(names.into_iter().sorted().collect())
    }

    pub fn image_path(&self, base: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", base, self.image_ext))
    }

    pub fn label_path(&self, base: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", base))
    }

    /// Reads the annotation for a base name, or `None` when the file is
    /// absent.
    pub fn read_labels(&self, base: &str) -> Result<Option<Vec<RatioLabel>>> {
        let path = self.label_path(base);
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        let labels = parse_labels(&text)
            .with_context(|| format!("malformed annotation '{}'", path.display()))?;
        Ok(Some(labels))
    }

    pub fn write_labels(&self, base: &str, labels: &[RatioLabel]) -> Result<()> {
        let path = self.label_path(base);
        fs::write(&path, serialize_labels(labels))
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_names_are_tagged() {
        assert!(is_derived("frame_0001-blurry"));
        assert!(is_derived("frame_0001-rotated"));
        assert!(!is_derived("frame_0001"));
        assert!(!is_derived("blurry-frame"));
    }

    #[test]
    fn list_returns_sorted_base_names() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png", "c.txt", "d.jpg"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let pool = Pool::new(dir.path(), "png");
        assert_eq!(pool.list().unwrap(), vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn read_labels_absent_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let pool = Pool::new(dir.path(), "png");
        assert!(pool.read_labels("missing").unwrap().is_none());
    }

    #[test]
    fn label_round_trip_through_pool() {
        let dir = tempfile::tempdir().unwrap();
        let pool = Pool::new(dir.path(), "png");

        let labels = parse_labels("1 0.5 0.5 0.25 0.25\n").unwrap();
        pool.write_labels("sample", &labels).unwrap();

        let read = pool.read_labels("sample").unwrap().unwrap();
        assert_eq!(read, labels);
    }
}
