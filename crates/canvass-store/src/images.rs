//! Filesystem-backed image storage.
//!
//! Images live under the store's image root, keyed by the relative path
//! recorded in each row's `image_path` column. `delete_if_unused` consults
//! the database before touching the filesystem, so a path shared between
//! rows (e.g. after `clone_image` races) survives until its last reference
//! is gone.

use anyhow::{Context, Result, bail};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

use canvass_core::model::image::ImageRef;
use canvass_core::store::ImageStore;

use crate::repos::SqliteStore;

/// Every table carrying an `image_path` column.
const IMAGE_TABLES: [&str; 10] = [
    "faqs",
    "info_cards",
    "form_questions",
    "form_options",
    "slider_labels",
    "test_groups",
    "protocols",
    "phases",
    "test_questions",
    "test_options",
];

impl SqliteStore {
    fn image_file(&self, path: &str) -> Result<PathBuf> {
        // Storage keys are engine-generated relative paths; reject anything
        // that would escape the image root.
        if path.is_empty()
            || PathBuf::from(path).is_absolute()
            || path.split('/').any(|part| part == "..")
        {
            bail!("invalid image path: {path}");
        }
        Ok(self.image_root().join(path))
    }

    fn reference_count(&self, path: &str) -> Result<i64> {
        let mut total = 0i64;
        for table in IMAGE_TABLES {
            let sql = format!("SELECT COUNT(*) FROM {table} WHERE image_path = ?1");
            let count: i64 = self
                .conn()
                .query_row(&sql, [path], |row| row.get(0))
                .with_context(|| format!("count image references in {table}"))?;
            total += count;
        }
        Ok(total)
    }
}

impl ImageStore for SqliteStore {
    fn save(&self, bytes: &[u8], path: &str) -> Result<()> {
        let file = self.image_file(path)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create image directory {}", parent.display()))?;
        }
        fs::write(&file, bytes).with_context(|| format!("write image {}", file.display()))?;
        debug!(path, size = bytes.len(), "image saved");
        Ok(())
    }

    fn create_and_save(
        &self,
        bytes: &[u8],
        category: &str,
        filename: &str,
        alt: &str,
    ) -> Result<ImageRef> {
        let path = format!("{category}/{filename}");
        ImageStore::save(self, bytes, &path)?;
        Ok(ImageRef::new(path, alt))
    }

    fn delete(&self, path: &str) -> Result<()> {
        let file = self.image_file(path)?;
        match fs::remove_file(&file) {
            Ok(()) => {
                debug!(path, "image deleted");
                Ok(())
            }
            // Missing content is not worth failing the batch over.
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path, "image already absent on delete");
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("delete image {}", file.display())),
        }
    }

    fn delete_if_unused(&self, image: &ImageRef) -> Result<bool> {
        if self.reference_count(&image.path)? > 0 {
            debug!(path = image.path, "image still referenced, keeping");
            return Ok(false);
        }
        self.delete(&image.path)?;
        Ok(true)
    }

    fn clone_image(&self, image: &ImageRef) -> Result<ImageRef> {
        let source = self.image_file(&image.path)?;
        let bytes = fs::read(&source)
            .with_context(|| format!("read image {} for cloning", source.display()))?;

        let (stem, ext) = match image.path.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (image.path.as_str(), None),
        };
        let mut n = 0u32;
        let path = loop {
            let candidate = match (n, ext) {
                (0, Some(ext)) => format!("{stem}_copy.{ext}"),
                (0, None) => format!("{stem}_copy"),
                (n, Some(ext)) => format!("{stem}_copy{n}.{ext}"),
                (n, None) => format!("{stem}_copy{n}"),
            };
            if !self.image_file(&candidate)?.exists() {
                break candidate;
            }
            n += 1;
        };

        ImageStore::save(self, &bytes, &path)?;
        Ok(ImageRef::new(path, image.alt.clone()))
    }
}
