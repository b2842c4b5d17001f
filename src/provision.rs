//! Local artifact store for pretrained model files.
//!
//! Models are fetched lazily by URL on first use and cached by name under a
//! local directory. Downloads land in a `.part` file that is renamed into
//! place only after the full body arrived, so an interrupted fetch never
//! registers as a present artifact.

use crate::{Error, Result};
use log::{debug, info};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Name-addressed store of model artifacts on the local filesystem
#[derive(Debug, Clone)]
pub struct ModelStore {
    model_dir: PathBuf,
}

impl ModelStore {
    /// Open a store rooted at `model_dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created
    pub fn new<P: AsRef<Path>>(model_dir: P) -> Result<Self> {
        let model_dir = model_dir.as_ref().to_path_buf();
        fs::create_dir_all(&model_dir)?;
        Ok(Self { model_dir })
    }

    /// Directory the store caches artifacts in
    #[must_use]
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Return the local path of `name`, fetching it from `url` if absent.
    ///
    /// If the file already exists the path is returned without any network
    /// access. Repeated calls are idempotent once the artifact is present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Download`] if the fetch fails for any reason
    /// (network error, non-success status, body shorter than the advertised
    /// length). No partial file is left behind on failure.
    pub fn ensure(&self, name: &str, url: &str) -> Result<PathBuf> {
        let model_path = self.model_dir.join(name);

        if model_path.exists() {
            debug!("Model already exists: {name}");
            return Ok(model_path);
        }

        info!("Downloading {name}...");
        let part_path = self.model_dir.join(format!("{name}.part"));

        match self.fetch(url, &part_path) {
            Ok(()) => {
                fs::rename(&part_path, &model_path)?;
                info!("Downloaded {name}");
                Ok(model_path)
            }
            Err(e) => {
                // Never leave a truncated artifact where a retry would find it
                let _ = fs::remove_file(&part_path);
                Err(e)
            }
        }
    }

    /// Stream `url` into `dest`, verifying the byte count against the
    /// advertised Content-Length when the server sends one
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let mut response = reqwest::blocking::get(url)?;

        if !response.status().is_success() {
            return Err(Error::Download(format!(
                "Fetching {url} returned HTTP {}",
                response.status()
            )));
        }

        let expected = response.content_length();

        let mut file = File::create(dest)?;
        let written = io::copy(&mut response, &mut file)?;
        file.sync_all()?;

        if let Some(expected) = expected {
            if written != expected {
                return Err(Error::Download(format!(
                    "Truncated download from {url}: got {written} of {expected} bytes"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_existing_file_short_circuits() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path()).unwrap();

        let existing = dir.path().join("model.onnx");
        let mut file = File::create(&existing).unwrap();
        file.write_all(b"weights").unwrap();

        // The URL is unreachable on purpose: an existing file must be
        // returned without any network access
        let path = store.ensure("model.onnx", "http://invalid.invalid/model.onnx").unwrap();
        assert_eq!(path, existing);
    }

    #[test]
    fn test_failed_fetch_leaves_no_artifact() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path()).unwrap();

        let result = store.ensure("missing.onnx", "http://invalid.invalid/missing.onnx");
        assert!(result.is_err());

        assert!(!dir.path().join("missing.onnx").exists());
        assert!(!dir.path().join("missing.onnx.part").exists());
    }

    #[test]
    fn test_creates_model_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("cache").join("models");

        let store = ModelStore::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.model_dir(), nested.as_path());
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path()).unwrap();

        let existing = dir.path().join("model.onnx");
        File::create(&existing).unwrap().write_all(b"weights").unwrap();

        let first = store.ensure("model.onnx", "http://invalid.invalid/a").unwrap();
        let second = store.ensure("model.onnx", "http://invalid.invalid/b").unwrap();
        assert_eq!(first, second);
    }
}
