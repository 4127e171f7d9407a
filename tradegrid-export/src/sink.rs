//! Where finished artifacts go.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};

use crate::document::Artifact;

/// The download mechanism. Implementations must be shareable with an export thread.
pub trait ArtifactSink: Send + Sync {
    fn deliver(&self, artifact: &Artifact) -> Result<()>;
}

/// Writes `<dir>/<filename>`, creating the directory when needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn deliver(&self, artifact: &Artifact) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.dir.join(&artifact.filename);
        // staged under a hidden name, then renamed into place
        let partial = self.dir.join(format!(".{}.partial", artifact.filename));
        let staged = std::fs::write(&partial, &artifact.bytes)
            .with_context(|| format!("failed to write {}", partial.display()))
            .and_then(|()| {
                std::fs::rename(&partial, &path)
                    .with_context(|| format!("failed to move export into {}", path.display()))
            });
        if staged.is_err() && partial.exists() {
            if let Err(err) = std::fs::remove_file(&partial) {
                tracing::warn!(path = %partial.display(), error = %err, "failed to remove partial export");
            }
        }
        staged
    }
}

/// Keeps delivered artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Artifact>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> Vec<Artifact> {
        match self.delivered.lock() {
            Ok(list) => list.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.artifacts().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactSink for MemorySink {
    fn deliver(&self, artifact: &Artifact) -> Result<()> {
        let mut list = self
            .delivered
            .lock()
            .map_err(|_| anyhow::anyhow!("memory sink lock poisoned"))?;
        list.push(artifact.clone());
        Ok(())
    }
}

impl<S: ArtifactSink + ?Sized> ArtifactSink for std::sync::Arc<S> {
    fn deliver(&self, artifact: &Artifact) -> Result<()> {
        (**self).deliver(artifact)
    }
}
