use crate::error::CleanupError;
use crate::types::JobId;
use log::{debug, warn};
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

const FILE_NAME: &str = "program";

/// On-disk files belonging to one job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workspace {
    pub source: PathBuf,
    pub binary: PathBuf,
}

/// Owns the workspace root and every per-job file below it.
///
/// File names are derived from the job id alone, so two jobs never share a path as long as their ids differ.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
    extension: String,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn workspace(&self, job_id: JobId) -> Workspace {
        let stem = format!("{}-{}", FILE_NAME, job_id);
        Workspace {
            source: self.root.join(format!("{}.{}", stem, self.extension)),
            binary: self.root.join(stem),
        }
    }

    /// Create the workspace root if needed and write the submitted source.
    pub async fn allocate(&self, job_id: JobId, source_code: &str) -> io::Result<Workspace> {
        // create_dir_all tolerates a concurrent creator
        fs::create_dir_all(&self.root).await?;
        let workspace = self.workspace(job_id);
        fs::write(&workspace.source, source_code).await?;
        debug!("job {}: wrote {}", job_id, workspace.source.display());
        Ok(workspace)
    }

    /// Remove whatever files the job left behind. Safe to call more than once.
    pub async fn cleanup(&self, job_id: JobId) {
        let Workspace { source, binary } = self.workspace(job_id);
        for path in [source, binary] {
            if let Err(err) = remove(&path).await {
                warn!("job {}: {}", job_id, err);
            }
        }
    }
}

async fn remove(path: &Path) -> Result<(), CleanupError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(CleanupError {
            path: path.display().to_string(),
            source,
        }),
    }
}
