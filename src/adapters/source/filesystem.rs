//! Filesystem record source
//!
//! Walks one or more roots for `*.geojson` files. In [`SourceMode::Repo`] each root is a
//! Who's On First repository and only its `data/` directory is walked; in
//! [`SourceMode::Directory`] the root itself is walked. Walking happens on the blocking pool
//! and hands paths to the async side through a bounded channel, so a slow consumer stops the
//! walk instead of buffering the whole tree.

use super::RecordSource;
use crate::config::SourceMode;
use crate::domain::context::ResultExt;
use crate::domain::{IndexerError, Record, Result};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use walkdir::WalkDir;

const GEOJSON_EXTENSION: &str = "geojson";
const REPO_DATA_DIR: &str = "data";
const PATH_BUFFER: usize = 256;

/// Reads records from files on disk
#[derive(Debug, Clone)]
pub struct FilesystemSource {
    roots: Vec<PathBuf>,
    mode: SourceMode,
}

impl FilesystemSource {
    pub fn new(roots: Vec<PathBuf>, mode: SourceMode) -> Self {
        Self { roots, mode }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    /// Directories that are actually walked
    fn walk_roots(&self) -> Vec<PathBuf> {
        self.roots
            .iter()
            .map(|root| match self.mode {
                SourceMode::Repo => root.join(REPO_DATA_DIR),
                SourceMode::Directory => root.clone(),
            })
            .collect()
    }
}

impl RecordSource for FilesystemSource {
    fn records(&self) -> BoxStream<'_, Result<Record>> {
        let (tx, rx) = mpsc::channel(PATH_BUFFER);
        let roots = self.walk_roots();
        let mode = self.mode;

        tokio::task::spawn_blocking(move || walk(roots, mode, tx));

        futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|entry| (entry, rx))
        })
        .then(|entry| async move {
            match entry {
                Ok(path) => read_record(path).await,
                Err(e) => Err(e),
            }
        })
        .boxed()
    }
}

fn walk(roots: Vec<PathBuf>, mode: SourceMode, tx: mpsc::Sender<Result<PathBuf>>) {
    for root in roots {
        if !root.exists() {
            let message = match mode {
                SourceMode::Repo => format!(
                    "{} does not exist; is the parent a Who's On First repository?",
                    root.display()
                ),
                SourceMode::Directory => format!("{} does not exist", root.display()),
            };
            let _ = tx.blocking_send(Err(IndexerError::Source(message)));
            return;
        }

        tracing::debug!(root = %root.display(), "Walking source directory");

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let item = match entry {
                Ok(entry) if entry.file_type().is_file() && is_geojson(entry.path()) => {
                    Ok(entry.into_path())
                }
                Ok(_) => continue,
                Err(e) => Err(IndexerError::Io(format!(
                    "Failed to walk {}: {e}",
                    root.display()
                ))),
            };

            let fatal = item.is_err();
            // The receiver is gone once the run stops pulling records.
            if tx.blocking_send(item).is_err() || fatal {
                return;
            }
        }
    }
}

fn is_geojson(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(GEOJSON_EXTENSION))
}

async fn read_record(path: PathBuf) -> Result<Record> {
    let body = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Record::new(path.display().to_string(), body))
}
