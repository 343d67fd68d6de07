//! Manifest transforms: join, split and remove

use super::{EventSink, FileEvent, Reconciler, Run, RunReport};
use crate::error::{ApiError, StorageError};
use crate::manifest::{sidecar, AggregateManifest};
use crate::tree::path;
use std::fs;
use tracing::{debug, warn};

impl Reconciler {
    /// Merge every sidecar under the root into the aggregate manifest.
    ///
    /// Existing aggregate entries are kept; a sidecar for the same file replaces
    /// its entry. Sidecars are left in place.
    pub fn join_sidecars(&self, sink: &mut dyn EventSink) -> Result<RunReport, ApiError> {
        let mut run = Run::new(sink);
        let mut manifest = AggregateManifest::load(&self.root, &self.layout)?;

        for file in self.walker().files() {
            let file = file?;
            if !self.layout.is_sidecar(&file) {
                continue;
            }
            let Some(original) = self.layout.original_of(&file) else {
                continue;
            };
            let Some(key) = self.key_or_skip(&original, &mut run)? else {
                continue;
            };
            let digest = sidecar::read_expected_digest(&original, &self.layout)?;
            if let Some(previous) = manifest.insert(key.clone(), digest) {
                debug!(entry = %key, replaced = %previous, "Sidecar replaces aggregate entry");
            }
            run.emit(FileEvent::Collected { path: key });
        }

        manifest.save()?;
        run.emit(FileEvent::Written {
            path: self.layout.aggregate_name().to_string(),
        });
        Ok(run.finish())
    }

    /// Write a sidecar for every aggregate manifest entry.
    ///
    /// Entries whose file no longer exists are reported as "file not found" and
    /// skipped. The aggregate manifest is left in place.
    pub fn split_aggregate(&self, sink: &mut dyn EventSink) -> Result<RunReport, ApiError> {
        let mut run = Run::new(sink);

        if !AggregateManifest::exists(&self.root, &self.layout)? {
            warn!(
                manifest = %self.layout.aggregate_path(&self.root).display(),
                "No aggregate manifest to split"
            );
            return Ok(run.finish());
        }
        let manifest = AggregateManifest::load(&self.root, &self.layout)?;

        for (key, digest) in manifest.iter() {
            let file = path::resolve_key(&self.root, key);
            if !path::exists(&file)? {
                run.emit(FileEvent::FileNotFound {
                    path: key.to_string(),
                });
                continue;
            }
            sidecar::write_sidecar(&file, digest, &self.layout)?;
            run.emit(FileEvent::Written {
                path: format!("{}.{}", key, self.layout.sidecar_extension()),
            });
        }

        Ok(run.finish())
    }

    /// Delete every sidecar under the root. Aggregate manifests are kept.
    pub fn remove_sidecars(&self, sink: &mut dyn EventSink) -> Result<RunReport, ApiError> {
        let mut run = Run::new(sink);

        for file in self.walker().files() {
            let file = file?;
            if !self.layout.is_sidecar(&file) {
                continue;
            }
            // Sidecars with unrecordable names are still ours to delete.
            let key = match path::relative_key(&self.root, &file) {
                Err(StorageError::UnsupportedName(name)) => name,
                other => other?,
            };
            fs::remove_file(&file).map_err(|e| StorageError::io(&file, e))?;
            run.emit(FileEvent::Removed { path: key });
        }

        Ok(run.finish())
    }
}
