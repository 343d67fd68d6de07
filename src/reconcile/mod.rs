//! Manifest Reconciler
//!
//! One sequential pass over the target directory, driven by a [`Mode`]:
//!
//! | mode               | file with a recorded digest | file without one        |
//! |--------------------|-----------------------------|-------------------------|
//! | generate sidecars  | skipped                     | hashed, sidecar written |
//! | generate aggregate | skipped                     | hashed, added to map    |
//! | verify sidecars    | hashed and compared         | "hash not found"        |
//! | verify aggregate   | hashed and compared         | "hash not found"        |
//!
//! Verify modes also report recorded digests whose file is gone ("file not
//! found"), found from the manifest side. Mismatches and missing references are
//! counted and the walk continues; any hash, I/O or format error aborts the
//! run with that first error.

pub mod event;
pub mod report;
mod transform;

pub use event::{EventSink, FileEvent, NullSink};
pub use report::RunReport;

use crate::config::PicohashConfig;
use crate::error::{ApiError, StorageError};
use crate::hash::{hasher_from_config, Digest, Hasher};
use crate::manifest::{sidecar, AggregateManifest, Layout};
use crate::tree::path;
use crate::tree::walker::{Walker, WalkerConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};

/// Reconciliation mode, from the verify and aggregate toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    GenerateSidecars,
    GenerateAggregate,
    VerifySidecars,
    VerifyAggregate,
}

impl Mode {
    pub fn from_flags(verify: bool, aggregate: bool) -> Self {
        match (verify, aggregate) {
            (false, false) => Mode::GenerateSidecars,
            (false, true) => Mode::GenerateAggregate,
            (true, false) => Mode::VerifySidecars,
            (true, true) => Mode::VerifyAggregate,
        }
    }

    pub fn is_verify(self) -> bool {
        matches!(self, Mode::VerifySidecars | Mode::VerifyAggregate)
    }

    pub fn is_aggregate(self) -> bool {
        matches!(self, Mode::GenerateAggregate | Mode::VerifyAggregate)
    }
}

/// Exactly one of these runs per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Reconcile(Mode),
    /// Merge every sidecar into the aggregate manifest.
    JoinSidecars,
    /// Write a sidecar for every aggregate manifest entry.
    SplitAggregate,
    /// Delete every sidecar, keeping aggregate manifests.
    RemoveSidecars,
}

impl Operation {
    /// Stable name for logs ("verify.sidecars", "join", ...).
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Reconcile(Mode::GenerateSidecars) => "generate.sidecars",
            Operation::Reconcile(Mode::GenerateAggregate) => "generate.aggregate",
            Operation::Reconcile(Mode::VerifySidecars) => "verify.sidecars",
            Operation::Reconcile(Mode::VerifyAggregate) => "verify.aggregate",
            Operation::JoinSidecars => "join",
            Operation::SplitAggregate => "split",
            Operation::RemoveSidecars => "remove",
        }
    }

    pub fn is_verify(&self) -> bool {
        matches!(self, Operation::Reconcile(mode) if mode.is_verify())
    }
}

/// Event fan-out plus the running tally.
struct Run<'s> {
    report: RunReport,
    sink: &'s mut dyn EventSink,
}

impl<'s> Run<'s> {
    fn new(sink: &'s mut dyn EventSink) -> Self {
        Self {
            report: RunReport::new(),
            sink,
        }
    }

    fn emit(&mut self, event: FileEvent) {
        self.report.record(&event);
        self.sink.record(&event);
    }

    fn compare(&mut self, path: String, expected: Digest, actual: Digest) {
        if expected.matches(&actual) {
            self.emit(FileEvent::Verified { path });
        } else {
            self.emit(FileEvent::Mismatch {
                path,
                expected,
                actual,
            });
        }
    }

    fn finish(self) -> RunReport {
        self.report
    }
}

/// Runs reconciliation and manifest transforms over one root directory.
pub struct Reconciler {
    root: PathBuf,
    hasher: Box<dyn Hasher>,
    walker: WalkerConfig,
    layout: Layout,
}

impl Reconciler {
    pub fn new(root: PathBuf, hasher: Box<dyn Hasher>) -> Self {
        Self {
            root,
            hasher,
            walker: WalkerConfig::default(),
            layout: Layout::default(),
        }
    }

    /// Hasher, walker and layout all taken from `config`.
    pub fn from_config(root: PathBuf, config: &PicohashConfig) -> Self {
        Self {
            root,
            hasher: hasher_from_config(&config.hashing),
            walker: WalkerConfig::from(&config.walk),
            layout: Layout::from(&config.manifest),
        }
    }

    pub fn with_walker_config(mut self, walker: WalkerConfig) -> Self {
        self.walker = walker;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Run one operation to completion.
    pub fn execute(
        &self,
        operation: Operation,
        sink: &mut dyn EventSink,
    ) -> Result<RunReport, ApiError> {
        let span = info_span!(
            "operation",
            name = operation.name(),
            root = %self.root.display(),
            hasher = self.hasher.name()
        );
        let _enter = span.enter();
        info!("Starting");

        let report = match operation {
            Operation::Reconcile(mode) => self.reconcile(mode, sink),
            Operation::JoinSidecars => self.join_sidecars(sink),
            Operation::SplitAggregate => self.split_aggregate(sink),
            Operation::RemoveSidecars => self.remove_sidecars(sink),
        }?;

        info!(?report, "Finished");
        Ok(report)
    }

    /// Generate or verify digests for every file under the root.
    pub fn reconcile(&self, mode: Mode, sink: &mut dyn EventSink) -> Result<RunReport, ApiError> {
        let mut run = Run::new(sink);

        match mode {
            Mode::GenerateSidecars => {
                self.for_each_file(&mut run, false, |file, key, run| {
                    self.generate_sidecar(file, key, run)
                })?;
            }
            Mode::VerifySidecars => {
                self.for_each_file(&mut run, true, |file, key, run| {
                    self.verify_sidecar(file, key, run)
                })?;
            }
            Mode::GenerateAggregate => {
                let mut manifest = AggregateManifest::load(&self.root, &self.layout)?;
                self.for_each_file(&mut run, false, |file, key, run| {
                    self.generate_entry(&mut manifest, file, key, run)
                })?;
                manifest.save()?;
                run.emit(FileEvent::Written {
                    path: self.layout.aggregate_name().to_string(),
                });
            }
            Mode::VerifyAggregate => {
                let manifest = AggregateManifest::load(&self.root, &self.layout)?;
                self.report_aggregate_orphans(&manifest, &mut run)?;
                self.for_each_file(&mut run, false, |file, key, run| {
                    self.verify_entry(&manifest, file, key, run)
                })?;
            }
        }

        Ok(run.finish())
    }

    fn walker(&self) -> Walker {
        Walker::with_config(self.root.clone(), self.walker.clone())
    }

    /// Manifest key for `file`, or `None` after reporting a name that cannot
    /// be recorded.
    fn key_or_skip(&self, file: &Path, run: &mut Run) -> Result<Option<String>, ApiError> {
        match path::relative_key(&self.root, file) {
            Ok(key) => Ok(Some(key)),
            Err(StorageError::UnsupportedName(name)) => {
                warn!(file = %name, "Skipping file name that cannot be recorded in a manifest");
                run.emit(FileEvent::Unsupported { path: name });
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Visit every non-manifest file with its manifest key. Sidecars are
    /// checked for orphans on the way when `check_sidecar_orphans` is set.
    fn for_each_file<'s, F>(
        &self,
        run: &mut Run<'s>,
        check_sidecar_orphans: bool,
        mut visit: F,
    ) -> Result<(), ApiError>
    where
        F: FnMut(&Path, String, &mut Run<'s>) -> Result<(), ApiError>,
    {
        for file in self.walker().files() {
            let file = file?;
            if self.layout.is_manifest_file(&file) {
                if check_sidecar_orphans && self.layout.is_sidecar(&file) {
                    self.check_sidecar_orphan(&file, run)?;
                }
                continue;
            }
            let Some(key) = self.key_or_skip(&file, run)? else {
                continue;
            };
            visit(&file, key, run)?;
        }
        Ok(())
    }

    fn hash(&self, file: &Path) -> Result<Digest, ApiError> {
        debug!(file = %file.display(), "Hashing");
        Ok(self.hasher.compute(file)?)
    }

    fn generate_sidecar(&self, file: &Path, key: String, run: &mut Run) -> Result<(), ApiError> {
        if path::exists(&self.layout.sidecar_for(file))? {
            run.emit(FileEvent::Skipped { path: key });
            return Ok(());
        }
        let digest = self.hash(file)?;
        sidecar::write_sidecar(file, &digest, &self.layout)?;
        run.emit(FileEvent::Computed { path: key });
        Ok(())
    }

    fn verify_sidecar(&self, file: &Path, key: String, run: &mut Run) -> Result<(), ApiError> {
        if !path::exists(&self.layout.sidecar_for(file))? {
            run.emit(FileEvent::HashNotFound { path: key });
            return Ok(());
        }
        let expected = sidecar::read_expected_digest(file, &self.layout)?;
        let actual = self.hash(file)?;
        run.compare(key, expected, actual);
        Ok(())
    }

    fn generate_entry(
        &self,
        manifest: &mut AggregateManifest,
        file: &Path,
        key: String,
        run: &mut Run,
    ) -> Result<(), ApiError> {
        if manifest.contains(&key) {
            run.emit(FileEvent::Skipped { path: key });
            return Ok(());
        }
        let digest = self.hash(file)?;
        manifest.insert(key.clone(), digest);
        run.emit(FileEvent::Computed { path: key });
        Ok(())
    }

    fn verify_entry(
        &self,
        manifest: &AggregateManifest,
        file: &Path,
        key: String,
        run: &mut Run,
    ) -> Result<(), ApiError> {
        let Some(expected) = manifest.get(&key) else {
            run.emit(FileEvent::HashNotFound { path: key });
            return Ok(());
        };
        let actual = self.hash(file)?;
        run.compare(key, expected.clone(), actual);
        Ok(())
    }

    /// Report every sidecar whose original file is gone.
    fn check_sidecar_orphan(&self, sidecar: &Path, run: &mut Run) -> Result<(), ApiError> {
        let Some(original) = self.layout.original_of(sidecar) else {
            return Ok(());
        };
        if !path::exists(&original)? {
            if let Some(key) = self.key_or_skip(&original, run)? {
                run.emit(FileEvent::FileNotFound { path: key });
            }
        }
        Ok(())
    }

    /// Report every aggregate entry whose file is gone.
    fn report_aggregate_orphans(
        &self,
        manifest: &AggregateManifest,
        run: &mut Run,
    ) -> Result<(), ApiError> {
        for (key, _) in manifest.iter() {
            if !path::exists(&path::resolve_key(&self.root, key))? {
                run.emit(FileEvent::FileNotFound {
                    path: key.to_string(),
                });
            }
        }
        Ok(())
    }
}
