//! CLI route: run context and operation dispatch.

use crate::cli::output::exit_code;
use crate::cli::parse::{Cli, ReportFormat};
use crate::cli::presentation::{format_report_json, format_report_text, TerminalSink};
use crate::config::{ConfigLoader, HashStrategy, PicohashConfig};
use crate::error::ApiError;
use crate::reconcile::{Mode, Operation, Reconciler, RunReport};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of one invocation: the tally and its rendered summary.
#[derive(Debug)]
pub struct RunOutcome {
    pub operation: Operation,
    pub report: RunReport,
    pub summary: String,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        exit_code(&self.report)
    }
}

/// Runtime context for CLI execution: the canonical target directory and its
/// resolved configuration.
pub struct RunContext {
    root: PathBuf,
    config: PicohashConfig,
}

impl RunContext {
    /// Resolve the target directory and load its configuration.
    pub fn new(root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        if !root.is_dir() {
            return Err(ApiError::InvalidArgument(format!(
                "Not a directory: {}",
                root.display()
            )));
        }
        let root = dunce::canonicalize(&root).map_err(|e| {
            ApiError::InvalidArgument(format!("Cannot resolve {}: {}", root.display(), e))
        })?;

        let config = ConfigLoader::resolve(&root, config_path.as_ref())?;
        config.ensure_valid()?;
        debug!(root = %root.display(), strategy = ?config.hashing.strategy, "Configuration loaded");

        Ok(Self { root, config })
    }

    /// Fold hashing flags into the loaded configuration.
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        apply_cli_overrides(&mut self.config, cli);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &PicohashConfig {
        &self.config
    }

    /// Run the operation the flags select, streaming status lines to stdout.
    pub fn execute(&self, cli: &Cli) -> Result<RunOutcome, ApiError> {
        let operation = operation_from_cli(cli);
        let reconciler = Reconciler::from_config(self.root.clone(), &self.config);

        let stdout = std::io::stdout();
        let color = !cli.no_color && stdout.is_terminal();
        let mut sink = TerminalSink::new(stdout.lock(), cli.format, color);
        let report = reconciler.execute(operation, &mut sink)?;
        info!(operation = operation.name(), clean = report.is_clean(), "Run complete");

        let summary = match cli.format {
            ReportFormat::Text => format_report_text(operation, &report),
            ReportFormat::Json => format_report_json(operation, &report)?,
        };
        Ok(RunOutcome {
            operation,
            report,
            summary,
        })
    }
}

/// The single operation selected by the flags; clap has already rejected
/// conflicting combinations.
pub fn operation_from_cli(cli: &Cli) -> Operation {
    if cli.join {
        Operation::JoinSidecars
    } else if cli.split {
        Operation::SplitAggregate
    } else if cli.remove {
        Operation::RemoveSidecars
    } else {
        Operation::Reconcile(Mode::from_flags(cli.check, cli.aggregate))
    }
}

fn apply_cli_overrides(config: &mut PicohashConfig, cli: &Cli) {
    if cli.hdd {
        config.hashing.slow_media = true;
    }
    if cli.piped {
        config.hashing.strategy = HashStrategy::Piped;
    }
    if cli.builtin {
        config.hashing.strategy = HashStrategy::Builtin;
    }
}
