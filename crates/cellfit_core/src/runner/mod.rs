//! Black-box execution of the external simulator
//!
//! A [`BlackBoxRunner`] turns "parameters in, metrics out" into one call:
//!
//! 1. the optional [`Updater`] writes the parameters into the configuration
//! 2. for every replicate the output directory is cleared, the executable is
//!    run to completion in the working directory, the optional
//!    [`Processor`] extracts a metric, and the output directory is removed
//!    or archived
//!
//! Execution is strictly sequential; a failing replicate stops the run.

mod processor;
mod updater;

use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use jiff::Timestamp;
use tracing::{debug, info, warn};

use crate::error::{Error, ExecutionError, Result};
use crate::model::{Metric, ParameterVector};
use crate::util::{clear_directory, move_directory};

pub use processor::Processor;
pub use updater::{CellUpdater, PathUpdater, Updater};

/// Anything that maps a parameter vector to replicate metrics
pub trait BlackBox {
    fn evaluate(&mut self, params: &ParameterVector) -> Result<Vec<Metric>>;
}

impl<F> BlackBox for F
where
    F: FnMut(&ParameterVector) -> Result<Vec<Metric>>,
{
    fn evaluate(&mut self, params: &ParameterVector) -> Result<Vec<Metric>> {
        self(params)
    }
}

/// Appends the platform executable suffix when `name` lacks it
pub fn resolve_executable(working_dir: &Path, name: impl AsRef<Path>) -> PathBuf {
    let path = working_dir.join(name);
    if EXE_SUFFIX.is_empty() || path.to_string_lossy().ends_with(EXE_SUFFIX) {
        return path;
    }
    let mut with_suffix = path.into_os_string();
    with_suffix.push(EXE_SUFFIX);
    PathBuf::from(with_suffix)
}

/// Wrapper that runs the simulator executable as a black box
pub struct BlackBoxRunner {
    working_dir: PathBuf,
    executable: PathBuf,
    args: Vec<String>,
    output_dir: PathBuf,
    archive_root: Option<PathBuf>,
    updater: Option<Box<dyn Updater>>,
    processor: Option<Box<dyn Processor>>,
    replicates: usize,
    keep_outputs: bool,
    runs: u64,
}

impl BlackBoxRunner {
    /// `executable` and `output_dir` are interpreted relative to `working_dir`
    pub fn new(
        working_dir: impl Into<PathBuf>,
        executable: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Self {
        let working_dir = working_dir.into();
        Self {
            executable: resolve_executable(&working_dir, executable),
            output_dir: working_dir.join(output_dir),
            working_dir,
            args: Vec::new(),
            archive_root: None,
            updater: None,
            processor: None,
            replicates: 1,
            keep_outputs: false,
            runs: 0,
        }
    }

    pub fn with_updater(mut self, updater: impl Updater + 'static) -> Self {
        self.updater = Some(Box::new(updater));
        self
    }

    pub fn with_processor(mut self, processor: impl Processor + 'static) -> Self {
        self.processor = Some(Box::new(processor));
        self
    }

    /// Directory kept replicate outputs are moved under
    pub fn with_archive_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.archive_root = Some(root.into());
        self
    }

    /// Extra command-line arguments passed to the executable
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Replicates and output handling used by [`BlackBox::evaluate`]
    pub fn with_replicates(mut self, replicates: usize, keep_outputs: bool) -> Self {
        self.replicates = replicates;
        self.keep_outputs = keep_outputs;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Update, execute and collect `replicates` times.
    ///
    /// Returns one metric per replicate when a processor is set and an empty
    /// vector otherwise. Metrics are never averaged here.
    pub fn run(
        &mut self,
        params: &ParameterVector,
        replicates: usize,
        keep_outputs: bool,
    ) -> Result<Vec<Metric>> {
        if replicates == 0 {
            return Err(ExecutionError::NoReplicates.into());
        }
        if keep_outputs && self.archive_root.is_none() {
            return Err(ExecutionError::NoArchiveRoot.into());
        }

        if let Some(updater) = self.updater.as_mut() {
            updater.update(params)?;
        }

        self.runs += 1;
        let archive = self
            .archive_root
            .as_deref()
            .filter(|_| keep_outputs)
            .map(|root| unique_run_dir(root, self.runs));

        info!(%params, replicates, executable = %self.executable.display(), "running simulator");
        let mut metrics = Vec::with_capacity(replicates);
        for replicate in 0..replicates {
            clear_directory(&self.output_dir).map_err(Error::io(&self.output_dir))?;
            self.execute(replicate)?;

            if let Some(processor) = self.processor.as_mut() {
                let metric = processor.process(&self.output_dir)?;
                debug!(replicate, values = metric.len(), "collected metric");
                metrics.push(metric);
            }

            match &archive {
                Some(run_dir) => {
                    let target = run_dir.join(format!("replicate-{replicate}"));
                    move_directory(&self.output_dir, &target).map_err(Error::io(&target))?;
                    debug!(replicate, archive = %target.display(), "archived outputs");
                }
                None => {
                    std::fs::remove_dir_all(&self.output_dir)
                        .map_err(Error::io(&self.output_dir))?;
                }
            }
        }
        Ok(metrics)
    }

    fn execute(&self, replicate: usize) -> Result<()> {
        debug!(replicate, "launching simulator");
        let output = Command::new(&self.executable)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ExecutionError::Spawn {
                executable: self.executable.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(
            replicate,
            status = ?output.status.code(),
            stderr = %stderr.trim_end(),
            "simulator failed"
        );
        Err(match output.status.code() {
            Some(code) => ExecutionError::Failed { replicate, code },
            None => ExecutionError::Terminated { replicate },
        }
        .into())
    }
}

impl BlackBox for BlackBoxRunner {
    fn evaluate(&mut self, params: &ParameterVector) -> Result<Vec<Metric>> {
        self.run(params, self.replicates, self.keep_outputs)
    }
}

/// `<root>/run-<unix seconds>-<counter>`, bumping the counter past existing directories
fn unique_run_dir(root: &Path, mut counter: u64) -> PathBuf {
    let seconds = Timestamp::now().as_second();
    loop {
        let candidate = root.join(format!("run-{seconds}-{counter:04}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
