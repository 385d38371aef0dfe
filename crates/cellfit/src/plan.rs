//! YAML calibration plans
//!
//! A plan names the simulator project, how to extract a metric from its
//! output and, for calibration, the target metric and sweep settings:
//!
//! ```yaml
//! simulator:
//!   working_dir: ../project
//!   executable: project
//!   cell_type: default
//!   replicates: 3
//! processor:
//!   type: cell_count
//! target: [5, 9, 17]
//! sweep:
//!   parameters:
//!     - name: cell/speed
//!       initial: 1.0
//!       lower: 0.0
//!   levels: 3
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use cellfit_core::codec::ConfigCodec;
use cellfit_core::output::{CellCount, FinalPositions};
use cellfit_core::params::Axis;
use cellfit_core::runner::{BlackBoxRunner, PathUpdater};
use cellfit_core::sweep::SweepConfig;
use cellfit_core::Metric;
use color_eyre::eyre::{Context, eyre};
use serde::{Deserialize, Serialize};

/// Where the simulator lives and how each evaluation runs it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorPlan {
    /// Project directory; relative paths are resolved against the plan file
    pub working_dir: PathBuf,

    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    /// Settings file, relative to `working_dir`
    #[serde(default = "default_config")]
    pub config: PathBuf,

    /// Output directory the simulator writes, relative to `working_dir`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Cell definition that `cell/...` parameters refer to
    #[serde(default = "default_cell_type")]
    pub cell_type: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default = "default_replicates")]
    pub replicates: usize,

    #[serde(default)]
    pub keep_outputs: bool,

    /// Where kept outputs are archived, relative to `working_dir`
    #[serde(default)]
    pub archive_dir: Option<PathBuf>,
}

fn default_executable() -> PathBuf {
    PathBuf::from("project")
}

fn default_config() -> PathBuf {
    PathBuf::from("config/PhysiCell_settings.xml")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_cell_type() -> String {
    "default".to_string()
}

fn default_replicates() -> usize {
    1
}

/// Built-in metric extractors selectable from a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessorPlan {
    /// Number of cells at every timestep
    CellCount,
    /// Final coordinate of every cell along `axis`
    FinalPositions { axis: Axis },
}

/// A complete calibration plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPlan {
    pub simulator: SimulatorPlan,

    #[serde(default)]
    pub processor: Option<ProcessorPlan>,

    /// Target metric values for `calibrate`
    #[serde(default)]
    pub target: Option<Vec<f64>>,

    #[serde(default)]
    pub sweep: Option<SweepConfig>,
}

impl CalibrationPlan {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    /// Reads a plan and anchors its working directory at the plan's location
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let yaml = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read plan {}", path.display()))?;
        let mut plan = Self::from_yaml(&yaml)
            .wrap_err_with(|| format!("invalid plan {}", path.display()))?;
        if plan.simulator.working_dir.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            plan.simulator.working_dir = base.join(&plan.simulator.working_dir);
        }
        Ok(plan)
    }

    pub fn config_path(&self) -> PathBuf {
        self.simulator.working_dir.join(&self.simulator.config)
    }

    pub fn codec(&self) -> ConfigCodec {
        ConfigCodec::new(self.config_path())
    }

    pub fn target(&self) -> color_eyre::Result<Metric> {
        self.target
            .clone()
            .map(Metric::Vector)
            .ok_or_else(|| eyre!("the plan has no `target`"))
    }

    pub fn sweep(&self) -> color_eyre::Result<SweepConfig> {
        self.sweep
            .clone()
            .ok_or_else(|| eyre!("the plan has no `sweep` section"))
    }

    /// Runner with the path updater, the plan's processor and replicate settings
    pub fn runner(&self) -> BlackBoxRunner {
        let sim = &self.simulator;
        let mut runner = BlackBoxRunner::new(&sim.working_dir, &sim.executable, &sim.output_dir)
            .with_args(sim.args.iter().cloned())
            .with_updater(PathUpdater::new(self.codec(), sim.cell_type.clone()))
            .with_replicates(sim.replicates, sim.keep_outputs);
        if let Some(archive) = &sim.archive_dir {
            runner = runner.with_archive_root(sim.working_dir.join(archive));
        }
        match self.processor {
            Some(ProcessorPlan::CellCount) => runner.with_processor(CellCount),
            Some(ProcessorPlan::FinalPositions { axis }) => {
                runner.with_processor(FinalPositions { axis })
            }
            None => runner,
        }
    }
}
