use std::io;
use std::path::PathBuf;

use cellfit::commands::{self, Section};
use cellfit::{CalibrationPlan, init_logging};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cellfit")]
#[command(about = "Calibrate agent-based cell simulators by black-box grid search")]
struct Args {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Write logs to cellfit.log in this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print configuration sections as JSON
    Show {
        /// Simulator settings file
        config: PathBuf,

        /// Sections to print (all when omitted)
        #[arg(short, long, value_enum)]
        section: Vec<Section>,

        /// Cell definitions to print
        #[arg(short, long)]
        cell_type: Vec<String>,
    },

    /// Assign `path=value` pairs in the settings file
    Set {
        config: PathBuf,

        /// Cell definition `cell/...` paths refer to
        #[arg(short, long, default_value = "default")]
        cell_type: String,

        #[arg(required = true)]
        assignments: Vec<String>,
    },

    /// Run a plan's simulator with optional `path=value` assignments
    Run {
        plan: PathBuf,
        assignments: Vec<String>,
    },

    /// Run a plan's multilevel sweep
    Calibrate {
        plan: PathBuf,

        /// Write the result JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the best parameters into the settings file afterwards
        #[arg(long)]
        apply: bool,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(args.log_dir.as_deref(), &args.log_level)?;

    let mut stdout = io::stdout().lock();
    match args.command {
        Command::Show {
            config,
            section,
            cell_type,
        } => {
            let selector = commands::selector_for(&section, &cell_type);
            commands::show(&config, &selector, &mut stdout)?;
        }
        Command::Set {
            config,
            cell_type,
            assignments,
        } => {
            commands::set(&config, &cell_type, &assignments, &mut stdout)?;
        }
        Command::Run { plan, assignments } => {
            let plan = CalibrationPlan::load(&plan)?;
            commands::run(&plan, &assignments, &mut stdout)?;
        }
        Command::Calibrate {
            plan,
            output,
            apply,
        } => {
            let plan = CalibrationPlan::load(&plan)?;
            commands::calibrate(&plan, output.as_deref(), apply, &mut stdout)?;
        }
    }

    tracing::debug!("cellfit finished");
    Ok(())
}
