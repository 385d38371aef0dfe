//! Subcommand implementations
//!
//! Each command writes its report to the given writer so the binary can
//! print to stdout and the tests can capture it.

use std::fs;
use std::io::Write;
use std::path::Path;

use cellfit_core::codec::ConfigCodec;
use cellfit_core::runner::PathUpdater;
use cellfit_core::sweep::MultiLevelSweep;
use cellfit_core::{ParameterVector, Selector, SweepResult};
use clap::ValueEnum;
use color_eyre::eyre::{WrapErr, bail, eyre};
use serde::Serialize;
use tracing::info;

use crate::plan::CalibrationPlan;

/// Configuration sections selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    Domain,
    Overall,
    Microenvironment,
    Cells,
    User,
}

/// Selector for the requested sections; everything when nothing is named
pub fn selector_for(sections: &[Section], cell_types: &[String]) -> Selector {
    if sections.is_empty() && cell_types.is_empty() {
        return Selector::all();
    }
    let mut selector = Selector::new();
    for section in sections {
        selector = match section {
            Section::Domain => selector.with_domain(),
            Section::Overall => selector.with_overall(),
            Section::Microenvironment => selector.with_microenvironment(),
            Section::Cells => selector.with_all_cell_types(),
            Section::User => selector.with_user_parameters(),
        };
    }
    if !sections.contains(&Section::Cells) {
        for name in cell_types {
            selector = selector.with_cell_type(name.clone());
        }
    }
    selector
}

/// Parses `path=value` pairs into a parameter vector
pub fn parse_assignments(assignments: &[String]) -> color_eyre::Result<ParameterVector> {
    let mut params = ParameterVector::new();
    for assignment in assignments {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| eyre!("expected `path=value`, got `{assignment}`"))?;
        let value: f64 = value
            .trim()
            .parse()
            .wrap_err_with(|| format!("invalid number in `{assignment}`"))?;
        let name = name.trim();
        if params.get(name).is_some() {
            bail!("`{name}` is assigned twice");
        }
        params.push(name, value);
    }
    Ok(params)
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> color_eyre::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Prints the selected sections as JSON
pub fn show(config: &Path, selector: &Selector, out: &mut impl Write) -> color_eyre::Result<()> {
    let store = ConfigCodec::new(config).read(selector)?;
    write_json(out, &store)
}

/// Applies assignments to the configuration file.
///
/// Returns the number of values that changed.
pub fn set(
    config: &Path,
    cell_type: &str,
    assignments: &[String],
    out: &mut impl Write,
) -> color_eyre::Result<usize> {
    let params = parse_assignments(assignments)?;
    let changed = PathUpdater::new(ConfigCodec::new(config), cell_type).apply(&params)?;
    writeln!(out, "{changed} value(s) changed in {}", config.display())?;
    Ok(changed)
}

/// Runs the plan's simulator once per replicate and prints the metrics
pub fn run(
    plan: &CalibrationPlan,
    assignments: &[String],
    out: &mut impl Write,
) -> color_eyre::Result<()> {
    let params = parse_assignments(assignments)?;
    let sim = &plan.simulator;
    let mut runner = plan.runner();
    let metrics = runner.run(&params, sim.replicates, sim.keep_outputs)?;
    info!(replicates = metrics.len(), "run finished");
    write_json(out, &metrics)
}

/// Runs the plan's multilevel sweep.
///
/// The result is written as JSON to `output` (or `out` when absent). With
/// `apply_best` the winning parameters are written into the configuration.
pub fn calibrate(
    plan: &CalibrationPlan,
    output: Option<&Path>,
    apply_best: bool,
    out: &mut impl Write,
) -> color_eyre::Result<SweepResult> {
    let target = plan.target()?;
    let sweep = plan.sweep()?;
    let mut runner = plan.runner();
    let result = MultiLevelSweep::new(&mut runner, target, sweep)?.run()?;

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&result)?;
            fs::write(path, json)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            writeln!(
                out,
                "best: {} (error {}), {} evaluations, result in {}",
                result.parameters,
                result.error,
                result.evaluations,
                path.display()
            )?;
        }
        None => write_json(out, &result)?,
    }

    if apply_best {
        PathUpdater::new(plan.codec(), plan.simulator.cell_type.clone()).apply(&result.parameters)?;
        info!(parameters = %result.parameters, "applied best parameters");
    }
    Ok(result)
}
