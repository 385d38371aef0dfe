//! Per-agent snapshots (`output%08u_cells_physicell.mat`)

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::mat::read_matrix;
use crate::error::{Error, OutputError, Result};
use crate::params::Axis;

/// Row labels of the `cells` matrix, in storage order
pub const CELL_OUTPUT_LABELS: [&str; 27] = [
    "ID",
    "position_x",
    "position_y",
    "position_z",
    "total_volume",
    "cell_type",
    "cycle_model",
    "current_phase",
    "elapsed_time_in_phase",
    "nuclear_volume",
    "cytoplasmic_volume",
    "fluid_fraction",
    "calcified_fraction",
    "orientation_x",
    "orientation_y",
    "orientation_z",
    "polarity",
    "migration_speed",
    "motility_vector_x",
    "motility_vector_y",
    "motility_vector_z",
    "migration_bias",
    "motility_bias_direction_x",
    "motility_bias_direction_y",
    "motility_bias_direction_z",
    "persistence_time",
    "motility_reserved",
];

const CELLS_MATRIX: &str = "cells";
const SNAPSHOT_PREFIX: &str = "output";
const SNAPSHOT_SUFFIX: &str = "_cells_physicell.mat";

pub fn cell_snapshot_path(output_dir: &Path, timestep: usize) -> PathBuf {
    output_dir.join(format!("{SNAPSHOT_PREFIX}{timestep:08}{SNAPSHOT_SUFFIX}"))
}

/// Number of cell snapshots in `output_dir`
pub fn count_timesteps(output_dir: &Path) -> Result<usize> {
    let entries = fs::read_dir(output_dir).map_err(Error::io(output_dir))?;
    let mut count = 0;
    for entry in entries {
        let entry = entry.map_err(Error::io(output_dir))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(SNAPSHOT_PREFIX) && name.ends_with(SNAPSHOT_SUFFIX) {
            count += 1;
        }
    }
    Ok(count)
}

pub fn position_label(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "position_x",
        Axis::Y => "position_y",
        Axis::Z => "position_z",
    }
}

/// Selected variables of every cell at one timestep, stored by column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellTable {
    pub timestep: usize,
    columns: Vec<(String, Vec<f64>)>,
}

impl CellTable {
    pub fn column(&self, variable: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, values)| values.as_slice())
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |(_, values)| values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keeps the cells whose index satisfies `keep`
    fn retain_rows(&self, keep: impl Fn(usize) -> bool) -> CellTable {
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| {
                let kept = values
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| keep(*i))
                    .map(|(_, v)| *v)
                    .collect();
                (name.clone(), kept)
            })
            .collect();
        CellTable {
            timestep: self.timestep,
            columns,
        }
    }
}

fn label_index(variable: &str) -> Result<usize, OutputError> {
    CELL_OUTPUT_LABELS
        .iter()
        .position(|label| *label == variable)
        .ok_or_else(|| OutputError::UnknownVariable(variable.to_string()))
}

/// Reads `variables` for every cell at `timestep`
pub fn read_cells(output_dir: &Path, timestep: usize, variables: &[&str]) -> Result<CellTable> {
    let indexes = variables
        .iter()
        .map(|v| label_index(v))
        .collect::<Result<Vec<_>, _>>()?;

    let path = cell_snapshot_path(output_dir, timestep);
    if !path.is_file() {
        return Err(OutputError::MissingTimestep {
            timestep,
            dir: output_dir.to_path_buf(),
        }
        .into());
    }

    let matrix = read_matrix(&path, CELLS_MATRIX)?;
    let mut columns = Vec::with_capacity(variables.len());
    for (variable, index) in variables.iter().zip(indexes) {
        let row = matrix.row(index).ok_or_else(|| OutputError::MalformedMat {
            path: path.clone(),
            reason: format!(
                "`{CELLS_MATRIX}` has {} rows, `{variable}` needs row {index}",
                matrix.rows
            ),
        })?;
        columns.push((variable.to_string(), row));
    }
    Ok(CellTable { timestep, columns })
}

/// Cells whose `position_z` lies in `[-size/2, size/2]`
pub fn cells_in_z_slice(table: &CellTable, size: f64) -> Result<CellTable, OutputError> {
    let z = table
        .column("position_z")
        .ok_or_else(|| OutputError::UnknownVariable("position_z".to_string()))?;
    let half = size / 2.0;
    Ok(table.retain_rows(|i| z[i] >= -half && z[i] <= half))
}

/// Positions of every cell over time, keyed by cell ID.
///
/// Each trajectory lists `[x, y, z]` for the timesteps in which the cell exists.
pub fn cell_trajectories(output_dir: &Path) -> Result<FxHashMap<u64, Vec<[f64; 3]>>> {
    let variables = ["ID", "position_x", "position_y", "position_z"];
    let mut trajectories: FxHashMap<u64, Vec<[f64; 3]>> = FxHashMap::default();
    for timestep in 0..count_timesteps(output_dir)? {
        let table = read_cells(output_dir, timestep, &variables)?;
        let columns: Vec<&[f64]> = variables
            .iter()
            .filter_map(|v| table.column(v))
            .collect();
        let [ids, x, y, z] = columns[..] else {
            continue;
        };
        for i in 0..ids.len() {
            trajectories
                .entry(ids[i] as u64)
                .or_default()
                .push([x[i], y[i], z[i]]);
        }
    }
    Ok(trajectories)
}

/// Number of cells at every timestep
pub fn cell_counts_over_time(output_dir: &Path) -> Result<Vec<f64>> {
    (0..count_timesteps(output_dir)?)
        .map(|timestep| Ok(read_cells(output_dir, timestep, &["ID"])?.len() as f64))
        .collect()
}

/// Coordinate along `axis` of every cell at the last timestep
pub fn final_positions(output_dir: &Path, axis: Axis) -> Result<Vec<f64>> {
    let count = count_timesteps(output_dir)?;
    let last = count.checked_sub(1).ok_or_else(|| OutputError::MissingTimestep {
        timestep: 0,
        dir: output_dir.to_path_buf(),
    })?;
    let label = position_label(axis);
    let table = read_cells(output_dir, last, &[label])?;
    Ok(table.column(label).map(<[f64]>::to_vec).unwrap_or_default())
}
