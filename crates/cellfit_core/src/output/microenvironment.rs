//! Substance concentration fields (`output%08u_microenvironment0.mat`)
//!
//! Substance names and mesh coordinates come from the first XML index
//! (`output00000000.xml`). The `multiscale_microenvironment` matrix has one
//! column per voxel and rows `x, y, z, volume` followed by one row per
//! substance.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::mat::{MatMatrix, read_matrix};
use crate::codec::node::{ConfigDocument, NodePath};
use crate::error::{Error, OutputError, Result};

const MATRIX_NAME: &str = "multiscale_microenvironment";
const LEADING_ROWS: usize = 4;

pub fn index_path(output_dir: &Path, timestep: usize) -> PathBuf {
    output_dir.join(format!("output{timestep:08}.xml"))
}

pub fn microenvironment_path(output_dir: &Path, timestep: usize) -> PathBuf {
    output_dir.join(format!("output{timestep:08}_microenvironment0.mat"))
}

/// Voxel center coordinates along each axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

/// Concentrations of one substance in one z plane, row-major `(y, x)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plane {
    pub z: f64,
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<f64>,
}

impl Plane {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.rows && col < self.cols).then(|| self.values[row * self.cols + col])
    }
}

/// Microenvironment snapshot at one timestep
#[derive(Debug, Clone, PartialEq)]
pub struct Microenvironment {
    pub timestep: usize,
    substances: Vec<String>,
    mesh: Mesh,
    data: MatMatrix,
}

impl Microenvironment {
    pub fn load(output_dir: &Path, timestep: usize) -> Result<Self> {
        let (substances, mesh) = read_index(&index_path(output_dir, 0))?;
        let path = microenvironment_path(output_dir, timestep);
        if !path.is_file() {
            return Err(OutputError::MissingTimestep {
                timestep,
                dir: output_dir.to_path_buf(),
            }
            .into());
        }
        let data = read_matrix(&path, MATRIX_NAME)?;
        if data.rows < LEADING_ROWS + substances.len() {
            return Err(OutputError::MalformedMat {
                path,
                reason: format!(
                    "{} rows cannot hold {} substances",
                    data.rows,
                    substances.len()
                ),
            }
            .into());
        }
        Ok(Self {
            timestep,
            substances,
            mesh,
            data,
        })
    }

    pub fn substances(&self) -> &[String] {
        &self.substances
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// One plane per mesh z level, in mesh order
    pub fn planes(&self, substance: &str) -> Result<Vec<Plane>, OutputError> {
        let index = self
            .substances
            .iter()
            .position(|s| s == substance)
            .ok_or_else(|| OutputError::UnknownSubstance(substance.to_string()))?;
        let row = LEADING_ROWS + index;

        let (rows, cols) = (self.mesh.y.len(), self.mesh.x.len());
        let mut planes = Vec::with_capacity(self.mesh.z.len());
        for &z in &self.mesh.z {
            let values: Vec<f64> = (0..self.data.cols)
                .filter_map(|col| {
                    let voxel = self.data.column(col)?;
                    (voxel[2] == z).then_some(voxel[row])
                })
                .collect();
            if values.len() != rows * cols {
                return Err(OutputError::MalformedMat {
                    path: PathBuf::from(MATRIX_NAME),
                    reason: format!(
                        "plane z={z} holds {} voxels, mesh expects {}",
                        values.len(),
                        rows * cols
                    ),
                });
            }
            planes.push(Plane {
                z,
                rows,
                cols,
                values,
            });
        }
        Ok(planes)
    }
}

/// Substance names and mesh from an XML output index
pub fn read_index(path: &Path) -> Result<(Vec<String>, Mesh)> {
    let text = fs::read_to_string(path).map_err(Error::io(path))?;
    let doc = ConfigDocument::parse(&text, path)?;
    let domain = NodePath::root().child("microenvironment").child("domain");

    let substances = doc.child_attributes(&domain.child("variables"), "variable", "name")?;

    let mesh_path = domain.child("mesh");
    let axis = |tag: &str| -> Result<Vec<f64>> {
        let node_path = mesh_path.child(tag);
        let delimiter = doc.find(&node_path).and_then(|n| n.attribute("delimiter"));
        let text = doc.text(&node_path)?;
        let parts: Vec<&str> = match delimiter {
            Some(d) if !d.is_empty() => text.split(d).collect(),
            _ => text.split_whitespace().collect(),
        };
        parts
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| {
                p.parse::<f64>().map_err(|_| {
                    Error::from(OutputError::MalformedIndex {
                        path: path.to_path_buf(),
                        reason: format!("invalid coordinate {p:?} in {tag}"),
                    })
                })
            })
            .collect()
    };
    let mesh = Mesh {
        x: axis("x_coordinates")?,
        y: axis("y_coordinates")?,
        z: axis("z_coordinates")?,
    };
    Ok((substances, mesh))
}
