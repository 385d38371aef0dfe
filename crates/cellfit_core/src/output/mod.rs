//! Readers for the simulator's output artifacts
//!
//! Snapshots are numbered by timestep: `output%08u_cells_physicell.mat`
//! holds the agents, `output%08u_microenvironment0.mat` the substance
//! fields, and `output%08u.xml` the index describing both.

pub mod cells;
pub mod mat;
pub mod microenvironment;
pub mod processors;

pub use cells::{
    CELL_OUTPUT_LABELS, CellTable, cell_counts_over_time, cell_trajectories, cells_in_z_slice,
    count_timesteps, final_positions, read_cells,
};
pub use mat::{MatMatrix, read_matrix};
pub use microenvironment::{Mesh, Microenvironment, Plane};
pub use processors::{CellCount, FinalPositions};
