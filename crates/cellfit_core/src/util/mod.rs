//! Filesystem helpers shared by the codec and the runner

pub mod io;

pub use io::{atomic_write, clear_directory, move_directory};
