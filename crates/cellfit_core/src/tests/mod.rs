//! Integration tests for the cellfit calibration library
//!
//! Tests are organized by topic:
//! - `codec` - Reading and writing the settings file
//! - `updater` - Parameter vectors applied through updaters
//! - `runner` - Subprocess execution, replicates and archiving
//! - `sweep` - Multilevel sweep behaviour against synthetic black boxes
//!
//! `fixtures` holds the shared settings file.

mod codec;
mod fixtures;
mod runner;
mod updater;
