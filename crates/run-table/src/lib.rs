//! Tabular model of BehaviorSpace experiment exports.
//!
//! This crate contains the loader and pure data structures with no reporting
//! logic. It is a dependency for the reporter crate.

pub mod error;
pub mod loader;
pub mod record;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export error types
pub use error::LoadError;

// Re-export loader types
pub use loader::{
    find_header_line, load_table, parse_table, LoadedTable, DECEPTIVE_COUNT_COLUMN,
    HONEST_COUNT_COLUMN, RUN_NUMBER_MARKER, STEP_MARKER,
};

// Re-export record types
pub use record::{compare_cells, ConfigGroup, ConfigKey, RunRecord, RunTable};
